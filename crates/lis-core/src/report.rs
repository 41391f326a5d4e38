//! Status report workbooks of the batch and merge phases.

use lis_model::{BatchReport, CellValue, FileStatus, MergeReport, SheetStatus, Table};

/// Stem of the batch report workbook, written into the output directory.
pub const BATCH_REPORT_NAME: &str = "batch_process_report";
/// Stem of the merge report workbook, written next to the merged output.
pub const MERGE_REPORT_NAME: &str = "merge_report";

const SUMMARY_SHEET: &str = "总体统计";
const FILE_DETAIL_SHEET: &str = "详细结果";
const SHEET_DETAIL_SHEET: &str = "Sheet明细";
const INPUT_LIST_SHEET: &str = "输入文件列表";

fn file_status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Success => "成功",
        FileStatus::Partial => "部分成功",
        FileStatus::Failed => "失败",
    }
}

fn sheet_status_label(status: SheetStatus) -> &'static str {
    match status {
        SheetStatus::Success => "成功",
        SheetStatus::Empty => "无数据",
        SheetStatus::Failed => "失败",
    }
}

fn count(value: usize) -> CellValue {
    CellValue::Number(value as f64)
}

fn text(value: &str) -> CellValue {
    CellValue::from(value)
}

fn metrics(rows: Vec<(&str, CellValue)>) -> Table {
    let mut table = Table::with_schema(&["指标", "数值"]);
    for (name, value) in rows {
        table.push_row(vec![text(name), value]);
    }
    table
}

/// Sheets of the batch report: overall counts, one row per file, one row
/// per file and sheet.
pub fn batch_report_tables(report: &BatchReport) -> Vec<(&'static str, Table)> {
    let summary = metrics(vec![
        ("总文件数", count(report.total())),
        ("处理文件数", count(report.processed())),
        ("成功文件数", count(report.succeeded())),
        ("部分成功文件数", count(report.partial())),
        ("失败文件数", count(report.failed())),
        ("成功率", text(&format!("{:.1}%", report.success_rate()))),
    ]);

    let mut files = Table::with_schema(&["文件名", "状态", "成功sheet数", "失败sheet数", "错误信息"]);
    let mut sheets = Table::with_schema(&["文件名", "sheet名称", "状态", "行数", "错误信息"]);
    for file in &report.files {
        let name = file.file_name();
        files.push_row(vec![
            text(&name),
            text(file_status_label(file.status)),
            count(file.succeeded_sheets()),
            count(file.failed_sheets()),
            text(file.error.as_deref().unwrap_or_default()),
        ]);
        for sheet in &file.sheets {
            sheets.push_row(vec![
                text(&name),
                text(sheet.sheet.sheet_name()),
                text(sheet_status_label(sheet.status)),
                count(sheet.rows),
                text(sheet.error.as_deref().unwrap_or_default()),
            ]);
        }
    }
    vec![
        (SUMMARY_SHEET, summary),
        (FILE_DETAIL_SHEET, files),
        (SHEET_DETAIL_SHEET, sheets),
    ]
}

/// Sheets of the merge report: overall status, the input list, one row per
/// canonical sheet.
pub fn merge_report_tables(report: &MergeReport) -> Vec<(&'static str, Table)> {
    let status = report.status();
    let message = format!(
        "合并{}个文件, {}个sheet成功, {}个sheet失败",
        report.inputs.len(),
        report.merged_sheets(),
        report.failed_sheets()
    );
    let summary = metrics(vec![
        ("合并状态", text(file_status_label(status))),
        ("合并信息", text(&message)),
        ("输入文件数", count(report.inputs.len())),
        ("成功处理的sheet数", count(report.merged_sheets())),
        ("失败处理的sheet数", count(report.failed_sheets())),
        ("输出文件路径", text(&report.output.display().to_string())),
    ]);

    let mut inputs = Table::with_schema(&["序号", "文件名", "文件路径"]);
    for (index, path) in report.inputs.iter().enumerate() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        inputs.push_row(vec![
            count(index + 1),
            text(&name),
            text(&path.display().to_string()),
        ]);
    }

    let mut sheets = Table::with_schema(&["sheet名称", "状态", "行数", "错误信息"]);
    for sheet in &report.sheets {
        sheets.push_row(vec![
            text(sheet.sheet.sheet_name()),
            text(sheet_status_label(sheet.status)),
            count(sheet.rows),
            text(sheet.error.as_deref().unwrap_or_default()),
        ]);
    }
    vec![
        (SUMMARY_SHEET, summary),
        (INPUT_LIST_SHEET, inputs),
        (FILE_DETAIL_SHEET, sheets),
    ]
}
