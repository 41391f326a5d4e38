use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use lis_model::{BatchReport, FileOutcome, FileStatus, MergeReport, SheetKind, SheetStatus};

pub fn print_file_outcome(outcome: &FileOutcome) {
    println!("Input: {}", outcome.input.display());
    if let Some(output) = &outcome.output {
        println!("Output: {}", output.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Duplicates"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for sheet in &outcome.sheets {
        table.add_row(vec![
            Cell::new(sheet.sheet.sheet_name()),
            sheet_status_cell(sheet.status),
            Cell::new(sheet.rows),
            Cell::new(sheet.dropped_duplicates),
            error_cell(sheet.error.as_deref()),
        ]);
    }
    println!("{table}");
    println!("Status: {}", outcome.status.as_str());
    if let Some(error) = &outcome.error {
        eprintln!("error: {error}");
    }
}

pub fn print_batch_summary(report: &BatchReport) {
    println!("Output: {}", report.output_dir.display());
    if let Some(path) = &report.report_path {
        println!("Report: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Sheets"),
        header_cell("Failed"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for file in &report.files {
        let failed_sheets: Vec<&str> = file
            .sheets
            .iter()
            .filter(|sheet| sheet.status == SheetStatus::Failed)
            .map(|sheet| sheet.sheet.sheet_name())
            .collect();
        let error = file.error.clone().or_else(|| {
            (!failed_sheets.is_empty()).then(|| failed_sheets.join(", "))
        });
        table.add_row(vec![
            Cell::new(file.file_name()),
            file_status_cell(file.status),
            Cell::new(file.succeeded_sheets()),
            Cell::new(file.failed_sheets()),
            error_cell(error.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} ok, {} partial, {} failed",
            report.succeeded(),
            report.partial(),
            report.failed()
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format!("{:.1}% success", report.success_rate())),
    ]);
    println!("{table}");
}

pub fn print_merge_summary(report: &MergeReport) {
    println!("Merged {} workbook(s) into {}", report.inputs.len(), report.output.display());
    if let Some(path) = &report.report_path {
        println!("Report: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Files"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for sheet in &report.sheets {
        table.add_row(vec![
            Cell::new(sheet.sheet.sheet_name()),
            sheet_status_cell(sheet.status),
            Cell::new(sheet.rows),
            Cell::new(sheet.contributing_files),
            error_cell(sheet.error.as_deref()),
        ]);
    }
    println!("{table}");
}

pub fn print_sheets() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Description"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    for kind in SheetKind::ALL {
        table.add_row(vec![
            Cell::new(kind.sheet_name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(kind.description()),
            Cell::new(kind.schema().join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn file_status_cell(status: FileStatus) -> Cell {
    let color = match status {
        FileStatus::Success => Color::Green,
        FileStatus::Partial => Color::Yellow,
        FileStatus::Failed => Color::Red,
    };
    Cell::new(status.as_str()).fg(color)
}

fn sheet_status_cell(status: SheetStatus) -> Cell {
    match status {
        SheetStatus::Success => Cell::new(status.as_str()).fg(Color::Green),
        SheetStatus::Empty => dim_cell(status.as_str()),
        SheetStatus::Failed => Cell::new(status.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn error_cell(error: Option<&str>) -> Cell {
    match error {
        Some(message) => Cell::new(message).fg(Color::Red),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
