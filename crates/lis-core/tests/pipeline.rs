//! Tests for the batch and merge phases over sheet-directory workbooks.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use lis_core::{BatchOptions, SourceTables, process_file, process_sources, run_batch, run_merge};
use lis_ingest::{SheetDir, WorkbookReader, WorkbookWriter, open_workbook};
use lis_model::{
    CellValue, FileOutcome, FileStatus, SheetKind, SheetStatus, SourceSheet, Table, columns,
};

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::with_schema(columns);
    for row in rows {
        table.push_row(row.iter().map(|value| CellValue::from(*value)).collect());
    }
    table
}

fn outpatient() -> Table {
    table(
        &["患者编号", "姓名", "年龄", "性别", "就诊科室", "就诊日期", "诊断（ICD编码）", "诊断（文字）"],
        &[
            &["P001", "张三", "70", "男", "急诊科(emergency)", "2023-01-05 08:00:00", "J18", "肺部感染(J18)"],
            &["P001", "张三", "70", "男", "急诊科(emergency)", "2023-01-05 14:00:00", "J18", "肺部感染(J18)"],
            &["P003", "王五", "", "女", "呼吸科", "2023-01-07", "", ""],
        ],
    )
}

fn inpatient() -> Table {
    table(
        &["患者编号", "姓名", "年龄", "性别", "就诊科室", "入院日期", "出院日期", "诊断（ICD编码）", "诊断（文字）"],
        &[&[
            "P002",
            "李四",
            "45",
            "女",
            "内科(internal medicine)",
            "2023-01-04",
            "2023-01-10",
            "U07.1",
            "新型冠状病毒感染",
        ]],
    )
}

fn medication() -> Table {
    table(
        &["患者编号", "姓名", "药物名称", "用药日期", "剂量"],
        &[
            &["P002", "李四", "奈玛特韦片/利托那韦片", "2023-01-05", "1片"],
            &["P002", "李四", "阿莫西林", "2023-01-05", "2片"],
        ],
    )
}

fn examinations() -> Table {
    table(
        &["患者编号", "姓名", "检查名称", "检查日期", "检查结果"],
        &[
            &["P002", "李四", "新型冠状病毒核酸检测", "2023-01-04", "阳性"],
            &["P003", "王五", "新冠抗原检测", "2023-01-07", "未检出"],
            &["P003", "王五", "血常规", "2023-01-07", "正常"],
        ],
    )
}

fn write_workbook(path: &Path, sheets: &[(SourceSheet, Table)]) {
    let refs: Vec<(&str, &Table)> = sheets
        .iter()
        .map(|(sheet, table)| (sheet.sheet_name(), table))
        .collect();
    SheetDir::at(path).write_sheets(&refs).expect("write input workbook");
}

fn full_workbook(path: &Path) {
    write_workbook(
        path,
        &[
            (SourceSheet::Outpatient, outpatient()),
            (SourceSheet::Inpatient, inpatient()),
            (SourceSheet::Medication, medication()),
            (SourceSheet::Examination, examinations()),
        ],
    );
}

fn read_sheet(path: &Path, kind: SheetKind) -> Table {
    let mut reader = open_workbook(path).expect("open output");
    reader.read_sheet(kind.sheet_name()).expect("read sheet")
}

#[test]
fn full_workbook_builds_every_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hospital_a.sheets");
    full_workbook(&input);
    let out = dir.path().join("out");

    let outcome = process_file(&input, &out);
    assert_eq!(outcome.status, FileStatus::Success, "{:?}", outcome.sheets);
    let output = outcome.output.expect("output path");
    assert_eq!(output, out.join("hospital_a_processed.sheets"));

    let visits = read_sheet(&output, SheetKind::VisitMerge);
    assert_eq!(visits.columns().len(), 28);
    assert_eq!(visits.len(), 3);
    assert_eq!(
        visits.value(0, columns::VISIT_START),
        Some(&CellValue::from("2023-01-05 14:00:00"))
    );
    assert_eq!(visits.value(0, columns::VISIT_CATEGORY), Some(&CellValue::from("急诊(E)")));
    assert_eq!(visits.value(2, columns::VISIT_CATEGORY), Some(&CellValue::from("住院(H)")));
    assert_eq!(visits.value(2, columns::VISIT_END), Some(&CellValue::from("2023-01-10")));
    assert_eq!(visits.value(2, columns::ADMISSION_DATE), Some(&CellValue::Null));

    let diagnoses = read_sheet(&output, SheetKind::Diagnosis);
    assert_eq!(diagnoses.len(), 2);

    let infection = read_sheet(&output, SheetKind::InfectionTracking);
    assert_eq!(infection.len(), 5);
    assert_eq!(infection.value(0, columns::RS_FLAG), Some(&CellValue::from("是")));
    assert_eq!(infection.value(0, columns::PNEUMONIA_FLAG), Some(&CellValue::from("是")));
    assert_eq!(infection.value(2, columns::COVID_FLAG), Some(&CellValue::from("是")));
    assert_eq!(infection.value(2, columns::INFECTION_STATUS), Some(&CellValue::from("确诊")));
    assert_eq!(infection.value(3, columns::SOURCE), Some(&CellValue::from("检查")));
    assert_eq!(infection.value(4, columns::INFECTION_STATUS), Some(&CellValue::from("排除")));

    let antiviral = read_sheet(&output, SheetKind::AntiviralMedication);
    assert_eq!(antiviral.len(), 1);
    assert_eq!(antiviral.value(0, columns::DRUG_TYPE), Some(&CellValue::from("抗病毒药物")));
    assert_eq!(antiviral.value(0, columns::PATIENT_KEY), Some(&CellValue::from("030-P002")));

    let testing = read_sheet(&output, SheetKind::InfectionTesting);
    assert_eq!(testing.len(), 2);
    assert_eq!(testing.value(0, columns::TEST_METHOD), Some(&CellValue::from("核酸检测")));
    assert_eq!(testing.value(0, columns::RESULT_TYPE), Some(&CellValue::from("阳性")));
    assert_eq!(testing.value(1, columns::RESULT_TYPE), Some(&CellValue::from("阴性")));

    let population = read_sheet(&output, SheetKind::PopulationSegmentation);
    assert_eq!(population.value(0, columns::AGE_COHORT), Some(&CellValue::from("老年(60-79岁)")));
    assert_eq!(population.value(1, columns::AGE_COHORT), Some(&CellValue::from("未知")));
    assert_eq!(population.value(1, columns::POPULATION_CATEGORY), Some(&CellValue::from("女性")));

    let registry = read_sheet(&output, SheetKind::PatientRegistry);
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.value(0, columns::PATIENT_KEY), Some(&CellValue::from("030-P001")));
    assert_eq!(registry.value(0, columns::VISIT_COUNT), Some(&CellValue::from("1")));
    assert_eq!(registry.value(0, columns::AGE), Some(&CellValue::from("70")));
}

#[test]
fn missing_sources_fail_only_their_sheets() {
    let sources = SourceTables::from_tables(
        Path::new("memory"),
        [
            (SourceSheet::Outpatient, outpatient()),
            (SourceSheet::Inpatient, inpatient()),
        ],
    );
    let processed = process_sources(&sources);
    assert_eq!(processed.outcomes.len(), 7);
    let failed: Vec<SheetKind> = processed
        .outcomes
        .iter()
        .filter(|outcome| outcome.status == SheetStatus::Failed)
        .map(|outcome| outcome.sheet)
        .collect();
    assert_eq!(
        failed,
        vec![SheetKind::AntiviralMedication, SheetKind::InfectionTesting]
    );
    assert_eq!(processed.tables.len(), 5);
    assert_eq!(processed.outcomes[0].dropped_duplicates, 1);
}

#[test]
fn missing_visit_date_column_names_the_role() {
    let mut outpatient = Table::with_schema(&["患者编号", "就诊科室"]);
    outpatient.push_row(vec![CellValue::from("P001"), CellValue::from("急诊科")]);
    let sources = SourceTables::from_tables(
        Path::new("memory"),
        [
            (SourceSheet::Outpatient, outpatient),
            (SourceSheet::Inpatient, inpatient()),
        ],
    );
    let processed = process_sources(&sources);
    let error = processed.outcomes[0].error.as_deref().expect("visit merge fails");
    assert!(error.contains("visit-start-date"), "{error}");
}

#[test]
fn batch_then_merge() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input_dir = dir.path().join("in");
    std::fs::create_dir_all(&input_dir).expect("input dir");
    full_workbook(&input_dir.join("hospital_a.sheets"));
    write_workbook(
        &input_dir.join("hospital_b.sheets"),
        &[
            (SourceSheet::Outpatient, outpatient()),
            (SourceSheet::Inpatient, inpatient()),
        ],
    );
    std::fs::write(input_dir.join("broken.xlsx"), b"not a workbook").expect("broken input");

    let inputs = lis_ingest::list_input_workbooks(&input_dir).expect("discover inputs");
    assert_eq!(inputs.len(), 3);
    let out = dir.path().join("out");
    let done = AtomicUsize::new(0);
    let report = run_batch(
        &inputs,
        &out,
        BatchOptions {
            workers: 2,
            skip_existing: false,
        },
        &|_: &FileOutcome| {
            done.fetch_add(1, Ordering::Relaxed);
        },
    )
    .expect("batch");
    assert_eq!(done.load(Ordering::Relaxed), 3);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.partial(), 1);
    assert_eq!(report.failed(), 1);
    let report_path = report.report_path.clone().expect("batch report written");
    let mut batch_report = open_workbook(&report_path).expect("open batch report");
    let summary = batch_report.read_sheet("总体统计").expect("summary sheet");
    assert_eq!(summary.value(0, "数值"), Some(&CellValue::from("3")));

    let processed: Vec<PathBuf> = lis_ingest::list_processed_workbooks(&out).expect("processed");
    assert_eq!(processed, report.outputs());
    let merged_path = dir.path().join("final").join("merged.sheets");
    let merge = run_merge(&processed, &merged_path).expect("merge");
    assert_eq!(merge.sheets.len(), 7);
    assert_eq!(merge.failed_sheets(), 0);
    assert!(merge.report_path.is_some());

    let mut merged = open_workbook(&merged_path).expect("open merged");
    let names = merged.sheet_names().expect("sheet names");
    for kind in SheetKind::ALL {
        assert!(names.iter().any(|name| name == kind.sheet_name()), "{kind}");
    }
    let visits = merged.read_sheet(SheetKind::VisitMerge.sheet_name()).expect("visits");
    assert_eq!(visits.columns().len(), 30);
    assert_eq!(visits.len(), 3);
    assert_eq!(
        visits.value(0, columns::SOURCE_FILE),
        Some(&CellValue::from("hospital_a_processed.sheets"))
    );
}

#[test]
fn skip_existing_leaves_outputs_alone() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hospital_a.sheets");
    full_workbook(&input);
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("hospital_a_processed.sheets")).expect("existing output");

    let report = run_batch(
        &[input],
        &out,
        BatchOptions {
            workers: 0,
            skip_existing: true,
        },
        &|_: &FileOutcome| {},
    )
    .expect("batch");
    assert_eq!(report.succeeded(), 1);
    assert!(report.files[0].sheets.is_empty());
}

#[test]
fn rerun_removes_sheets_that_now_fail() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hospital_a.sheets");
    full_workbook(&input);
    let out = dir.path().join("out");
    let first = process_file(&input, &out);
    assert_eq!(first.status, FileStatus::Success, "{:?}", first.sheets);
    let output = first.output.expect("output path");
    assert_eq!(read_sheet(&output, SheetKind::VisitMerge).len(), 3);

    std::fs::remove_dir_all(&input).expect("drop input");
    write_workbook(
        &input,
        &[
            (SourceSheet::Outpatient, outpatient()),
            (SourceSheet::Medication, medication()),
            (SourceSheet::Examination, examinations()),
        ],
    );
    let rerun = process_file(&input, &out);
    assert_eq!(rerun.status, FileStatus::Partial);
    assert_eq!(rerun.sheets[0].status, SheetStatus::Failed);

    let names = open_workbook(&output)
        .expect("open output")
        .sheet_names()
        .expect("sheet names");
    for sheet in &rerun.sheets {
        let present = names.iter().any(|name| name == sheet.sheet.sheet_name());
        assert_eq!(present, sheet.status.is_ok(), "{}", sheet.sheet);
    }

    let merged_path = dir.path().join("merged.sheets");
    let merge = run_merge(&[output], &merged_path).expect("merge");
    assert_eq!(merge.sheets[0].status, SheetStatus::Empty);
    let visits = read_sheet(&merged_path, SheetKind::VisitMerge);
    assert_eq!(visits.columns().len(), 30);
    assert!(visits.is_empty());
}

#[test]
fn unreadable_input_sheet_is_still_merged_header_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hospital_a.sheets");
    full_workbook(&input);
    let out = dir.path().join("out");
    let output = process_file(&input, &out).output.expect("output path");
    std::fs::write(
        SheetDir::at(&output).sheet_path(SheetKind::Diagnosis.sheet_name()),
        [0xff, 0xfe, 0x00, 0xc3],
    )
    .expect("corrupt sheet");

    let requested = dir.path().join("final.xlsx");
    let merge = run_merge(&[output], &requested).expect("merge");
    let merged_path = dir.path().join("final.sheets");
    assert_eq!(merge.output, merged_path);
    assert!(!requested.exists());
    assert_eq!(merge.failed_sheets(), 1);
    let diagnosis = merge
        .sheets
        .iter()
        .find(|sheet| sheet.sheet == SheetKind::Diagnosis)
        .expect("diagnosis outcome");
    assert_eq!(diagnosis.status, SheetStatus::Failed);
    assert!(diagnosis.error.as_deref().is_some_and(|error| error.contains("hospital_a_processed.sheets")));

    let mut merged = open_workbook(&merged_path).expect("open merged");
    let names = merged.sheet_names().expect("sheet names");
    for kind in SheetKind::ALL {
        assert!(names.iter().any(|name| name == kind.sheet_name()), "{kind}");
    }
    let diagnoses = merged
        .read_sheet(SheetKind::Diagnosis.sheet_name())
        .expect("diagnosis sheet");
    assert!(diagnoses.is_empty());
    assert!(!diagnoses.columns().is_empty());
    assert_eq!(read_sheet(&merged_path, SheetKind::VisitMerge).len(), 3);
}

#[test]
fn failed_write_fails_every_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("hospital_a.sheets");
    full_workbook(&input);
    let out = dir.path().join("out");
    let output = out.join("hospital_a_processed.sheets");
    std::fs::create_dir_all(&output).expect("output dir");
    let holder = File::create(output.join(".lock")).expect("lock file");
    holder.try_lock().expect("hold lock");

    let outcome = process_file(&input, &out);
    assert_eq!(outcome.status, FileStatus::Failed);
    assert!(outcome.output.is_none());
    assert_eq!(outcome.sheets.len(), 7);
    assert_eq!(outcome.succeeded_sheets(), 0);
    let error = outcome.error.as_deref().expect("write error");
    assert!(error.contains("in use"), "{error}");
    for sheet in &outcome.sheets {
        assert_eq!(sheet.error.as_deref(), Some(error), "{}", sheet.sheet);
    }
    assert!(!SheetDir::at(&output).sheet_path(SheetKind::VisitMerge.sheet_name()).exists());

    holder.unlock().expect("release lock");
    assert_eq!(process_file(&input, &out).status, FileStatus::Success);
}
