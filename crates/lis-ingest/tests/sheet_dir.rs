//! Tests for sheet directory workbooks.

use std::fs::{self, File};

use lis_ingest::{IngestError, SheetDir, WorkbookReader, WorkbookWriter, open_workbook};
use lis_model::{CellValue, LisError, Table};

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::with_schema(columns);
    for row in rows {
        table.push_row(row.iter().map(|value| CellValue::from(*value)).collect());
    }
    table
}

#[test]
fn writes_and_reads_sheets() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("out_processed.sheets");
    let book = SheetDir::at(&path);
    let visits = table(
        &["患者编号", "就诊日期", "就诊科室"],
        &[&["P001", "2023-01-05", "急诊科"], &["P002", "", "内科"]],
    );
    book.write_sheets(&[("Lis01_就诊合并", &visits)])
        .expect("write workbook");

    let mut reader = open_workbook(&path).expect("open workbook");
    assert_eq!(
        reader.sheet_names().expect("sheet names"),
        vec!["Lis01_就诊合并".to_string()]
    );
    let read = reader.read_sheet("Lis01_就诊合并").expect("read sheet");
    assert_eq!(read.columns(), visits.columns());
    assert_eq!(read.len(), 2);
    assert_eq!(read.value(1, "就诊日期"), Some(&CellValue::Null));
    assert!(!path.join("Lis01_就诊合并.csv.tmp").exists());
}

#[test]
fn header_only_sheet_survives() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("empty.sheets");
    let book = SheetDir::at(&path);
    let empty = Table::with_schema(&["患者ID", "检查名称"]);
    book.write_sheets(&[("Lis05_新冠检测", &empty)])
        .expect("write workbook");
    let mut reader = SheetDir::open(&path).expect("open");
    let read = reader.read_sheet("Lis05_新冠检测").expect("read");
    assert_eq!(read.columns(), empty.columns());
    assert!(read.is_empty());
}

#[test]
fn replaces_named_sheets_and_preserves_others() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("book.sheets");
    let book = SheetDir::at(&path);
    let first = table(&["A"], &[&["1"]]);
    let second = table(&["B"], &[&["2"]]);
    book.write_sheets(&[("one", &first), ("two", &second)])
        .expect("first write");
    let replacement = table(&["A"], &[&["9"], &["10"]]);
    book.write_sheets(&[("one", &replacement)])
        .expect("second write");

    let mut reader = SheetDir::open(&path).expect("open");
    assert_eq!(reader.read_sheet("one").expect("one").len(), 2);
    let two = reader.read_sheet("two").expect("two");
    assert_eq!(two.value(0, "B"), Some(&CellValue::Text("2".to_string())));
}

#[test]
fn held_lock_is_a_write_conflict() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("locked.sheets");
    fs::create_dir_all(&path).expect("create dir");
    let holder = File::create(path.join(".lock")).expect("lock file");
    holder.try_lock().expect("hold lock");
    let book = SheetDir::at(&path);
    let error = book
        .write_sheets(&[("one", &table(&["A"], &[&["1"]]))])
        .expect_err("locked workbook must not be written");
    assert!(matches!(error, IngestError::WriteConflict { .. }));
    assert!(matches!(
        LisError::from(error),
        LisError::WriteConflict { .. }
    ));
    assert!(!path.join("one.csv").exists());

    holder.unlock().expect("release lock");
    book.write_sheets(&[("one", &table(&["A"], &[&["1"]]))])
        .expect("write after release");
    assert!(path.join("one.csv").exists());
}

#[test]
fn lock_file_left_by_dead_writer_does_not_block() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("crashed.sheets");
    fs::create_dir_all(&path).expect("create dir");
    fs::write(path.join(".lock"), "").expect("leftover lock file");
    let book = SheetDir::at(&path);
    book.write_sheets(&[("one", &table(&["A"], &[&["1"]]))])
        .expect("unheld lock file is reusable");
    let mut reader = SheetDir::open(&path).expect("open");
    assert_eq!(reader.sheet_names().expect("names"), vec!["one".to_string()]);
    assert_eq!(reader.read_sheet("one").expect("one").len(), 1);
}

#[test]
fn replace_sheets_removes_named_sheets() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("book.sheets");
    let book = SheetDir::at(&path);
    book.write_sheets(&[
        ("one", &table(&["A"], &[&["1"]])),
        ("two", &table(&["B"], &[&["2"]])),
        ("three", &table(&["C"], &[&["3"]])),
    ])
    .expect("first write");
    book.replace_sheets(&[("one", &table(&["A"], &[&["9"]]))], &["two", "absent"])
        .expect("replace");

    let mut reader = SheetDir::open(&path).expect("open");
    assert_eq!(
        reader.sheet_names().expect("names"),
        vec!["one".to_string(), "three".to_string()]
    );
    assert_eq!(
        reader.read_sheet("one").expect("one").value(0, "A"),
        Some(&CellValue::Text("9".to_string()))
    );
}

#[test]
fn missing_sheet_maps_to_missing_required_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("book.sheets");
    SheetDir::at(&path)
        .write_sheets(&[("门急诊信息", &table(&["患者编号"], &[&["P001"]]))])
        .expect("write");
    let mut reader = SheetDir::open(&path).expect("open");
    assert!(reader.has_sheet("门急诊信息").expect("has sheet"));
    let error = reader.read_sheet("住院信息").expect_err("absent sheet");
    match LisError::from(error) {
        LisError::MissingRequiredSheet { sheet } => assert_eq!(sheet, "住院信息"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn read_cleans_headers_and_skips_blank_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("raw.sheets");
    fs::create_dir_all(&path).expect("create dir");
    fs::write(
        path.join("门急诊信息.csv"),
        "\u{feff} 患者编号 ,就诊  日期,诊断\n P001 ,2023-01-05,\n,,\n",
    )
    .expect("write csv");
    let mut reader = SheetDir::open(&path).expect("open");
    let table = reader.read_sheet("门急诊信息").expect("read");
    assert_eq!(table.columns(), ["患者编号", "就诊 日期", "诊断"]);
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.value(0, "患者编号"),
        Some(&CellValue::Text("P001".to_string()))
    );
}
