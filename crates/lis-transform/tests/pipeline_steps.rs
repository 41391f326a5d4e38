//! Tests for time normalization, visit deduplication and merging.

use lis_model::{CellValue, SheetKind, Table};
use lis_transform::{MergeInput, dedupe_visits, merge_tables, normalize_times};
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Null),
        "\\PC{0,10}".prop_map(CellValue::Text),
        (20000.0f64..60000.0).prop_map(CellValue::Number),
        (2000i32..2030, 1u32..13, 1u32..29, 0u32..24, 0u32..60).prop_map(|(y, m, d, h, min)| {
            CellValue::Text(format!("{y}-{m:02}-{d:02} {h:02}:{min:02}:00"))
        }),
        (2000i32..2030, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| CellValue::Text(format!("{y}/{m}/{d}"))),
    ]
}

fn visit_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(
        (
            prop_oneof![Just("030-P001"), Just("030-P002"), Just("")],
            (1u32..4, 0u32..24),
        ),
        0..24,
    )
    .prop_map(|rows| {
        let mut table = Table::with_schema(&["患者唯一编码", "就诊日期"]);
        for (patient, (day, hour)) in rows {
            table.push_row(vec![
                CellValue::from(patient),
                CellValue::Text(format!("2023-01-0{day} {hour:02}:00:00")),
            ]);
        }
        table
    })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(rows in prop::collection::vec(prop::collection::vec(cell(), 3), 0..16)) {
        let mut table = Table::with_schema(&["就诊日期", "姓名", "出院日期"]);
        table.extend_rows(rows);
        normalize_times(&mut table);
        let once = table.clone();
        normalize_times(&mut table);
        prop_assert_eq!(once.rows(), table.rows());
    }

    #[test]
    fn dedupe_leaves_one_row_per_patient_day(table in visit_table()) {
        let outcome = dedupe_visits(table, "患者唯一编码", "就诊日期");
        let mut seen = std::collections::HashSet::new();
        for row in outcome.table.rows() {
            let Some(patient) = row[0].trimmed() else { continue };
            let day = row[1].render()[..10].to_string();
            prop_assert!(seen.insert((patient, day)));
        }
    }
}

#[test]
fn every_sheet_survives_an_empty_merge() {
    for kind in SheetKind::ALL {
        let empty = MergeInput::new("a_processed.sheets", Table::with_schema(kind.schema()));
        let merged = merge_tables(kind.schema(), vec![empty], "2024-03-01 10:00:00");
        assert!(merged.is_empty());
        assert_eq!(merged.columns().len(), kind.schema().len() + 2);
    }
}

#[test]
fn merged_rows_render_with_provenance() {
    let mut first = Table::with_schema(&["患者编号", "姓名"]);
    first.push_row(vec![CellValue::from("P001"), CellValue::from("张三")]);
    let mut second = Table::with_schema(&["患者编号", "姓名"]);
    second.push_row(vec![CellValue::from("P001"), CellValue::from("张三")]);
    second.push_row(vec![CellValue::Number(1002.0), CellValue::from("李四")]);
    let merged = merge_tables(
        &["患者编号", "姓名"],
        vec![
            MergeInput::new("a_processed.sheets", first),
            MergeInput::new("b_processed.sheets", second),
        ],
        "2024-03-01 10:00:00",
    );
    let rendered = merged
        .rows()
        .iter()
        .map(|row| row.iter().map(CellValue::render).collect::<Vec<_>>().join(" | "))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    P001 | 张三 | a_processed.sheets | 2024-03-01 10:00:00
    1002 | 李四 | b_processed.sheets | 2024-03-01 10:00:00
    ");
}
