use lis_model::{CellValue, Result, SheetKind, SourceSheet, Table, columns};
use lis_transform::{
    RS_MATCH_POLICY, TestOutcome, classify_test_result, derive_infection_flags, flag_label,
    normalize_times,
};
use tracing::warn;

use super::frame::{reproject, visit_frame};
use super::testing::covid_tests;
use super::{SheetBuild, row_for};
use crate::sources::SourceTables;

const CONFIRMED: &str = "确诊";

/// Visits with the COVID, RS and pneumonia flags, followed by COVID test
/// results when the workbook has an examination sheet.
pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let frame = visit_frame(sources)?;
    let schema = SheetKind::InfectionTracking.schema();
    let mut table = reproject(&frame.table, schema)?;
    derive_infection_flags(&mut table, RS_MATCH_POLICY);

    let covid = table.column_index(columns::COVID_FLAG);
    let status = table.column_index(columns::INFECTION_STATUS);
    let positive = CellValue::from(flag_label(true));
    for row in table.rows_mut() {
        let confirmed = covid.and_then(|index| row.get(index)) == Some(&positive);
        if confirmed && let Some(cell) = status.and_then(|index| row.get_mut(index)) {
            *cell = CellValue::from(CONFIRMED);
        }
    }

    if let Some(examinations) = sources.optional(SourceSheet::Examination) {
        match covid_tests(examinations) {
            Ok(tests) => append_test_rows(&mut table, &tests),
            Err(error) => warn!(%error, "examination sheet skipped for infection tracking"),
        }
    }

    normalize_times(&mut table);
    Ok(SheetBuild {
        table,
        dropped_duplicates: frame.dropped,
    })
}

fn append_test_rows(table: &mut Table, tests: &Table) {
    let schema = SheetKind::InfectionTracking.schema();
    let source_label = SourceSheet::Examination.source_label().unwrap_or_default();
    for index in 0..tests.len() {
        let value = |column: &str| tests.value(index, column).cloned().unwrap_or_default();
        let outcome = classify_test_result(value(columns::TEST_RESULT).trimmed().as_deref());
        let row = row_for(schema, |column| match column {
            columns::PATIENT_NUMBER | columns::PATIENT_KEY | columns::PATIENT_NAME => {
                value(column)
            }
            columns::SOURCE => CellValue::from(source_label),
            columns::COVID_FLAG => {
                CellValue::from(flag_label(outcome == TestOutcome::Positive))
            }
            columns::RS_FLAG | columns::PNEUMONIA_FLAG => CellValue::from(flag_label(false)),
            columns::INFECTION_STATUS => CellValue::from(outcome.infection_status()),
            columns::DETECTION_METHOD => value(columns::TEST_METHOD),
            columns::DETECTION_RESULT => value(columns::TEST_RESULT),
            columns::DETECTION_DATE => value(columns::TEST_DATE),
            _ => CellValue::Null,
        });
        table.push_row(row);
    }
}
