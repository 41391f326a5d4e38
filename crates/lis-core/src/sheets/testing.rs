use lis_map::{ProjectionPlan, project};
use lis_model::{CellValue, Result, SemanticRole, SheetKind, SourceSheet, Table, columns};
use lis_transform::{
    classify_test_result, derive_visit_fields, infer_test_method, is_covid_test, normalize_times,
};

use super::{SheetBuild, working_schema};
use crate::sources::SourceTables;

/// COVID tests from the examination sheet, on the testing schema plus the
/// hospital code, with the patient key, method and result type derived.
pub(super) fn covid_tests(examinations: &Table) -> Result<Table> {
    let schema = working_schema(
        SheetKind::InfectionTesting.schema(),
        &[columns::HOSPITAL_CODE],
    );
    let plan = ProjectionPlan::new(&schema)
        .bind(columns::HOSPITAL_CODE, SemanticRole::HospitalCode)
        .bind(columns::PATIENT_NUMBER, SemanticRole::PatientNumber)
        .bind(columns::PATIENT_NAME, SemanticRole::PatientName)
        .bind(columns::TEST_NAME, SemanticRole::TestName)
        .bind(columns::TEST_METHOD, SemanticRole::TestMethod)
        .bind(columns::TEST_DATE, SemanticRole::TestDate)
        .bind(columns::TEST_RESULT, SemanticRole::TestResult)
        .bind("检查部门", SemanticRole::TestDepartment)
        .null(columns::RESULT_TYPE)
        .require(SemanticRole::PatientNumber)
        .require(SemanticRole::TestName);
    let mut table = project(examinations, SourceSheet::Examination.sheet_name(), &plan)?;
    let Some(name) = table.column_index(columns::TEST_NAME) else {
        return Ok(table);
    };
    table.retain_rows(|row| {
        row.get(name)
            .and_then(CellValue::as_str)
            .is_some_and(is_covid_test)
    });
    derive_visit_fields(&mut table);

    let method = table.column_index(columns::TEST_METHOD);
    let result = table.column_index(columns::TEST_RESULT);
    let result_type = table.column_index(columns::RESULT_TYPE);
    for row in table.rows_mut() {
        let test_name = row.get(name).and_then(CellValue::trimmed).unwrap_or_default();
        if let Some(cell) = method.and_then(|index| row.get_mut(index))
            && cell.is_blank()
            && let Some(inferred) = infer_test_method(&test_name)
        {
            *cell = CellValue::from(inferred);
        }
        let outcome = classify_test_result(
            result
                .and_then(|index| row.get(index))
                .and_then(CellValue::trimmed)
                .as_deref(),
        );
        if let Some(cell) = result_type.and_then(|index| row.get_mut(index)) {
            *cell = CellValue::from(outcome.label());
        }
    }
    Ok(table)
}

pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let examinations = sources.require(SourceSheet::Examination)?;
    let tests = covid_tests(examinations)?;
    let schema = SheetKind::InfectionTesting.schema();
    let mut table = project(&tests, "covid tests", &ProjectionPlan::new(schema))?;
    normalize_times(&mut table);
    Ok(SheetBuild::new(table))
}
