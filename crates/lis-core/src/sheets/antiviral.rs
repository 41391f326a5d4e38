use lis_map::{ProjectionPlan, project};
use lis_model::{CellValue, Result, SemanticRole, SheetKind, SourceSheet, columns};
use lis_transform::{derive_visit_fields, is_antiviral, normalize_times};

use super::{SheetBuild, working_schema};
use crate::sources::SourceTables;

const ANTIVIRAL_DRUG_TYPE: &str = "抗病毒药物";

/// Medication orders for antiviral drugs.
pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let orders = sources.require(SourceSheet::Medication)?;
    let schema = working_schema(
        SheetKind::AntiviralMedication.schema(),
        &[columns::HOSPITAL_CODE],
    );
    let plan = ProjectionPlan::new(&schema)
        .bind(columns::HOSPITAL_CODE, SemanticRole::HospitalCode)
        .bind(columns::PATIENT_NUMBER, SemanticRole::PatientNumber)
        .bind(columns::PATIENT_NAME, SemanticRole::PatientName)
        .bind(columns::DRUG_NAME, SemanticRole::DrugName)
        .bind("用药日期", SemanticRole::MedicationDate)
        .bind("剂量", SemanticRole::Dosage)
        .bind("频次", SemanticRole::Frequency)
        .bind("用药途径", SemanticRole::Route)
        .literal(columns::DRUG_TYPE, ANTIVIRAL_DRUG_TYPE)
        .require(SemanticRole::PatientNumber)
        .require(SemanticRole::DrugName);
    let mut working = project(orders, SourceSheet::Medication.sheet_name(), &plan)?;
    if let Some(drug) = working.column_index(columns::DRUG_NAME) {
        working.retain_rows(|row| {
            row.get(drug)
                .and_then(CellValue::as_str)
                .is_some_and(is_antiviral)
        });
    }
    derive_visit_fields(&mut working);

    let mut table = project(
        &working,
        "antiviral orders",
        &ProjectionPlan::new(SheetKind::AntiviralMedication.schema()),
    )?;
    normalize_times(&mut table);
    Ok(SheetBuild::new(table))
}
