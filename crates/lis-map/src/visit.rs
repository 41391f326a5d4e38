//! Projection plans for visit rows drawn from the outpatient and inpatient
//! source sheets.

use lis_model::{SemanticRole, SourceSheet, columns};

use crate::projector::ProjectionPlan;

/// Plan projecting one visit source sheet onto `schema`.
///
/// Rows carry the sheet's source label. Inpatient stays become a single
/// visit spanning admission to discharge: admission and discharge fill the
/// visit start and end columns, and the admission and discharge columns
/// themselves are nulled.
pub fn visit_plan(schema: &[&str], source: SourceSheet) -> ProjectionPlan {
    let mut plan = ProjectionPlan::new(schema)
        .bind(columns::HOSPITAL_CODE, SemanticRole::HospitalCode)
        .bind(columns::HOSPITAL_NAME, SemanticRole::HospitalName)
        .bind(columns::PATIENT_NUMBER, SemanticRole::PatientNumber)
        .bind(columns::PATIENT_NAME, SemanticRole::PatientName)
        .bind(columns::AGE_YEARS, SemanticRole::Age)
        .bind(columns::AGE, SemanticRole::Age)
        .bind(columns::GENDER, SemanticRole::Gender)
        .bind(columns::DEPARTMENT, SemanticRole::Department)
        .bind(columns::DIAGNOSIS_CODE, SemanticRole::DiagnosisCode)
        .bind(columns::DIAGNOSIS_TEXT, SemanticRole::DiagnosisText)
        .bind(columns::REGION, SemanticRole::Region)
        .bind(columns::BIRTH_DATE, SemanticRole::BirthDate)
        .bind(columns::CONTACT, SemanticRole::Contact)
        .bind(columns::ADDRESS, SemanticRole::Address)
        .require(SemanticRole::PatientNumber);
    if let Some(label) = source.source_label() {
        plan = plan.literal(columns::SOURCE, label);
    }
    match source {
        SourceSheet::Inpatient => plan
            .bind(columns::VISIT_START, SemanticRole::AdmissionDate)
            .bind(columns::VISIT_END, SemanticRole::DischargeDate)
            .null(columns::ADMISSION_DATE)
            .null(columns::DISCHARGE_DATE)
            .require(SemanticRole::AdmissionDate),
        _ => plan
            .bind(columns::VISIT_START, SemanticRole::VisitStart)
            .bind(columns::VISIT_END, SemanticRole::VisitEnd)
            .require(SemanticRole::VisitStart),
    }
}
