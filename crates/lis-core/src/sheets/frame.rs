use lis_map::{ProjectionPlan, project, visit_plan};
use lis_model::{Result, SemanticRole, SheetKind, SourceSheet, Table, columns};
use lis_transform::{dedupe_visits, derive_visit_fields};

use super::working_schema;
use crate::sources::SourceTables;

/// Visit columns carried for the sheets derived from visits but absent from
/// the visit-merge schema.
const FRAME_EXTRA_COLUMNS: &[&str] = &[
    columns::PATIENT_NAME,
    columns::REGION,
    columns::BIRTH_DATE,
    columns::CONTACT,
    columns::ADDRESS,
    "诊断类型",
    "诊断医生",
];

const FRAME_NAME: &str = "visit frame";

/// Deduplicated outpatient and inpatient visits with the visit fields
/// derived.
pub(super) struct VisitFrame {
    pub table: Table,
    pub dropped: usize,
}

pub(super) fn visit_frame(sources: &SourceTables) -> Result<VisitFrame> {
    let schema = working_schema(SheetKind::VisitMerge.schema(), FRAME_EXTRA_COLUMNS);
    let mut frame = Table::with_schema(&schema);
    for source in [SourceSheet::Outpatient, SourceSheet::Inpatient] {
        let table = sources.require(source)?;
        let plan = visit_plan(&schema, source);
        let projected = project(table, source.sheet_name(), &plan)?;
        frame.extend_rows(projected.into_rows());
    }
    derive_visit_fields(&mut frame);
    let outcome = dedupe_visits(frame, columns::PATIENT_KEY, columns::VISIT_START);
    Ok(VisitFrame {
        dropped: outcome.dropped_count(),
        table: outcome.table,
    })
}

/// Projects the visit frame onto a canonical schema. Columns pass through
/// by name; a plain age column takes the age in years.
pub(super) fn reproject(frame: &Table, schema: &[&str]) -> Result<Table> {
    let plan = ProjectionPlan::new(schema).bind(columns::AGE, SemanticRole::Age);
    project(frame, FRAME_NAME, &plan)
}
