//! Builders for the seven canonical sheets.
//!
//! Every builder is independent: a failure in one never stops the others.
//! Visit-based sheets each build their own visit frame from the outpatient
//! and inpatient sheets.

mod antiviral;
mod diagnosis;
mod frame;
mod infection;
mod population;
mod registry;
mod testing;
mod visit_merge;

use lis_model::{CellValue, Result, Row, SheetKind, Table};

use crate::sources::SourceTables;

/// A canonical sheet built from one workbook.
#[derive(Debug, Clone)]
pub struct SheetBuild {
    pub table: Table,
    /// Visit rows removed by the deduplicator.
    pub dropped_duplicates: usize,
}

impl SheetBuild {
    fn new(table: Table) -> Self {
        Self {
            table,
            dropped_duplicates: 0,
        }
    }
}

pub fn build_sheet(kind: SheetKind, sources: &SourceTables) -> Result<SheetBuild> {
    match kind {
        SheetKind::VisitMerge => visit_merge::build(sources),
        SheetKind::Diagnosis => diagnosis::build(sources),
        SheetKind::InfectionTracking => infection::build(sources),
        SheetKind::AntiviralMedication => antiviral::build(sources),
        SheetKind::InfectionTesting => testing::build(sources),
        SheetKind::PopulationSegmentation => population::build(sources),
        SheetKind::PatientRegistry => registry::build(sources),
    }
}

/// One row of `schema`, filled column by column.
fn row_for(schema: &[&str], mut fill: impl FnMut(&str) -> CellValue) -> Row {
    schema.iter().map(|column| fill(*column)).collect()
}

/// `schema` with `extra` columns appended, skipping ones already present.
fn working_schema(schema: &[&'static str], extra: &[&'static str]) -> Vec<&'static str> {
    let mut columns = schema.to_vec();
    for column in extra {
        if !columns.contains(column) {
            columns.push(*column);
        }
    }
    columns
}
