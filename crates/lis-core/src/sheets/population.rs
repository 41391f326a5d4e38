use lis_model::{Result, SheetKind, columns};
use lis_transform::{derive_population_fields, normalize_times};

use super::SheetBuild;
use super::frame::{reproject, visit_frame};
use crate::sources::SourceTables;

pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let frame = visit_frame(sources)?;
    let mut table = reproject(&frame.table, SheetKind::PopulationSegmentation.schema())?;
    derive_population_fields(&mut table, columns::AGE);
    normalize_times(&mut table);
    Ok(SheetBuild {
        table,
        dropped_duplicates: frame.dropped,
    })
}
