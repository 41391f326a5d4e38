use lis_model::{Result, SheetKind};
use lis_transform::normalize_times;

use super::SheetBuild;
use super::frame::{reproject, visit_frame};
use crate::sources::SourceTables;

pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let frame = visit_frame(sources)?;
    let mut table = reproject(&frame.table, SheetKind::VisitMerge.schema())?;
    normalize_times(&mut table);
    Ok(SheetBuild {
        table,
        dropped_duplicates: frame.dropped,
    })
}
