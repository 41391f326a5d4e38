use lis_model::{Result, SheetKind, columns};
use lis_transform::normalize_times;

use super::SheetBuild;
use super::frame::{reproject, visit_frame};
use crate::sources::SourceTables;

/// Visits carrying a diagnosis code or text.
pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let frame = visit_frame(sources)?;
    let mut table = reproject(&frame.table, SheetKind::Diagnosis.schema())?;
    let code = table.column_index(columns::DIAGNOSIS_CODE);
    let text = table.column_index(columns::DIAGNOSIS_TEXT);
    table.retain_rows(|row| {
        [code, text]
            .into_iter()
            .flatten()
            .any(|index| row.get(index).is_some_and(|cell| !cell.is_blank()))
    });
    normalize_times(&mut table);
    Ok(SheetBuild {
        table,
        dropped_duplicates: frame.dropped,
    })
}
