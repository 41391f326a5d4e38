use std::collections::HashMap;

use chrono::NaiveDateTime;
use lis_model::{CellValue, Result, SheetKind, Table, columns};
use lis_transform::{format_timestamp, normalize_times, parse_timestamp};

use super::frame::visit_frame;
use super::{SheetBuild, row_for};
use crate::sources::SourceTables;

struct PatientVisits {
    latest_row: usize,
    latest: Option<NaiveDateTime>,
    first: Option<NaiveDateTime>,
    visits: usize,
}

/// One row per patient unique key. Demographics come from the most recent
/// visit. Visits without a key are not registered.
pub(super) fn build(sources: &SourceTables) -> Result<SheetBuild> {
    let frame = visit_frame(sources)?;
    let visits = &frame.table;
    let key_idx = visits.column_index(columns::PATIENT_KEY);
    let start_idx = visits.column_index(columns::VISIT_START);

    let mut order: Vec<String> = Vec::new();
    let mut patients: HashMap<String, PatientVisits> = HashMap::new();
    for (index, row) in visits.rows().iter().enumerate() {
        let Some(key) = key_idx.and_then(|i| row.get(i)).and_then(CellValue::trimmed) else {
            continue;
        };
        let start = start_idx.and_then(|i| row.get(i)).and_then(parse_timestamp);
        match patients.get_mut(&key) {
            Some(patient) => {
                patient.visits += 1;
                if start.is_some() && (patient.latest.is_none() || start > patient.latest) {
                    patient.latest = start;
                    patient.latest_row = index;
                }
                if start.is_some() && (patient.first.is_none() || start < patient.first) {
                    patient.first = start;
                }
            }
            None => {
                order.push(key.clone());
                patients.insert(
                    key,
                    PatientVisits {
                        latest_row: index,
                        latest: start,
                        first: start,
                        visits: 1,
                    },
                );
            }
        }
    }

    let schema = SheetKind::PatientRegistry.schema();
    let mut table = Table::with_schema(schema);
    for key in &order {
        let Some(patient) = patients.get(key) else {
            continue;
        };
        let latest = |column: &str| {
            visits
                .value(patient.latest_row, column)
                .cloned()
                .unwrap_or_default()
        };
        let rendered = |moment: Option<NaiveDateTime>| {
            moment.map_or(CellValue::Null, |value| CellValue::from(format_timestamp(value)))
        };
        let row = row_for(schema, |column| match column {
            columns::PATIENT_KEY => CellValue::from(key.as_str()),
            columns::AGE => latest(columns::AGE_YEARS),
            columns::FIRST_VISIT => rendered(patient.first),
            columns::LAST_VISIT => rendered(patient.latest),
            columns::VISIT_COUNT => CellValue::Number(patient.visits as f64),
            other => latest(other),
        });
        table.push_row(row);
    }
    normalize_times(&mut table);
    Ok(SheetBuild {
        table,
        dropped_duplicates: frame.dropped,
    })
}
