//! Visit deduplicator.
//!
//! At most one row per (identity, calendar date). Among rows sharing a key
//! the latest full timestamp wins; ties keep the earliest row. Rows without
//! an identity or a parseable date are never deduplicated.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use lis_model::{Table, redact_value};
use tracing::{debug, info};

use crate::datetime::parse_timestamp;

/// A row removed by [`dedupe_visits`], indexed against the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedVisit {
    pub row: usize,
    pub identity: String,
    pub date: NaiveDate,
    pub kept_row: usize,
}

#[derive(Debug, Clone)]
pub struct DedupeOutcome {
    pub table: Table,
    pub dropped: Vec<DroppedVisit>,
}

impl DedupeOutcome {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

type VisitKey = (String, NaiveDate);

/// Deduplicates `table` on `identity_column` and the calendar date of
/// `date_column`. Missing columns leave the table unchanged.
pub fn dedupe_visits(table: Table, identity_column: &str, date_column: &str) -> DedupeOutcome {
    let (Some(identity_idx), Some(date_idx)) = (
        table.column_index(identity_column),
        table.column_index(date_column),
    ) else {
        debug!(
            identity_column,
            date_column, "dedupe skipped, key column missing"
        );
        return DedupeOutcome {
            table,
            dropped: Vec::new(),
        };
    };

    let keys: Vec<Option<(VisitKey, NaiveDateTime)>> = table
        .rows()
        .iter()
        .map(|row| {
            let identity = row.get(identity_idx)?.trimmed()?;
            let timestamp = parse_timestamp(row.get(date_idx)?)?;
            Some(((identity, timestamp.date()), timestamp))
        })
        .collect();

    let mut winners: BTreeMap<&VisitKey, (usize, NaiveDateTime)> = BTreeMap::new();
    for (index, entry) in keys.iter().enumerate() {
        let Some((key, timestamp)) = entry else {
            continue;
        };
        winners
            .entry(key)
            .and_modify(|winner| {
                if *timestamp > winner.1 {
                    *winner = (index, *timestamp);
                }
            })
            .or_insert((index, *timestamp));
    }

    let mut dropped = Vec::new();
    for (index, entry) in keys.iter().enumerate() {
        let Some((key, _)) = entry else {
            continue;
        };
        let Some(&(kept_row, _)) = winners.get(key) else {
            continue;
        };
        if kept_row != index {
            debug!(
                patient = redact_value(&key.0),
                date = %key.1,
                row = index,
                kept_row,
                "dropped duplicate visit"
            );
            dropped.push(DroppedVisit {
                row: index,
                identity: key.0.clone(),
                date: key.1,
                kept_row,
            });
        }
    }

    let mut table = table;
    if !dropped.is_empty() {
        info!(dropped = dropped.len(), "removed duplicate visits");
        let mut position = 0usize;
        let mut next_drop = dropped.iter().map(|visit| visit.row).peekable();
        table.retain_rows(|_| {
            let current = position;
            position += 1;
            if next_drop.peek() == Some(&current) {
                next_drop.next();
                false
            } else {
                true
            }
        });
    }
    DedupeOutcome { table, dropped }
}
