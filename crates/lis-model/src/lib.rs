//! Data model for the clinical workbook reconciliation engine.
//!
//! Everything here is plain data: the in-memory [`Table`], the seven
//! canonical output sheets ([`SheetKind`]) with their fixed schemas, the raw
//! source sheets ([`SourceSheet`]), the keyword-driven [`SemanticRole`]s, the
//! shared error taxonomy and the status types aggregated into reports.

pub mod dates;
pub mod error;
pub mod privacy;
pub mod processing;
pub mod role;
pub mod sheet;
pub mod table;

pub use dates::excel_serial_to_datetime;
pub use error::{LisError, Result};
pub use privacy::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
pub use processing::{
    BatchReport, FileOutcome, FileStatus, MergeReport, MergeSheetOutcome, SheetOutcome,
    SheetStatus,
};
pub use role::{DATE_COLUMN_KEYWORDS, SemanticRole};
pub use sheet::{PROVENANCE_COLUMNS, SheetKind, SourceSheet, columns};
pub use table::{CellValue, Row, Table, format_number};
