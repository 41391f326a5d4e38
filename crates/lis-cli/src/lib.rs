//! CLI library components for the reconciliation engine.

pub mod logging;
