//! Schema reconciliation: locating semantically named source columns and
//! projecting source rows onto a canonical schema.

pub mod projector;
pub mod resolver;
pub mod visit;

pub use projector::{ProjectionPlan, project};
pub use resolver::{column_matches, contains_keyword, require, resolve, resolve_single};
pub use visit::visit_plan;
