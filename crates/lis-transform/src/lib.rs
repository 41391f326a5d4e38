//! Row-level transformations applied after projection.
//!
//! Order within one sheet: derived fields, visit deduplication, time
//! normalization. The merger runs later, across processed workbooks.

pub mod classify;
pub mod datetime;
pub mod dedupe;
pub mod merge;
pub mod normalize;
pub mod rules;

pub use classify::{
    ANTIVIRAL_KEYWORDS, COVID_TEST_KEYWORDS, TestOutcome, classify_test_result,
    infer_test_method, is_antiviral, is_covid_test,
};
pub use datetime::{format_timestamp, parse_timestamp};
pub use dedupe::{DedupeOutcome, DroppedVisit, dedupe_visits};
pub use merge::{MergeInput, identifier_column, merge_tables};
pub use normalize::{date_columns, normalize_time_value, normalize_times};
pub use rules::{
    AgeCohort, DEFAULT_HOSPITAL_CODE, PopulationCategory, RS_CODES, RS_MATCH_POLICY,
    RsMatchPolicy, VisitCategory, age_cohort, covid_positive, derive_infection_flags,
    derive_population_fields, derive_visit_fields, flag_label, hospital_code, parse_age,
    patient_key, pneumonia_flag, population_category, rs_flag, visit_category,
};
