//! Aggregation, log correlation and report rendering for CLI sample-run results.
//!
//! The pipeline: [`load::load_sections`] discovers one JSON result file (plus an
//! optional companion `.log`) per section, [`summary::summarize`] classifies every
//! run, and [`report::dashboard::render_dashboard`] emits a self-contained HTML page
//! with the summary embedded as data.

pub mod ansi;
pub mod config;
pub mod correlate;
pub mod errors;
pub mod load;
pub mod logscan;
pub mod model;
pub mod render_pool;
pub mod report;
pub mod summary;

pub use errors::{TallyError, TallyResult};
pub use model::{Outcome, RunRecord, Section, Target};
pub use summary::{summarize, AggregateSummary, SectionSummary};
