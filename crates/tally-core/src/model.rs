//! Run records and sections as written by the sample-run harness.

use serde::{Deserialize, Serialize};

/// Command placeholder prefix for runs the harness skipped.
pub const SKIP_PREFIX: &str = "(skipped";
/// Conventional exit code of a timed-out command.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// One recorded CLI invocation.
///
/// `exit_code` is the harness's judgment (a test may tolerate a failing
/// command); `cli_exit_code`, when present, is what the process really returned.
/// The two are kept side by side and never reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRunRecord")]
pub struct RunRecord {
    pub id: String,
    pub slug: String,
    pub command: String,
    pub exit_code: i32,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cli_exit_code: Option<i32>,
}

/// Wire shape: older harness versions spell the identifier `sr_id`.
#[derive(Deserialize)]
struct RawRunRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sr_id: Option<String>,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    command: String,
    exit_code: i32,
    #[serde(default)]
    duration_seconds: f64,
    #[serde(default)]
    cli_exit_code: Option<i32>,
}

impl From<RawRunRecord> for RunRecord {
    fn from(raw: RawRunRecord) -> Self {
        Self {
            id: raw.id.or(raw.sr_id).unwrap_or_default(),
            slug: raw.slug,
            command: raw.command,
            exit_code: raw.exit_code,
            duration_seconds: raw.duration_seconds,
            cli_exit_code: raw.cli_exit_code,
        }
    }
}

/// Classification of a run. Every run maps to exactly one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Fail,
    Timeout,
    Skip,
}

impl RunRecord {
    /// Skip wins over any exit code; then timeout, then success, else failure.
    pub fn outcome(&self) -> Outcome {
        if self.is_skipped() {
            Outcome::Skip
        } else if self.exit_code == TIMEOUT_EXIT_CODE {
            Outcome::Timeout
        } else if self.exit_code == 0 {
            Outcome::Ok
        } else {
            Outcome::Fail
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.command.starts_with(SKIP_PREFIX)
    }

    /// Exit code for "did the command truly succeed": the raw process code when
    /// recorded, otherwise the harness code.
    pub fn effective_exit_code(&self) -> i32 {
        self.cli_exit_code.unwrap_or(self.exit_code)
    }

    /// Passed by the harness although the underlying command exited non-zero.
    pub fn is_tolerated_failure(&self) -> bool {
        self.outcome() == Outcome::Ok && self.effective_exit_code() != 0
    }

    /// `SR-063/step2` -> `SR-063`.
    pub fn base_id(&self) -> &str {
        self.id.split('/').next().unwrap_or(&self.id)
    }

    /// `SR-063/step2` -> `Some("step2")`.
    pub fn step(&self) -> Option<&str> {
        self.id.split_once('/').map(|(_, step)| step)
    }
}

/// Backend a section was executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Real,
    Mock,
    #[serde(other)]
    Other,
}

fn default_section_name() -> String {
    "unknown".to_string()
}

/// One section result file, plus the companion log attached by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default = "default_section_name")]
    pub section: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub timestamp: String,
    /// Execution order; log correlation depends on it.
    #[serde(default)]
    pub runs: Vec<RunRecord>,
    #[serde(default)]
    pub log: String,
}

impl Section {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.section
        } else {
            &self.title
        }
    }
}
