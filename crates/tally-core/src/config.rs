//! `tally.yaml`: optional project configuration. Every key has a default and
//! command-line flags override file values.

use crate::ansi::DEFAULT_LOG_CAP_CHARS;
use crate::errors::{TallyError, TallyResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tally.yaml";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    /// Bases searched (in order) for the most recent run directory.
    pub logs_dirs: Vec<PathBuf>,

    /// Characters of each section log embedded in the report.
    pub log_cap_chars: usize,

    /// Report file name, written inside the run directory.
    pub report_file: String,

    /// Heading shown in the dashboard header.
    pub title: String,

    pub render: RenderConfig,

    pub bench: BenchConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            logs_dirs: vec![PathBuf::from("logs"), PathBuf::from("../logs")],
            log_cap_chars: DEFAULT_LOG_CAP_CHARS,
            report_file: "report.html".to_string(),
            title: "Sample Runs Report".to_string(),
            render: RenderConfig::default(),
            bench: BenchConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Renderer binary, resolved through PATH when relative.
    pub renderer: PathBuf,
    pub workers: usize,
    /// Per-job limit; a job over it is marked failed, others are unaffected.
    pub timeout_secs: u64,
    /// Extension of scenario scripts picked up from the input directory.
    pub extension: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            renderer: PathBuf::from("yr"),
            workers: 4,
            timeout_secs: 600,
            extension: "yr".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub report_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("reports"),
        }
    }
}

impl TallyConfig {
    pub fn from_yaml(path: &Path, text: &str) -> TallyResult<Self> {
        // An empty file deserializes to null; treat it as "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| TallyError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> TallyResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TallyError::io(path, e))?;
        Self::from_yaml(path, &text)
    }

    /// Explicit path must exist; otherwise `tally.yaml` is used when present and
    /// defaults apply when it is not.
    pub fn load_or_default(explicit: Option<&Path>) -> TallyResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!(path = %fallback.display(), "using project config");
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
