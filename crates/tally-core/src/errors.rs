//! Error types for the reporting pipeline.

use std::path::PathBuf;

/// Reporting errors.
///
/// Per-file problems (a corrupt section JSON, an unreadable log) never surface
/// here; the loader logs and skips them. Only conditions that leave nothing to
/// report are errors.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    /// An explicitly requested log directory does not exist.
    #[error("log directory not found: {}", path.display())]
    LogDirNotFound { path: PathBuf },

    /// No explicit directory was given and none of the search bases holds a run.
    #[error("no log directories found (searched: {searched})")]
    NoLogDirs { searched: String },

    /// The directory exists but no section file could be loaded from it.
    #[error("no JSON result files found in {}", dir.display())]
    NoSections { dir: PathBuf },

    /// No benchmark result files in the report directory.
    #[error("no benchmark results found in {}", dir.display())]
    NoBenchmarkResults { dir: PathBuf },

    /// Filesystem error on a path the caller asked for.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A JSON document the caller asked for is malformed.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TallyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Nothing to report
            Self::LogDirNotFound { .. } => 1,
            Self::NoLogDirs { .. } => 1,
            Self::NoSections { .. } => 1,
            Self::NoBenchmarkResults { .. } => 1,

            // Setup problems
            Self::Config { .. } => 2,
            Self::Io { .. } => 2,
            Self::Json { .. } => 2,
        }
    }
}

/// Result type for reporting operations.
pub type TallyResult<T> = Result<T, TallyError>;
