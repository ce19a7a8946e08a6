use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    about = "Aggregate CLI sample-run results into a self-contained HTML report",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Command>,

    /// `tally [LOG_DIR]` is shorthand for `tally report [LOG_DIR]`
    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the HTML dashboard for a run directory (default command)
    Report(ReportArgs),
    /// List actual CLI failures found in section logs
    Failures(FailuresArgs),
    /// Print the log excerpt of a single run
    Excerpt(ExcerptArgs),
    /// Render benchmark results to HTML and Markdown
    Bench(BenchArgs),
    /// Render scenario scripts in parallel
    Render(RenderArgs),
}

/// Environment fallback for `--config`.
pub const CONFIG_ENV: &str = "TALLY_CONFIG";
/// Environment fallback for `--logs-base`.
pub const LOGS_DIR_ENV: &str = "TALLY_LOGS_DIR";

// Report args are flattened into the top level too, where clap `env` values
// count as present arguments and block subcommands.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Configuration file [env: TALLY_CONFIG] (default: ./tally.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| env_path(CONFIG_ENV))
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Run directory (default: most recent run under the configured log bases)
    pub log_dir: Option<PathBuf>,

    /// Output HTML path (default: <LOG_DIR>/report.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the aggregate summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Base directory searched for run directories [env: TALLY_LOGS_DIR]
    /// (overrides `logs_dirs`)
    #[arg(long)]
    pub logs_base: Option<PathBuf>,

    /// Report heading (overrides `title`)
    #[arg(long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub config: ConfigArg,
}

impl ReportArgs {
    pub fn logs_base(&self) -> Option<PathBuf> {
        self.logs_base.clone().or_else(|| env_path(LOGS_DIR_ENV))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct FailuresArgs {
    /// Run directory holding `<section>.log` files
    pub dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ExcerptArgs {
    /// Run directory
    pub dir: PathBuf,

    /// Section name (file stem of its result file, e.g. 03-storage)
    pub section: String,

    /// Run id, e.g. SR-051 or SR-063/step2
    pub run_id: String,

    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Directory with benchmark result files; reports are written here too
    #[arg(long, env = "REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Directory of scenario scripts
    pub dir: PathBuf,

    /// Renderer binary (overrides `render.renderer`)
    #[arg(long)]
    pub renderer: Option<PathBuf>,

    /// Maximum concurrent renders (overrides `render.workers`)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-script timeout in seconds (overrides `render.timeout_secs`)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Script extension (overrides `render.extension`)
    #[arg(long)]
    pub ext: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub config: ConfigArg,
}
