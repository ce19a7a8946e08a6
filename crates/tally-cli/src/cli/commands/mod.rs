pub mod bench;
mod dispatch;
pub mod excerpt;
pub mod failures;
pub mod render;
pub mod report;

pub use dispatch::dispatch;

use super::args::ConfigArg;
use anyhow::Result;
use tally_core::config::TallyConfig;

pub(crate) fn load_config(arg: &ConfigArg) -> Result<TallyConfig> {
    let path = arg.path();
    let cfg = TallyConfig::load_or_default(path.as_deref())?;
    if let Some(path) = &path {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }
    Ok(cfg)
}
