//! `tally render <DIR>`: render every scenario script with bounded parallelism.

use crate::cli::args::{OutputFormat, RenderArgs};
use crate::exit_codes;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tally_core::render_pool::{discover_scripts, render_all, CommandRenderer, ScriptRenderer};

pub async fn run(args: RenderArgs) -> Result<i32> {
    let cfg = super::load_config(&args.config)?.render;
    let timeout = args
        .timeout_secs
        .map_or_else(|| cfg.timeout(), Duration::from_secs);
    let renderer = args.renderer.unwrap_or(cfg.renderer);
    let workers = args.workers.unwrap_or(cfg.workers);
    let ext = args.ext.unwrap_or(cfg.extension);

    let scripts = discover_scripts(&args.dir, &ext)?;
    if scripts.is_empty() {
        eprintln!("No *.{ext} scripts found in {}", args.dir.display());
        return Ok(exit_codes::SUCCESS);
    }
    let renderer: Arc<dyn ScriptRenderer> = Arc::new(CommandRenderer::new(renderer));
    tracing::info!(
        scripts = scripts.len(),
        workers,
        renderer = %renderer.name(),
        "rendering scenario scripts"
    );

    let results = render_all(renderer, scripts, workers, timeout).await;
    let failed = results.values().filter(|o| !o.ok).count();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for (name, outcome) in &results {
                if outcome.ok {
                    println!("  [ok] {name}");
                } else {
                    println!("  [FAILED] {name}: {}", outcome.diagnostic);
                }
            }
            println!("Rendered {}/{} scripts", results.len() - failed, results.len());
        }
    }

    Ok(if failed == 0 {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    })
}
