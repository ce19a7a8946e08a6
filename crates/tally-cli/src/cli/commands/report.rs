//! `tally [report] [LOG_DIR]`: load a run directory, summarize it, write the
//! HTML dashboard (and optionally the summary as JSON).

use crate::cli::args::ReportArgs;
use crate::exit_codes;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tally_core::load::{load_sections, resolve_log_dir, LoadOptions};
use tally_core::report::dashboard::{render_page, PageMeta};
use tally_core::summarize;

pub fn run(args: ReportArgs) -> Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let bases: Vec<PathBuf> = match args.logs_base() {
        Some(base) => vec![base],
        None => cfg.logs_dirs.clone(),
    };

    let log_dir = resolve_log_dir(args.log_dir.as_deref(), &bases)?;
    println!("Loading results from: {}", log_dir.display());

    let opts = LoadOptions {
        log_cap_chars: cfg.log_cap_chars,
    };
    let sections = load_sections(&log_dir, &opts)?;
    println!("  Found {} sections", sections.len());

    let summary = summarize(sections);
    println!("  {summary}");

    let run_label = log_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| log_dir.display().to_string());
    let title = args.title.unwrap_or(cfg.title);
    let meta = PageMeta {
        title: &title,
        ..PageMeta::now(&run_label)
    };
    let html = render_page(&summary, &meta);

    let output = args
        .output
        .unwrap_or_else(|| log_dir.join(&cfg.report_file));
    std::fs::write(&output, html)
        .with_context(|| format!("failed to write report {}", output.display()))?;
    println!("  Report: {}", output.display());

    if let Some(path) = args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
        println!("  Summary JSON: {}", path.display());
    }

    Ok(exit_codes::SUCCESS)
}
