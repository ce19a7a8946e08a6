use crate::cli::args::BenchArgs;
use crate::exit_codes;
use anyhow::Result;
use tally_core::report::bench::{load_results, write_reports};

pub fn run(args: BenchArgs) -> Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let dir = args.report_dir.unwrap_or(cfg.bench.report_dir);

    println!("Generating reports...");
    let results = load_results(&dir)?;
    let (html, md) = write_reports(&dir, &results)?;
    println!("  HTML report: {}", html.display());
    println!("  Markdown report: {}", md.display());

    let s = &results.summary;
    println!(
        "  {} passed, {} failed of {} validations ({:.1}%)",
        s.passed, s.failed, s.total_claims_validated, s.pass_rate
    );
    Ok(exit_codes::SUCCESS)
}
