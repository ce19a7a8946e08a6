use crate::cli::args::{FailuresArgs, OutputFormat};
use crate::exit_codes;
use anyhow::Result;
use tally_core::logscan::analyze_dir;

pub fn run(args: FailuresArgs) -> Result<i32> {
    let analysis = analyze_dir(&args.dir)?;
    match args.format {
        OutputFormat::Text => print!("{}", analysis.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }
    Ok(exit_codes::SUCCESS)
}
