//! `tally excerpt <DIR> <SECTION> <RUN_ID>`: the same lookup the dashboard drawer
//! performs, for terminals and scripts. A lifecycle base id prints all its steps.

use crate::cli::args::ExcerptArgs;
use crate::exit_codes;
use anyhow::{bail, Result};
use tally_core::correlate::{extract_lifecycle_log, extract_run_log};
use tally_core::load::{load_section, load_sections, LoadOptions};
use tally_core::Section;

pub const NO_EXCERPT: &str = "No log excerpt found for this run.";

fn find_section(args: &ExcerptArgs, opts: &LoadOptions) -> Result<Section> {
    let path = args.dir.join(format!("{}.json", args.section));
    if path.is_file() {
        return Ok(load_section(&path, opts)?);
    }
    // result files are usually named after their section, but not always
    let found = load_sections(&args.dir, opts)?
        .into_iter()
        .find(|s| s.section == args.section);
    match found {
        Some(section) => Ok(section),
        None => bail!("section {} not found in {}", args.section, args.dir.display()),
    }
}

pub fn run(args: ExcerptArgs) -> Result<i32> {
    let cfg = super::load_config(&args.config)?;
    let opts = LoadOptions {
        log_cap_chars: cfg.log_cap_chars,
    };
    let section = find_section(&args, &opts)?;
    let excerpt = extract_run_log(&section.log, &args.run_id)
        .or_else(|| extract_lifecycle_log(&section.runs, &section.log, &args.run_id));
    match excerpt {
        Some(excerpt) => println!("{excerpt}"),
        None => println!("{NO_EXCERPT}"),
    }
    Ok(exit_codes::SUCCESS)
}
