use crate::cli::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        None => super::report::run(cli.report),
        Some(Command::Report(args)) => super::report::run(args),
        Some(Command::Failures(args)) => super::failures::run(args),
        Some(Command::Excerpt(args)) => super::excerpt::run(args),
        Some(Command::Bench(args)) => super::bench::run(args),
        Some(Command::Render(args)) => super::render::run(args).await,
    }
}
