use std::process::ExitCode;

use clap::Parser;

fn main() -> anyhow::Result<ExitCode> {
    repopacker::cli::Cli::parse().run()
}
