mod cli;
mod output;
mod runner;

use clap::Parser;
use faq_dedup::DedupError;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::runner::run_command;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = real_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), DedupError> {
    let cli = Cli::parse();
    let report = run_command(&cli)?;
    output::print_report(&cli.output, &report)
}
