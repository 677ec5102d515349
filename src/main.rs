use clap::Parser;
use std::error::Error as _;
use std::process::ExitCode;
use zipmirror::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging() {
        eprintln!("zipmirror: {}", err);
    }

    match cli.run().await {
        Ok(reports) => {
            let failed = reports.iter().filter(|r| r.failed()).count();
            tracing::info!("{} archive(s) processed, {} failed", reports.len(), failed);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("zipmirror: {}", err);
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
