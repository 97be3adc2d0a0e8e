use std::process::ExitCode;

use clap::Parser;
use gatekeeper_cli::{Cli, run};
use gatekeeper_observability::ObservabilityConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    gatekeeper_observability::init_with(&ObservabilityConfig::pretty(cli.log.clone()));

    match run(cli.command, |name| std::env::var(name).ok()) {
        Ok(outcome) => {
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            if let Some(stderr) = outcome.stderr {
                eprintln!("{stderr}");
            }
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
