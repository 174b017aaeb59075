mod check;
mod cli;
mod config;
mod criteria;
mod error;
mod notification;
mod report;
mod score;
mod state;
mod types;

use crate::error::UrgencyError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<i32, UrgencyError> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        cli::Commands::Check(cmd) => {
            let loaded = config::load_config(cmd.config_path.as_deref())?;
            let store = state::StateStore::new(loaded.state_file_path()?);
            let source = check::ShellCommand::from_config(&loaded);
            let options = check::CheckOptions {
                quiet: cmd.quiet,
                no_update: cmd.no_update,
                no_cache: cmd.no_cache,
                output_format: cmd.output_format.into(),
            };

            let outcome =
                check::run_check(&loaded, &options, &source, &store, chrono::Utc::now())?;
            tracing::debug!(
                refreshed = outcome.refreshed,
                persisted = outcome.persisted,
                "check finished"
            );
            if let Some(rendered) = &outcome.rendered {
                println!("{rendered}");
            }

            if let Some(notification) = &loaded.notification {
                notification::maybe_notify(
                    notification,
                    &outcome.report,
                    outcome.previous_level,
                    &notification::NotifySend,
                );
            }

            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            let code = exit_code_for(&e);
            if code == exit_code::SUCCESS {
                eprintln!("warning: {}", e);
            } else {
                eprintln!("error: {}", e);
                std::process::exit(code);
            }
        }
    }
}

/// Recovered kinds never fail the run, whatever layer surfaced them.
fn exit_code_for(error: &UrgencyError) -> i32 {
    if error.is_fatal() {
        exit_code::FAILURE
    } else {
        exit_code::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fatal_errors_fail_the_process() {
        assert_eq!(
            exit_code_for(&UrgencyError::Config("bad thresholds".to_string())),
            exit_code::FAILURE
        );
        assert_eq!(
            exit_code_for(&UrgencyError::Refresh("exit 1".to_string())),
            exit_code::FAILURE
        );
        assert_eq!(
            exit_code_for(&UrgencyError::Persist("read-only".to_string())),
            exit_code::SUCCESS
        );
        assert_eq!(
            exit_code_for(&UrgencyError::Notification("no bus".to_string())),
            exit_code::SUCCESS
        );
    }
}
