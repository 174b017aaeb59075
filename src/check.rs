use crate::criteria::CriteriaRegistry;
use crate::error::{Result, UrgencyError};
use crate::report::{self, OutputFormat};
use crate::score::score;
use crate::state::{PersistedState, StateStore};
use crate::types::config::UrgencyConfig;
use crate::types::report::{ScoreReport, UpdateSet, UrgencyLevel};
use chrono::{DateTime, Duration, Utc};
use std::process::Command;

/// Producer of the raw list of pending updates.
pub trait UpdateSource {
    fn list_updates(&self) -> Result<UpdateSet>;
}

/// Runs `cmd_available` through `sh -c`.
pub struct ShellCommand {
    command: String,
    no_updates_exit_code: Option<i32>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>, no_updates_exit_code: Option<i32>) -> Self {
        Self {
            command: command.into(),
            no_updates_exit_code,
        }
    }

    pub fn from_config(config: &UrgencyConfig) -> Self {
        Self::new(config.cmd_available.clone(), config.cmd_no_updates_exit_code)
    }
}

impl UpdateSource for ShellCommand {
    fn list_updates(&self) -> Result<UpdateSet> {
        tracing::info!(command = %self.command, "querying available updates");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(|e| UrgencyError::Refresh(format!("failed to spawn shell: {e}")))?;

        match output.status.code() {
            Some(0) => {}
            Some(code) if Some(code) == self.no_updates_exit_code => {
                return Ok(UpdateSet::default());
            }
            status => {
                return Err(UrgencyError::CommandFailure {
                    command: self.command.clone(),
                    status: status.unwrap_or(-1),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| UrgencyError::Refresh(format!("output is not valid UTF-8: {e}")))?;
        Ok(UpdateSet::parse(&stdout))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub quiet: bool,
    pub no_update: bool,
    pub no_cache: bool,
    pub output_format: OutputFormat,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            quiet: false,
            no_update: false,
            no_cache: false,
            output_format: OutputFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Refresh,
    Reuse,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub report: ScoreReport,
    pub previous_level: Option<UrgencyLevel>,
    /// Absent in quiet mode.
    pub rendered: Option<String>,
    pub refreshed: bool,
    pub persisted: bool,
}

pub fn decide_refresh(
    options: &CheckOptions,
    cached: Option<&PersistedState>,
    min_age: Duration,
    now: DateTime<Utc>,
) -> Result<RefreshDecision> {
    if options.no_update {
        if options.no_cache {
            return Err(UrgencyError::Config(
                "--no-update and --no-cache options are mutually exclusive".to_string(),
            ));
        }
        return Ok(match cached {
            Some(_) => RefreshDecision::Reuse,
            None => RefreshDecision::Refresh,
        });
    }
    if options.no_cache {
        return Ok(RefreshDecision::Refresh);
    }
    Ok(match cached {
        Some(state) if state.is_fresh(min_age, now) => RefreshDecision::Reuse,
        _ => RefreshDecision::Refresh,
    })
}

pub fn cache_min_age(config: &UrgencyConfig) -> Duration {
    i64::try_from(config.cache_min_age_minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .unwrap_or(Duration::MAX)
}

pub fn run_check(
    config: &UrgencyConfig,
    options: &CheckOptions,
    source: &dyn UpdateSource,
    store: &StateStore,
    now: DateTime<Utc>,
) -> Result<CheckOutcome> {
    let cached = if options.no_cache { None } else { store.load() };
    let decision = decide_refresh(options, cached.as_ref(), cache_min_age(config), now)?;
    tracing::info!(decision = ?decision, cached = cached.is_some(), "refresh decision");

    let (updates, captured_at, last_upgrade) = match (decision, cached.as_ref()) {
        (RefreshDecision::Reuse, Some(state)) => (
            state.last_update_set.clone(),
            state.last_check_time,
            state.last_upgrade_time,
        ),
        _ => {
            let updates = source.list_updates()?;
            let last_upgrade = if updates.is_empty() {
                Some(now)
            } else {
                cached.as_ref().and_then(|state| state.last_upgrade_time)
            };
            (updates, now, last_upgrade)
        }
    };

    let registry = CriteriaRegistry::from_config(config, last_upgrade, now);
    let report = score(&updates, &registry, &config.thresholds, captured_at);

    let persisted = if options.no_cache {
        false
    } else {
        let state = PersistedState::new(report.clone(), captured_at, last_upgrade);
        match store.persist(&state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %store.path().display(), error = %e, "state was not saved");
                false
            }
        }
    };

    let rendered = if options.quiet {
        None
    } else {
        Some(report::render(
            &report,
            options.output_format,
            &config.custom_format,
        )?)
    };

    Ok(CheckOutcome {
        previous_level: cached.as_ref().and_then(PersistedState::last_level),
        report,
        rendered,
        refreshed: decision == RefreshDecision::Refresh,
        persisted,
    })
}
