use crate::error::{Result, UrgencyError};
use crate::types::report::{ScoreReport, UpdateSet, UrgencyLevel};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub schema_version: u32,
    pub last_update_set: UpdateSet,
    /// When `last_update_set` was captured from the lister.
    pub last_check_time: DateTime<Utc>,
    /// Most recent capture that found nothing to upgrade.
    pub last_upgrade_time: Option<DateTime<Utc>>,
    pub last_score_report: Option<ScoreReport>,
}

impl PersistedState {
    pub fn new(
        report: ScoreReport,
        last_check_time: DateTime<Utc>,
        last_upgrade_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_update_set: report.updates.clone(),
            last_check_time,
            last_upgrade_time,
            last_score_report: Some(report),
        }
    }

    pub fn is_fresh(&self, min_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_check_time) < min_age
    }

    pub fn last_level(&self) -> Option<UrgencyLevel> {
        self.last_score_report.as_ref().map(|report| report.level)
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable, corrupt or incompatible state all read as absent.
    pub fn load(&self) -> Option<PersistedState> {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring cached state");
                None
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<PersistedState>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(UrgencyError::Cache(e.to_string())),
        };

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| UrgencyError::Cache(e.to_string()))?;
        let version = value
            .get("schema_version")
            .and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(SCHEMA_VERSION)) {
            return Err(UrgencyError::Cache(format!(
                "unsupported schema version {}, expected {SCHEMA_VERSION}",
                version.map_or_else(|| "none".to_string(), |v| v.to_string())
            )));
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| UrgencyError::Cache(e.to_string()))
    }

    /// Write to a sibling temp file and rename it over the state file.
    pub fn persist(&self, state: &PersistedState) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| {
            UrgencyError::Persist(format!("failed to create {}: {e}", parent.display()))
        })?;

        let json = serde_json::to_string_pretty(state)?;
        let mut tmp =
            NamedTempFile::new_in(&parent).map_err(|e| UrgencyError::Persist(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| UrgencyError::Persist(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| UrgencyError::Persist(e.error.to_string()))?;

        tracing::debug!(path = %self.path.display(), "state persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::MatchedCriterion;
    use std::fs;
    use tempfile::TempDir;

    fn report(names: &[&str], checked_at: DateTime<Utc>) -> ScoreReport {
        ScoreReport {
            score: 1,
            level: UrgencyLevel::Available,
            matched: vec![MatchedCriterion {
                name: "available".to_string(),
                short: "av".to_string(),
                weight: 1,
            }],
            updates: UpdateSet::from_names(names.iter().copied()),
            checked_at,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = StateStore::new(dir.path().join("nested/state.json"));
        let now = Utc::now();
        let state = PersistedState::new(report(&["linux", "foo"], now), now, None);

        store.persist(&state).expect("persist should succeed");
        let loaded = store.load().expect("state should load");
        assert_eq!(loaded.last_update_set, state.last_update_set);
        assert_eq!(loaded.last_check_time, now);
        assert_eq!(loaded.last_level(), Some(UrgencyLevel::Available));
        assert_eq!(loaded, state);
    }

    #[test]
    fn persist_overwrites_previous_state() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = StateStore::new(dir.path().join("state.json"));
        let now = Utc::now();
        store
            .persist(&PersistedState::new(report(&["a"], now), now, None))
            .expect("first persist");
        store
            .persist(&PersistedState::new(report(&["b", "c"], now), now, Some(now)))
            .expect("second persist");

        let loaded = store.load().expect("state should load");
        assert_eq!(loaded.last_update_set.names(), ["b", "c"]);
        assert_eq!(loaded.last_upgrade_time, Some(now));
        let leftovers = fs::read_dir(dir.path())
            .expect("dir should list")
            .filter_map(|entry| entry.ok())
            .count();
        assert_eq!(leftovers, 1, "temp files must not be left behind");
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(store.try_load().expect("missing is not an error").is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_is_absent() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("state.json");
        fs::write(&path, "{\"schema_version\": 1, \"last_upd").expect("corrupt file should write");
        let store = StateStore::new(&path);
        assert!(matches!(store.try_load(), Err(UrgencyError::Cache(_))));
        assert!(store.load().is_none());
    }

    #[test]
    fn incompatible_schema_is_absent() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"available_updates": ["a"], "state": {"py-type": "State", "value": "OK"}}"#,
        )
        .expect("legacy file should write");
        let store = StateStore::new(&path);
        let err = store.try_load().expect_err("legacy schema should be rejected");
        assert!(err.to_string().contains("unsupported schema version none"));
        assert!(store.load().is_none());

        fs::write(&path, r#"{"schema_version": 99}"#).expect("future file should write");
        assert!(store.load().is_none());
    }

    #[test]
    fn freshness_tracks_min_age() {
        let checked = Utc::now();
        let state = PersistedState::new(report(&["a"], checked), checked, None);

        let min_age = Duration::minutes(30);
        assert!(state.is_fresh(min_age, checked));
        assert!(state.is_fresh(min_age, checked + Duration::minutes(29)));
        assert!(!state.is_fresh(min_age, checked + Duration::minutes(31)));
    }

    #[test]
    fn state_is_stale_exactly_at_min_age() {
        let checked = Utc::now();
        let state = PersistedState::new(report(&["a"], checked), checked, None);
        let min_age = Duration::minutes(30);
        assert!(state.is_fresh(min_age, checked + min_age - Duration::seconds(1)));
        assert!(!state.is_fresh(min_age, checked + min_age));
    }
}
