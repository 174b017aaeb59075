use crate::error::{Result, UrgencyError};
use crate::types::config::{default_criteria, UrgencyConfig, APP_DIR};
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(DEFAULT_CONFIG_FILE))
}

/// Load the config, failing if an explicitly requested file does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<UrgencyConfig> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(UrgencyError::ConfigNotFound(path.display().to_string()));
            }
            load_config_from(Some(path))
        }
        None => load_config_from(default_config_path().as_deref()),
    }
}

pub(crate) fn load_config_from(path: Option<&Path>) -> Result<UrgencyConfig> {
    let mut criteria = Map::new();
    criteria.insert("criteria".to_string(), Value::Table(default_criteria()));
    let mut merged = Value::Table(criteria);

    if let Some(path) = path {
        merge_file_if_exists(&mut merged, path)?;
    }

    let cfg: UrgencyConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| UrgencyError::Config(e.to_string()))?;
    cfg.validate()?;
    tracing::debug!(path = ?path, "configuration loaded");
    Ok(cfg)
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        UrgencyError::Config(format!("failed to open {} for reading: {e}", path.display()))
    })?;
    toml::from_str(&content)
        .map_err(|e| UrgencyError::Config(format!("{} is not valid: {e}", path.display())))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
