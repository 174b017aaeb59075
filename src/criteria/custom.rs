use crate::criteria::Criterion;
use crate::error::{Result, UrgencyError};
use crate::types::config::{CriterionSettings, UrgencyConfig};
use crate::types::report::UpdateSet;
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

/// A criterion backed by an executable in the criteria directory.
///
/// The executable reads `{"criterion", "settings", "available_updates"}` as JSON
/// on stdin and answers through its exit status: `0` fulfilled, `1` not
/// fulfilled, anything else is an evaluation failure.
#[derive(Debug, Clone)]
pub struct ExternalCriterion {
    name: String,
    path: PathBuf,
}

impl ExternalCriterion {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Criterion for ExternalCriterion {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_fulfilled(&self, settings: &CriterionSettings, updates: &UpdateSet) -> Result<bool> {
        let payload = json!({
            "criterion": self.name,
            "settings": settings.to_json(),
            "available_updates": updates.names(),
        });

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                UrgencyError::criterion(
                    &self.name,
                    format!("failed to run {}: {e}", self.path.display()),
                )
            })?;

        // Feed stdin from a scoped thread while wait_with_output drains stderr.
        let stdin = child.stdin.take();
        let body = payload.to_string();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(body.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.map_err(|e| UrgencyError::criterion(&self.name, e.to_string()))?;
        match written {
            Ok(Ok(())) => {}
            // The plugin may exit without reading its input.
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(UrgencyError::criterion(&self.name, e.to_string())),
            Err(_) => {
                return Err(UrgencyError::criterion(
                    &self.name,
                    "failed to write input: writer thread panicked",
                ))
            }
        }
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            status => Err(UrgencyError::criterion(
                &self.name,
                format!(
                    "exited with status {}: {}",
                    status.map_or_else(|| "signal".to_string(), |code| code.to_string()),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
        }
    }
}

/// Executables in `dir` whose stem names a criterion enabled in the config, in file name order.
pub fn discover(dir: &Path, config: &UrgencyConfig) -> Vec<ExternalCriterion> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "unable to list custom criteria");
            return Vec::new();
        }
    };
    entries.sort();

    let mut found = Vec::new();
    for path in entries {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping custom criterion with non UTF-8 name");
            continue;
        };
        if config.weight(name) == 0 {
            tracing::debug!(criterion = name, "custom criterion not enabled");
            continue;
        }
        if !is_executable(&path) {
            tracing::warn!(
                criterion = name,
                path = %path.display(),
                "custom criterion is not executable, skipping"
            );
            continue;
        }
        found.push(ExternalCriterion::new(name, path.clone()));
    }
    found
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
