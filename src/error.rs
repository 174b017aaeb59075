use thiserror::Error;

#[derive(Error, Debug)]
pub enum UrgencyError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("failed to query available updates: {0}")]
    Refresh(String),

    #[error("command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to check criterion [{name}]: {message}")]
    Criterion { name: String, message: String },

    #[error("state file unusable: {0}")]
    Cache(String),

    #[error("failed to write state to disk: {0}")]
    Persist(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UrgencyError {
    pub fn criterion(name: &str, message: impl Into<String>) -> Self {
        Self::Criterion {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Recovered kinds are logged and the run continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Criterion { .. } | Self::Cache(_) | Self::Persist(_) | Self::Notification(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UrgencyError>;
