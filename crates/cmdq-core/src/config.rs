//! Engine configuration.
//!
//! Plain data passed explicitly to the queues. Loadable from JSON and
//! overridable from the environment:
//!
//! | variable | field |
//! |---|---|
//! | `CMDQ_RETRY_ATTEMPTS` | `default_retry_attempts` |
//! | `CMDQ_WORKER_THREAD_NAME` | `worker_thread_name` |
//! | `CMDQ_LOG` | `log_filter` |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CmdqError;

pub const ENV_RETRY_ATTEMPTS: &str = "CMDQ_RETRY_ATTEMPTS";
pub const ENV_WORKER_THREAD_NAME: &str = "CMDQ_WORKER_THREAD_NAME";
pub const ENV_LOG: &str = "CMDQ_LOG";

/// Engine settings shared by `CommandQueue` and `ConcurrentTaskQueue`.
///
/// Missing JSON fields fall back to [`EngineConfig::default`].
///
/// # Precedence
/// defaults < JSON file < `CMDQ_*` environment. `RUST_LOG` still wins over
/// `log_filter` inside `init_tracing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attempt bound given to a `RetryWrapper` created for a plain operation
    /// that failed transiently. Must be at least 1.
    pub default_retry_attempts: u32,

    /// Name of the `ConcurrentTaskQueue` worker thread.
    pub worker_thread_name: String,

    /// Filter directive handed to `observability::init_tracing`.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_retry_attempts: 1,
            worker_thread_name: "cmdq-worker".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, CmdqError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file, then `from_json_str`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CmdqError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Apply `CMDQ_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Result<Self, CmdqError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CmdqError> {
        if let Some(raw) = lookup(ENV_RETRY_ATTEMPTS) {
            self.default_retry_attempts = raw.trim().parse().map_err(|_| {
                CmdqError::InvalidConfig(format!("{ENV_RETRY_ATTEMPTS}={raw} is not a number"))
            })?;
        }
        if let Some(name) = lookup(ENV_WORKER_THREAD_NAME) {
            self.worker_thread_name = name;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CmdqError> {
        if self.default_retry_attempts == 0 {
            return Err(CmdqError::InvalidConfig(
                "default_retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.worker_thread_name.trim().is_empty() {
            return Err(CmdqError::InvalidConfig(
                "worker_thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.default_retry_attempts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json_str(r#"{"default_retry_attempts": 3}"#).unwrap();
        assert_eq!(config.default_retry_attempts, 3);
        assert_eq!(config.worker_thread_name, "cmdq-worker");
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = EngineConfig::from_json_str(r#"{"default_retry_attempts": 0}"#).unwrap_err();
        assert!(matches!(err, CmdqError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CmdqError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CmdqError::ConfigIo(_)));
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_RETRY_ATTEMPTS, "4"),
            (ENV_WORKER_THREAD_NAME, "ship-worker"),
        ]);
        let config = EngineConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_retry_attempts, 4);
        assert_eq!(config.worker_thread_name, "ship-worker");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn non_numeric_override_rejected() {
        let err = EngineConfig::default()
            .with_overrides(|k| (k == ENV_RETRY_ATTEMPTS).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, CmdqError::InvalidConfig(_)));
    }
}
