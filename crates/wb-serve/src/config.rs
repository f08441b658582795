use serde::Deserialize;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const ENV_PREFIX: &str = "WODBOARD_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Server settings. Defaults, then the TOML file, then `WODBOARD_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub db_path: String,
    pub bind: IpAddr,
    pub port: u16,
    /// How long a write waits on a locked database before `STORAGE_TIMEOUT`.
    pub busy_timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub event_capacity: usize,
    pub log_json: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            db_path: ".wodboard/wodboard.db".to_string(),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4830,
            busy_timeout_ms: 250,
            health_timeout_ms: 200,
            event_capacity: 1024,
            log_json: false,
        }
    }
}

impl ServeConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`ServeConfig::load`] with an explicit variable lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(&format!("{ENV_PREFIX}DB_PATH")) {
            self.db_path = value;
        }
        override_from(&lookup, "BIND", &mut self.bind)?;
        override_from(&lookup, "PORT", &mut self.port)?;
        override_from(&lookup, "BUSY_TIMEOUT_MS", &mut self.busy_timeout_ms)?;
        override_from(&lookup, "HEALTH_TIMEOUT_MS", &mut self.health_timeout_ms)?;
        override_from(&lookup, "EVENT_CAPACITY", &mut self.event_capacity)?;
        override_from(&lookup, "LOG_JSON", &mut self.log_json)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(invalid("db_path", "must not be empty"));
        }
        if self.event_capacity == 0 {
            return Err(invalid("event_capacity", "must be at least 1"));
        }
        if self.health_timeout_ms == 0 {
            return Err(invalid("health_timeout_ms", "must be at least 1"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

fn override_from<F, T>(lookup: &F, suffix: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let key = format!("{ENV_PREFIX}{suffix}");
    let Some(raw) = lookup(&key) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        message: format!("{raw:?}: {err}"),
    })?;
    Ok(())
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = ServeConfig::load_with(None, env(&[])).unwrap();
        assert_eq!(config, ServeConfig::default());
        assert_eq!(config.addr().to_string(), "127.0.0.1:4830");
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wodboard.toml");
        std::fs::write(&path, "port = 5000\nlog_json = true\n").unwrap();
        let config = ServeConfig::load_with(
            Some(&path),
            env(&[("WODBOARD_PORT", "5001"), ("WODBOARD_DB_PATH", "/tmp/wb.db")]),
        )
        .unwrap();
        assert_eq!(config.port, 5001);
        assert!(config.log_json);
        assert_eq!(config.db_path, "/tmp/wb.db");
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn bad_values_are_errors() {
        let err = ServeConfig::load_with(None, env(&[("WODBOARD_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "WODBOARD_PORT"));
        assert!(ServeConfig::from_toml("colour = 1").is_err());
        let err = ServeConfig::load_with(None, env(&[("WODBOARD_EVENT_CAPACITY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
