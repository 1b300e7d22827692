//! Server configuration, loaded from environment variables.

use std::time::Duration;

/// Environment variable holding the listen address.
pub const BIND_VAR: &str = "ROOMCAST_BIND";
/// Environment variable holding the idle timeout in whole seconds.
pub const IDLE_TIMEOUT_VAR: &str = "ROOMCAST_IDLE_TIMEOUT_SECS";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("invalid value for {var}: {value:?}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// The value as found.
        value: String,
    },
}

/// Relay server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// How long a connection may stay silent before it is dropped.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(120),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `ROOMCAST_BIND` and
    /// `ROOMCAST_IDLE_TIMEOUT_SECS`. Unset variables keep their defaults.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(BIND_VAR) {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: BIND_VAR,
                    value,
                });
            }
            config.bind_addr = value;
        }

        if let Some(value) = lookup(IDLE_TIMEOUT_VAR) {
            let secs: u64 = match value.trim().parse() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: IDLE_TIMEOUT_VAR,
                        value,
                    });
                }
            };
            config.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_from_lookup_empty_env_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.idle_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_lookup_reads_both_vars() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (BIND_VAR, "0.0.0.0:9000"),
            (IDLE_TIMEOUT_VAR, " 30 "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_bad_timeout_returns_invalid() {
        for bad in ["soon", "-1", "0"] {
            let err = ServerConfig::from_lookup(lookup_from(&[(IDLE_TIMEOUT_VAR, bad)]))
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { var: IDLE_TIMEOUT_VAR, ref value } if value == bad
            ));
        }
    }

    #[test]
    fn test_from_lookup_blank_bind_returns_invalid() {
        let err = ServerConfig::from_lookup(lookup_from(&[(BIND_VAR, "  ")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for ROOMCAST_BIND: \"  \"");
    }
}
