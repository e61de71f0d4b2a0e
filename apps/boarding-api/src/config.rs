use boarding_core::domain::room::DEFAULT_ROOM_LABELS;
use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub room_labels: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let room_labels = match get("ROOM_LABELS") {
            Some(raw) => raw.split(',').map(|l| l.trim().to_string()).collect(),
            None => DEFAULT_ROOM_LABELS.iter().map(|l| l.to_string()).collect(),
        };

        let session_ttl_seconds = parse_or(
            "SESSION_TTL_SECONDS",
            get("SESSION_TTL_SECONDS"),
            Ok(DEFAULT_SESSION_TTL_SECONDS),
        )?;
        // A zero TTL would expire every session the moment it is stored
        if session_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_SECONDS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse())?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                Ok(DEFAULT_DATABASE_MAX_CONNECTIONS),
            )?,
            redis_url: get("REDIS_URL"),
            session_ttl_seconds,
            room_labels,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn parse_or<T>(
    name: &'static str,
    raw: Option<String>,
    default: Result<T, T::Err>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let (value, parsed) = match raw {
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            (raw, parsed)
        }
        None => (String::new(), default),
    };
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        value,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.session_ttl_seconds, 604_800);
        assert_eq!(config.room_labels.len(), 5);
        assert_eq!(config.room_labels[0], "Room 01");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/boarding"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("REDIS_URL", " "),
            ("SESSION_TTL_SECONDS", "60"),
            ("ROOM_LABELS", "A1, A2 ,B1"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/boarding"));
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.session_ttl_seconds, 60);
        assert_eq!(config.room_labels, vec!["A1", "A2", "B1"]);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = config_from(&[("SESSION_TTL_SECONDS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SESSION_TTL_SECONDS", .. }));

        let err = config_from(&[("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn rejects_zero_session_ttl() {
        let err = config_from(&[("SESSION_TTL_SECONDS", "0")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "SESSION_TTL_SECONDS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            }
        );

        let config = config_from(&[("SESSION_TTL_SECONDS", "1")]).unwrap();
        assert_eq!(config.session_ttl_seconds, 1);
    }
}
