use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// The user every request acts as until real authentication exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUserConfig {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout: Duration,
    pub acting_user: ActingUserConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 20u32)?;
        let db_min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", 1u32)?;
        if db_min_connections > db_max_connections {
            return Err(ConfigError::Invalid {
                key: "DB_MIN_CONNECTIONS",
                value: db_min_connections.to_string(),
            });
        }
        let db_acquire_timeout =
            Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3u64)?);

        let acting_user_id = parse_or(&lookup, "ACTING_USER_ID", 1i64)?;
        if acting_user_id <= 0 {
            return Err(ConfigError::Invalid {
                key: "ACTING_USER_ID",
                value: acting_user_id.to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            cors_allowed_origins,
            db_max_connections,
            db_min_connections,
            db_acquire_timeout,
            acting_user: ActingUserConfig {
                id: acting_user_id,
                email: lookup("ACTING_USER_EMAIL")
                    .unwrap_or_else(|| "test@example.com".to_string()),
                name: lookup("ACTING_USER_NAME").unwrap_or_else(|| "Test User".to_string()),
            },
        })
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_set() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/budget")]))
                .expect("Should parse");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.acting_user.id, 1);
        assert_eq!(config.acting_user.email, "test@example.com");
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/budget"),
            ("PORT", "eighty"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_acting_user_id_must_be_positive() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/budget"),
            ("ACTING_USER_ID", "0"),
        ]));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "ACTING_USER_ID",
                ..
            })
        ));
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/budget"),
            (
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:3000, https://budget.example.com ,",
            ),
        ]))
        .expect("Should parse");

        assert!(config.is_origin_allowed("https://budget.example.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
        assert!(!config.is_origin_allowed("https://evil.example.com"));
    }

    #[test]
    fn test_min_connections_cannot_exceed_max() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/budget"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("DB_MIN_CONNECTIONS", "5"),
        ]));

        assert!(result.is_err());
    }
}
