//! Runtime configuration, read from the environment (and `.env` when present).

use chrono::FixedOffset;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where certificates, interns and registrations live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    /// Remote internship-management API.
    Http { base_url: String },
    /// Process-local store; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub backend: BackendMode,
    pub backend_timeout: Duration,
    pub typst_bin: String,
    pub certificate_cache_ttl: Duration,
    pub allowed_origins: Vec<String>,
    /// Company name printed on every letter.
    pub issuer_name: String,
    /// Offset for "today" and for backend timestamps, e.g. `+05:30`.
    pub utc_offset: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            backend: BackendMode::Memory,
            backend_timeout: Duration::from_secs(30),
            typst_bin: "typst".to_string(),
            certificate_cache_ttl: Duration::from_secs(10 * 60),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            issuer_name: "RamanaSoft".to_string(),
            utc_offset: crate::certificate::model::dates::default_offset(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("BACKEND_MODE").as_deref().map(str::trim) {
            None | Some("http") => BackendMode::Http {
                base_url: get("BACKEND_API_URL").ok_or(ConfigError::Missing("BACKEND_API_URL"))?,
            },
            Some("memory") => BackendMode::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "BACKEND_MODE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            backend,
            backend_timeout: parse_or(get("BACKEND_TIMEOUT_SECS"), "BACKEND_TIMEOUT_SECS", 30)
                .map(Duration::from_secs)?,
            typst_bin: get("TYPST_BIN").unwrap_or(defaults.typst_bin),
            certificate_cache_ttl: parse_or(
                get("CERTIFICATE_CACHE_TTL_SECS"),
                "CERTIFICATE_CACHE_TTL_SECS",
                defaults.certificate_cache_ttl.as_secs(),
            )
            .map(Duration::from_secs)?,
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            issuer_name: get("LETTER_ISSUER").unwrap_or(defaults.issuer_name),
            utc_offset: parse_or(get("LETTER_UTC_OFFSET"), "LETTER_UTC_OFFSET", defaults.utc_offset)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_http_mode_requires_url() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing("BACKEND_API_URL"))
        ));
    }

    #[test]
    fn test_http_mode_defaults() {
        let cfg = config(&[("BACKEND_API_URL", "http://backend:5000")]).unwrap();
        assert_eq!(
            cfg.backend,
            BackendMode::Http {
                base_url: "http://backend:5000".to_string()
            }
        );
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.backend_timeout, Duration::from_secs(30));
        assert_eq!(cfg.typst_bin, "typst");
    }

    #[test]
    fn test_memory_mode_with_overrides() {
        let cfg = config(&[
            ("BACKEND_MODE", "memory"),
            ("PORT", "9090"),
            ("CERTIFICATE_CACHE_TTL_SECS", "5"),
            ("ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, BackendMode::Memory);
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.certificate_cache_ttl, Duration::from_secs(5));
        assert_eq!(cfg.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cfg.utc_offset, FixedOffset::east_opt(19800).unwrap());
    }

    #[test]
    fn test_utc_offset_override() {
        let cfg = config(&[("BACKEND_MODE", "memory"), ("LETTER_UTC_OFFSET", "+00:00")]).unwrap();
        assert_eq!(cfg.utc_offset, FixedOffset::east_opt(0).unwrap());

        assert!(matches!(
            config(&[("BACKEND_MODE", "memory"), ("LETTER_UTC_OFFSET", "IST")]),
            Err(ConfigError::Invalid { name: "LETTER_UTC_OFFSET", .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("BACKEND_MODE", "carrier-pigeon")]),
            Err(ConfigError::Invalid { name: "BACKEND_MODE", .. })
        ));
        assert!(matches!(
            config(&[("BACKEND_MODE", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }
}
