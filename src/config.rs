use log::warn;
use std::env;
use std::time::Duration;

pub const API_KEY_VAR: &str = "MAPBOX_API_KEY";
const DEFAULT_API_BASE: &str = "https://api.mapbox.com";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the credential pool comes from.
///
/// The pool is resolved again on every request, so a changed environment is
/// picked up without a restart.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Env(String),
    Fixed(String),
}

impl CredentialSource {
    /// Raw comma-separated value; an unset variable reads as empty.
    pub fn read(&self) -> String {
        match self {
            CredentialSource::Env(var) => env::var(var).unwrap_or_default(),
            CredentialSource::Fixed(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub allowed_referers: Vec<String>,
    pub api_base: String,
    pub upstream_timeout: Duration,
    pub credentials: CredentialSource,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let timeout_secs = parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);

        let allowed_referers = split_list(&lookup("ALLOWED_REFERERS").unwrap_or_default());
        if allowed_referers.is_empty() {
            warn!("ALLOWED_REFERERS is empty, every request will be rejected with 403");
        }

        let api_base = lookup("MAPBOX_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            bind_addr,
            port,
            allowed_referers,
            api_base,
            upstream_timeout: Duration::from_secs(timeout_secs),
            credentials: CredentialSource::Env(API_KEY_VAR.to_string()),
        }
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", var, raw, default);
            default
        }),
        None => default,
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base, "https://api.mapbox.com");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert!(config.allowed_referers.is_empty());
        assert!(matches!(config.credentials, CredentialSource::Env(ref var) if var == "MAPBOX_API_KEY"));
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", " 9090 "),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("ALLOWED_REFERERS", "example.com, maps.test"),
            ("MAPBOX_API_BASE", " http://localhost:9000/ "),
        ]);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.allowed_referers, vec!["example.com", "maps.test"]);
        assert_eq!(config.api_base, "http://localhost:9000");
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "eighty"), ("UPSTREAM_TIMEOUT_SECS", "-1")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));

        let config = config_from(&[("PORT", "70000")]);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn blank_api_base_and_referers_use_defaults() {
        let config = config_from(&[("MAPBOX_API_BASE", "  "), ("ALLOWED_REFERERS", " , ")]);
        assert_eq!(config.api_base, "https://api.mapbox.com");
        assert!(config.allowed_referers.is_empty());
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" a.com, ,b.org,"), vec!["a.com", "b.org"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn fixed_source_is_returned_verbatim() {
        let source = CredentialSource::Fixed("k1,k2".into());
        assert_eq!(source.read(), "k1,k2");
    }

    #[test]
    fn unset_env_source_reads_empty() {
        let source = CredentialSource::Env("STATIC_MAP_PROXY_TEST_SURELY_UNSET".into());
        assert_eq!(source.read(), "");
    }
}
