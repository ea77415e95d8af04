//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use brawl_orchestrator::MatchConfig;

use crate::error::AppError;

/// Everything the binary needs to wire the process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Oracle endpoint receiving judge and summarize requests.
    pub oracle_url: String,
    /// Per-request oracle timeout.
    pub oracle_timeout: Duration,
    /// Text-to-speech base URL; speech is off when unset.
    pub tts_url: Option<String>,
    /// Display base URL; the relay is off when unset.
    pub display_url: Option<String>,
    /// Chat identity allowed to start matches.
    pub admin: String,
    /// Starting health for both fighters.
    pub max_health: u32,
    /// Per-submission character cap.
    pub message_max_length: usize,
    /// Idle window before a consumer is pinged.
    pub keepalive: Duration,
    /// Loop timings.
    pub match_config: MatchConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing, a
    /// value does not parse, or a timing that drives a loop is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            optional(key)
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };

        let defaults = MatchConfig::default();
        let match_config = MatchConfig {
            round_duration: nonzero(
                secs(&optional, "ROUND_SECS", defaults.round_duration)?,
                "ROUND_SECS",
            )?,
            summary_interval: nonzero(
                secs(&optional, "SUMMARY_INTERVAL_SECS", defaults.summary_interval)?,
                "SUMMARY_INTERVAL_SECS",
            )?,
            summary_gap: secs(&optional, "SUMMARY_GAP_SECS", defaults.summary_gap)?,
            cooldown: secs(&optional, "COOLDOWN_SECS", defaults.cooldown)?,
            ..defaults
        };

        let max_health = parse(&optional, "MAX_HEALTH", 3_u32)?;
        if max_health == 0 {
            return Err(AppError::Config("MAX_HEALTH must be at least 1".to_owned()));
        }

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse(&optional, "PORT", 8000)?,
            oracle_url: required("ORACLE_URL")?,
            oracle_timeout: secs(&optional, "ORACLE_TIMEOUT_SECS", Duration::from_secs(60))?,
            tts_url: optional("TTS_URL"),
            display_url: optional("DISPLAY_URL"),
            admin: required("MATCH_ADMIN")?,
            max_health,
            message_max_length: parse(&optional, "MESSAGE_MAX_LENGTH", 200)?,
            keepalive: nonzero(
                Duration::from_millis(parse(&optional, "KEEPALIVE_MS", 1_000)?),
                "KEEPALIVE_MS",
            )?,
            match_config,
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a valid address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse<T>(
    optional: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
        None => Ok(default),
    }
}

fn secs(
    optional: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration, AppError> {
    parse(optional, key, default.as_secs()).map(Duration::from_secs)
}

fn nonzero(value: Duration, key: &str) -> Result<Duration, AppError> {
    if value.is_zero() {
        return Err(AppError::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("ORACLE_URL", "http://oracle.local/generate"),
        ("MATCH_ADMIN", "globalworming"),
    ];

    #[test]
    fn test_defaults_apply_when_only_required_vars_set() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.oracle_timeout, Duration::from_secs(60));
        assert_eq!(config.tts_url, None);
        assert_eq!(config.display_url, None);
        assert_eq!(config.max_health, 3);
        assert_eq!(config.message_max_length, 200);
        assert_eq!(config.keepalive, Duration::from_secs(1));
        assert_eq!(config.match_config, MatchConfig::default());
    }

    #[test]
    fn test_overrides_are_read() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "9000"),
            ("ROUND_SECS", "30"),
            ("COOLDOWN_SECS", "5"),
            ("TTS_URL", "http://tts.local"),
            ("MAX_HEALTH", "5"),
        ]);

        let config = config(&vars).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.match_config.round_duration, Duration::from_secs(30));
        assert_eq!(config.match_config.cooldown, Duration::from_secs(5));
        assert_eq!(config.tts_url.as_deref(), Some("http://tts.local"));
        assert_eq!(config.max_health, 5);
    }

    #[test]
    fn test_missing_oracle_url_is_config_error() {
        let err = config(&[("MATCH_ADMIN", "globalworming")]).unwrap_err();

        assert!(matches!(err, AppError::Config(message) if message.contains("ORACLE_URL")));
    }

    #[test]
    fn test_malformed_port_is_config_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));

        assert!(matches!(config(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_max_health_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MAX_HEALTH", "0"));

        assert!(matches!(config(&vars), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_timings_are_rejected() {
        for key in ["KEEPALIVE_MS", "ROUND_SECS", "SUMMARY_INTERVAL_SECS"] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, "0"));

            let err = config(&vars).unwrap_err();

            assert!(
                matches!(&err, AppError::Config(message) if message.contains(key)),
                "{key} accepted zero: {err:?}"
            );
        }
    }

    #[test]
    fn test_bind_addr_combines_host_and_port() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }
}
