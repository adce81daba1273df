use std::fmt;
use std::str::FromStr;

/// Configuration errors detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Per-source shared secrets, loaded once at startup.
#[derive(Clone)]
pub struct WebhookSecrets {
    /// Value Telegram sends in `X-Telegram-Bot-Api-Secret-Token`.
    pub telegram: String,
    /// Zoom app secret token used for HMAC signatures and challenges.
    pub zoom: String,
}

impl fmt::Debug for WebhookSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecrets")
            .field("telegram", &"<redacted>")
            .field("zoom", &"<redacted>")
            .finish()
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8001`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Event bus URL; `memory://` selects the in-process bus.
    pub nats_url: String,
    /// Bus connect timeout in seconds (default: `5`).
    pub nats_connect_timeout_secs: u64,
    /// Seconds to wait after a failed bus connect before trying again (default: `5`).
    pub nats_retry_backoff_secs: u64,
    /// Bound on a single bus publish in seconds (default: `2`).
    pub nats_publish_timeout_secs: u64,
    pub secrets: WebhookSecrets,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `127.0.0.1`             |
    /// | `PORT`                      | `8001`                  |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                    |
    /// | `NATS_URL`                  | `nats://127.0.0.1:4222` |
    /// | `NATS_CONNECT_TIMEOUT_SECS` | `5`                     |
    /// | `NATS_RETRY_BACKOFF_SECS`   | `5`                     |
    /// | `NATS_PUBLISH_TIMEOUT_SECS` | `2`                     |
    /// | `TELEGRAM_SECRET`           | required                |
    /// | `ZOOM_SECRET_TOKEN`         | required                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = parse_or(&lookup, "PORT", 8001)?;
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs = parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?;
        let nats_url = lookup("NATS_URL").unwrap_or_else(|| "nats://127.0.0.1:4222".into());
        let nats_connect_timeout_secs = parse_or(&lookup, "NATS_CONNECT_TIMEOUT_SECS", 5)?;
        let nats_retry_backoff_secs = parse_or(&lookup, "NATS_RETRY_BACKOFF_SECS", 5)?;
        let nats_publish_timeout_secs = parse_or(&lookup, "NATS_PUBLISH_TIMEOUT_SECS", 2)?;

        let secrets = WebhookSecrets {
            telegram: required(&lookup, "TELEGRAM_SECRET")?,
            zoom: required(&lookup, "ZOOM_SECRET_TOKEN")?,
        };

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            shutdown_timeout_secs,
            nats_url,
            nats_connect_timeout_secs,
            nats_retry_backoff_secs,
            nats_publish_timeout_secs,
            secrets,
        })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var).ok_or(ConfigError::Missing(var))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(var));
    }
    Ok(value)
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    const SECRETS: [(&str, &str); 2] = [("TELEGRAM_SECRET", "tg"), ("ZOOM_SECRET_TOKEN", "zm")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = load(&SECRETS).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8001);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.nats_url, "nats://127.0.0.1:4222");
        assert_eq!(config.nats_connect_timeout_secs, 5);
        assert_eq!(config.nats_retry_backoff_secs, 5);
        assert_eq!(config.nats_publish_timeout_secs, 2);
        assert_eq!(config.secrets.telegram, "tg");
        assert_eq!(config.secrets.zoom, "zm");
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = SECRETS.to_vec();
        vars.extend([("PORT", "9000"), ("NATS_URL", "memory://"), ("HOST", "0.0.0.0")]);
        let config = load(&vars).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.nats_url, "memory://");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert_matches!(
            load(&[("TELEGRAM_SECRET", "tg")]),
            Err(ConfigError::Missing("ZOOM_SECRET_TOKEN"))
        );
    }

    #[test]
    fn blank_secret_is_an_error() {
        assert_matches!(
            load(&[("TELEGRAM_SECRET", "  "), ("ZOOM_SECRET_TOKEN", "zm")]),
            Err(ConfigError::Empty("TELEGRAM_SECRET"))
        );
    }

    #[test]
    fn invalid_number_is_an_error() {
        let mut vars = SECRETS.to_vec();
        vars.push(("PORT", "eighty"));
        assert_matches!(load(&vars), Err(ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[("TELEGRAM_SECRET", "tg-very-secret"), ("ZOOM_SECRET_TOKEN", "zm-very-secret")])
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
    }
}
