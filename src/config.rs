//! Configuration module for the TuklasVerse embed proxy
//!
//! Handles loading environment variables and application configuration.

use std::env;

use tracing::warn;

use crate::constants::defaults;
use crate::error::{AppError, AppResult};
use crate::proxy::AllowList;
use crate::sanitizer::SanitizeMode;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Settings for the sanitizing proxy
    pub proxy: ProxyConfig,
    /// Base URL of the embed player used by the embed builder
    pub embed_base_url: String,
}

/// Settings for the embed sanitizing proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// URL prefixes the proxy is allowed to fetch
    pub allow_list: AllowList,
    /// User-Agent sent to the upstream
    pub user_agent: String,
    /// Which sanitizer pipeline to run on upstream HTML
    pub sanitize_mode: SanitizeMode,
    /// Optional timeout for the outbound fetch in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_list: AllowList::default(),
            user_agent: defaults::USER_AGENT.to_string(),
            sanitize_mode: SanitizeMode::default(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Fails if `PORT` is not a valid number or if `PROXY_ALLOWED_PREFIXES`
    /// contains an entry that is not an absolute http(s) URL.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let allow_list = match env::var("PROXY_ALLOWED_PREFIXES") {
            Ok(raw) if !raw.trim().is_empty() => AllowList::parse(&raw)?,
            _ => AllowList::default(),
        };

        let sanitize_mode = match env::var("PROXY_SANITIZE_MODE") {
            Ok(raw) => raw.parse::<SanitizeMode>().unwrap_or_else(|e| {
                warn!("{}, falling back to compat", e);
                SanitizeMode::Compat
            }),
            Err(_) => SanitizeMode::default(),
        };

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| AppError::internal(format!("PORT must be a valid number: {}", e)))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            proxy: ProxyConfig {
                allow_list,
                user_agent: env::var("PROXY_USER_AGENT")
                    .unwrap_or_else(|_| defaults::USER_AGENT.to_string()),
                sanitize_mode,
                timeout_secs: parse_timeout(env::var("PROXY_TIMEOUT_SECS").ok().as_deref()),
            },
            embed_base_url: env::var("EMBED_BASE_URL")
                .unwrap_or_else(|_| defaults::EMBED_BASE_URL.to_string()),
        })
    }
}

/// Positive whole seconds; anything else is logged and leaves the client without a timeout
fn parse_timeout(raw: Option<&str>) -> Option<u64> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            warn!("Ignoring invalid PROXY_TIMEOUT_SECS '{}', no timeout set", raw);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            proxy: ProxyConfig::default(),
            embed_base_url: defaults::EMBED_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_proxy_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.user_agent, defaults::USER_AGENT);
        assert_eq!(config.sanitize_mode, SanitizeMode::Compat);
        assert!(config.timeout_secs.is_none());
        assert!(config.allow_list.matches("https://vidsrc.to/embed/movie/1"));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(None), None);
        assert_eq!(parse_timeout(Some("")), None);
        assert_eq!(parse_timeout(Some(" 15 ")), Some(15));
        assert_eq!(parse_timeout(Some("0")), None);
        assert_eq!(parse_timeout(Some("10s")), None);
        assert_eq!(parse_timeout(Some("-3")), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.embed_base_url, "https://vidsrc.xyz/embed/");
    }
}
