use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::fetcher::{Pacing, DEFAULT_MAX_ATTEMPTS};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0 Safari/537.36";

/// Championship name fragments excluded from the export
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "ultras",
    "destiny",
    "mad",
    "dota 2",
    "ancients",
    "oq",
    "1xbet",
    "appl",
    "impacto",
    "evella",
    "xmas",
    "tdl",
    "radiant",
    "fastinvitational",
    "iesf",
    "dos",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// hawk.live base URL
    pub base_url: String,

    /// Pacing applied before each day listing request
    pub page_pacing: Pacing,

    /// Pacing applied before each match detail request
    pub match_pacing: Pacing,

    /// Total attempts per request, first try included
    pub max_attempts: u32,

    /// Per-request timeout
    pub request_timeout: Duration,

    pub user_agent: String,

    /// Extra PEM root certificate added to the trust store
    pub ca_bundle: Option<PathBuf>,

    /// Lowercased championship exclusion keywords
    pub exclude_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://hawk.live".to_string(),
            page_pacing: Pacing::from_secs(0.4, 0.2),
            match_pacing: Pacing::from_secs(0.3, 0.15),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout: Duration::from_secs(25),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ca_bundle: None,
            exclude_keywords: DEFAULT_EXCLUDE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            base_url: env::var("HAWK_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),

            page_pacing: Pacing {
                base_delay: secs_var("HAWK_PAGE_DELAY", defaults.page_pacing.base_delay)?,
                jitter: secs_var("HAWK_PAGE_JITTER", defaults.page_pacing.jitter)?,
            },

            match_pacing: Pacing {
                base_delay: secs_var("HAWK_MATCH_DELAY", defaults.match_pacing.base_delay)?,
                jitter: secs_var("HAWK_MATCH_JITTER", defaults.match_pacing.jitter)?,
            },

            max_attempts: env::var("HAWK_MAX_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
                .parse()
                .context("HAWK_MAX_ATTEMPTS must be a valid number")?,

            request_timeout: Duration::from_secs(
                env::var("HAWK_REQUEST_TIMEOUT")
                    .unwrap_or_else(|_| "25".to_string())
                    .parse()
                    .context("HAWK_REQUEST_TIMEOUT must be a valid number")?,
            ),

            user_agent: env::var("HAWK_USER_AGENT").unwrap_or(defaults.user_agent),

            ca_bundle: env::var("HAWK_CA_BUNDLE").ok().map(PathBuf::from),

            exclude_keywords: env::var("HAWK_EXCLUDE_KEYWORDS")
                .map(|raw| parse_keywords(&raw))
                .unwrap_or(defaults.exclude_keywords),
        })
    }
}

fn secs_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => parse_secs(name, &raw),
        Err(_) => Ok(default),
    }
}

/// Non-negative, representable number of seconds
fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number of seconds", name))?;

    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", name, raw.trim()))
}

/// Split a comma-separated keyword list, dropping blanks
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            parse_keywords(" Ultras, ,DOTA 2,xmas "),
            vec!["ultras", "dota 2", "xmas"]
        );
        assert!(parse_keywords(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(25));
        assert!(config.exclude_keywords.iter().any(|k| k == "ancients"));
        assert_eq!(config.page_pacing.base_delay.as_millis(), 400);
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("HAWK_PAGE_DELAY", " 0.25 ").unwrap().as_millis(), 250);
        assert_eq!(parse_secs("HAWK_PAGE_DELAY", "0").unwrap(), Duration::ZERO);

        for bad in ["-1", "NaN", "inf", "1e20", "soon"] {
            let err = parse_secs("HAWK_PAGE_DELAY", bad).unwrap_err();
            assert!(err.to_string().contains("HAWK_PAGE_DELAY"), "{}", bad);
        }
    }
}
