use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Which backend answers storyboard submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderBackend {
    Keyword,
    Llm,
}

impl FromStr for ResponderBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(ResponderBackend::Keyword),
            "llm" => Ok(ResponderBackend::Llm),
            other => Err(anyhow!(
                "RESPONDER must be 'keyword' or 'llm', got '{other}'"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is malformed, or if the LLM backend is chosen
/// without an API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub response_delay: Duration,
    pub response_timeout: Duration,
    pub max_upload_bytes: usize,
    pub session_idle_ttl: Duration,
    pub responder: ResponderBackend,
    pub llm_model: String,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let responder: ResponderBackend = env_or("RESPONDER", "keyword").parse()?;
        let anthropic_api_key = match responder {
            ResponderBackend::Llm => Some(require_env("ANTHROPIC_API_KEY")?),
            ResponderBackend::Keyword => std::env::var("ANTHROPIC_API_KEY").ok(),
        };

        Ok(Config {
            port: parse_env("PORT", "8080")?,
            rust_log: env_or("RUST_LOG", "info"),
            response_delay: Duration::from_millis(parse_env("RESPONSE_DELAY_MS", "1500")?),
            response_timeout: positive_secs("RESPONSE_TIMEOUT_SECS", "30")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", "20971520")?,
            session_idle_ttl: positive_secs("SESSION_IDLE_TTL_SECS", "3600")?,
            responder,
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            anthropic_api_key,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, &env_or(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

/// Whole seconds that must be at least 1.
fn positive_secs(key: &str, default: &str) -> Result<Duration> {
    seconds_value(key, &env_or(key, default))
}

fn seconds_value(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = parse_value(key, raw)?;
    if secs == 0 {
        return Err(anyhow!("{key} must be a positive number of seconds, got '{raw}'"));
    }
    Ok(Duration::from_secs(secs))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responder_backend_parsing() {
        assert_eq!(
            "keyword".parse::<ResponderBackend>().unwrap(),
            ResponderBackend::Keyword
        );
        assert_eq!(
            " LLM ".parse::<ResponderBackend>().unwrap(),
            ResponderBackend::Llm
        );
        assert!("gpt".parse::<ResponderBackend>().is_err());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let port: u16 = parse_value("PORT", "9000").unwrap();
        assert_eq!(port, 9000);

        let err = parse_value::<u16>("PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_seconds_rejected() {
        let err = seconds_value("RESPONSE_TIMEOUT_SECS", "0").unwrap_err();
        assert!(err.to_string().contains("RESPONSE_TIMEOUT_SECS"));
        assert!(seconds_value("SESSION_IDLE_TTL_SECS", " 0 ").is_err());
        assert_eq!(
            seconds_value("RESPONSE_TIMEOUT_SECS", "30").unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_parse_value_rejects_negative_delay() {
        assert!(parse_value::<u64>("RESPONSE_DELAY_MS", "-5").is_err());
    }
}
