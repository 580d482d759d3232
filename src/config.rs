use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "google/gemini-flash-1.5";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const INSECURE_SESSION_SECRET: &str = "pcos-meal-coach-dev-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    pub bind_addr: String,
    pub timezone: Tz,
    pub session_secret: String,
    pub session_ttl_minutes: i64,
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Reads settings from the environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let openrouter_api_key = get("OPENROUTER_API_KEY")
            .filter(|v| !v.is_empty())
            .context("OPENROUTER_API_KEY must be set in .env file")?;

        let openrouter_model = get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let timezone = match get("APP_TIMEZONE") {
            Some(tz) => tz
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid APP_TIMEZONE '{}': {}", tz, e))?,
            None => chrono_tz::UTC,
        };

        let session_secret = get("SESSION_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️ SESSION_SECRET not set, using a built-in default (INSECURE!)");
            INSECURE_SESSION_SECRET.to_string()
        });

        let session_ttl_minutes = match get("SESSION_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .with_context(|| format!("SESSION_TTL_MINUTES must be a positive number, got '{}'", v))?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a number, got '{}'", v))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let static_dir = get("STATIC_DIR").filter(|v| !v.is_empty()).map(PathBuf::from);

        Ok(Self {
            openrouter_api_key,
            openrouter_model,
            bind_addr,
            timezone,
            session_secret,
            session_ttl_minutes,
            max_upload_bytes,
            static_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.openrouter_model, DEFAULT_MODEL);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.session_ttl_minutes, 120);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("APP_TIMEZONE", "Asia/Shanghai"),
            ("SESSION_TTL_MINUTES", "30"),
            ("STATIC_DIR", "./web"),
        ]))
        .unwrap();

        assert_eq!(config.openrouter_model, "openai/gpt-4o-mini");
        assert_eq!(config.timezone, chrono_tz::Asia::Shanghai);
        assert_eq!(config.session_ttl_minutes, 30);
        assert_eq!(config.static_dir, Some(PathBuf::from("./web")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("APP_TIMEZONE", "Mars/Olympus"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("SESSION_TTL_MINUTES", "0"),
        ]))
        .is_err());
    }
}
