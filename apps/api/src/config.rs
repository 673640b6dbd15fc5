use anyhow::{Context, Result};

use crate::extraction::extractor::{DEFAULT_FALLBACK_MIN_CHARS, DEFAULT_MAX_PAGES};
use crate::extraction::ExtractionPolicy;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub fallback_min_chars: usize,
    pub full_parser_max_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            fallback_min_chars: DEFAULT_FALLBACK_MIN_CHARS,
            full_parser_max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        Ok(Config {
            port: parse_or("PORT", &lookup, defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", &lookup, defaults.max_upload_bytes)?,
            fallback_min_chars: parse_or(
                "FALLBACK_MIN_CHARS",
                &lookup,
                defaults.fallback_min_chars,
            )?,
            full_parser_max_pages: parse_or(
                "FULL_PARSER_MAX_PAGES",
                &lookup,
                defaults.full_parser_max_pages,
            )?,
        })
    }

    pub fn extraction_policy(&self) -> ExtractionPolicy {
        ExtractionPolicy {
            fallback_min_chars: self.fallback_min_chars,
            max_pages: self.full_parser_max_pages,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
