//! Runtime configuration.
//!
//! Everything the commands need (data directory, API keys, model choice) is
//! collected once into an [`AppConfig`] and handed to whichever component
//! needs it.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::AppError;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REFRESH_MINUTES: u64 = 10;
pub const DEFAULT_AI_LANGUAGE: &str = "Korean";

/// Earliest observation date kept in the local store.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub fred_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub start_date: NaiveDate,
    pub refresh_interval: Duration,
    /// Language the model is asked to answer in.
    pub ai_language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            fred_api_key: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            start_date: default_start_date(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_MINUTES * 60),
            ai_language: DEFAULT_AI_LANGUAGE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("MDASH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.fred_api_key = get("FRED_API_KEY");
        config.gemini_api_key = get("GEMINI_API_KEY");
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(raw) = get("MDASH_START_DATE") {
            config.start_date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| AppError::usage(format!("Invalid MDASH_START_DATE '{raw}': {e}")))?;
        }
        if let Some(raw) = get("MDASH_REFRESH_MINUTES") {
            let minutes: u64 = raw
                .parse()
                .map_err(|e| AppError::usage(format!("Invalid MDASH_REFRESH_MINUTES '{raw}': {e}")))?;
            config.refresh_interval = Duration::from_secs(minutes * 60);
        }
        if let Some(lang) = get("MDASH_AI_LANGUAGE") {
            config.ai_language = lang;
        }

        Ok(config)
    }

    pub fn require_fred_key(&self) -> Result<&str, AppError> {
        self.fred_api_key
            .as_deref()
            .ok_or_else(|| AppError::usage("Missing FRED_API_KEY in environment (.env)."))
    }
}
