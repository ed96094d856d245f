use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/raw";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scraping: ScrapingSettings,
    pub translation: TranslationSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingSettings {
    pub rate_limit_delay_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
    /// Relay used when the direct transport is blocked. `None` disables the fallback.
    pub relay_url: Option<String>,
    pub user_agent: String,
    /// Persist sample items produced when a listing could not be scraped.
    pub persist_fallback: bool,
}

impl Default for ScrapingSettings {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 2000,
            max_retries: 3,
            retry_delay_ms: 5000,
            timeout_ms: 30000,
            relay_url: Some(DEFAULT_RELAY_URL.to_string()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            persist_fallback: false,
        }
    }
}

impl ScrapingSettings {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub source_language: String,
    pub target_language: String,
    pub rate_limit_delay_ms: u64,
    pub endpoint: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            source_language: "auto".to_string(),
            target_language: "en".to_string(),
            rate_limit_delay_ms: 1000,
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
        }
    }
}

impl TranslationSettings {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub articles_per_page: usize,
    pub max_articles: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            articles_per_page: 20,
            max_articles: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// "json" or "memory"
    pub backend: String,
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "json".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys take their defaults.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Settings from `path` when given, defaults otherwise.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ui.articles_per_page == 0 {
            return Err(Error::Config("ui.articles_per_page must be positive".to_string()));
        }
        if self.ui.max_articles < self.ui.articles_per_page {
            return Err(Error::Config(
                "ui.max_articles must be at least ui.articles_per_page".to_string(),
            ));
        }
        if self.scraping.timeout_ms == 0 {
            return Err(Error::Config("scraping.timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}
