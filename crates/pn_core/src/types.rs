use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// The six property-news sites, in the order a full run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Fastighetsvarlden,
    Cision,
    Lokalguiden,
    Di,
    Fastighetsnytt,
    Nordicpropertynews,
}

/// Static description of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub key: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub entry_url: &'static str,
    pub requires_translation: bool,
    pub color: &'static str,
}

impl SourceId {
    pub const ALL: [SourceId; 6] = [
        SourceId::Fastighetsvarlden,
        SourceId::Cision,
        SourceId::Lokalguiden,
        SourceId::Di,
        SourceId::Fastighetsnytt,
        SourceId::Nordicpropertynews,
    ];

    pub fn key(&self) -> &'static str {
        self.config().key
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn requires_translation(&self) -> bool {
        self.config().requires_translation
    }

    pub fn config(&self) -> SourceConfig {
        match self {
            SourceId::Fastighetsvarlden => SourceConfig {
                key: "fastighetsvarlden",
                name: "Fastighetsvarlden",
                base_url: "https://www.fastighetsvarlden.se",
                entry_url: "https://www.fastighetsvarlden.se/arkivet",
                requires_translation: true,
                color: "blue",
            },
            SourceId::Cision => SourceConfig {
                key: "cision",
                name: "Cision",
                base_url: "https://news.cision.com",
                entry_url: "https://news.cision.com/ListItems?i=04004003&pageIx=1",
                requires_translation: false,
                color: "green",
            },
            SourceId::Lokalguiden => SourceConfig {
                key: "lokalguiden",
                name: "Lokalguiden",
                base_url: "https://www.lokalguiden.se",
                entry_url: "https://www.lokalguiden.se/magasinet/?page=1",
                requires_translation: true,
                color: "purple",
            },
            SourceId::Di => SourceConfig {
                key: "di",
                name: "DI",
                base_url: "https://www.di.se",
                entry_url: "https://www.di.se/get-list-articles/?template=tagPage&id=di.tag.fastighet&page=1",
                requires_translation: true,
                color: "orange",
            },
            SourceId::Fastighetsnytt => SourceConfig {
                key: "fastighetsnytt",
                name: "Fastighetsnytt",
                base_url: "https://www.fastighetsnytt.se",
                entry_url: "https://www.fastighetsnytt.se/",
                requires_translation: true,
                color: "red",
            },
            SourceId::Nordicpropertynews => SourceConfig {
                key: "nordicpropertynews",
                name: "Nordic Property News",
                base_url: "https://www.nordicpropertynews.com",
                entry_url: "https://www.nordicpropertynews.com/?page=1",
                requires_translation: false,
                color: "yellow",
            },
        }
    }

    /// Resolves an href found on this source's pages to an absolute URL.
    pub fn resolve_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        let base = Url::parse(self.config().base_url).ok()?;
        base.join(href).ok().map(String::from)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceId::ALL
            .into_iter()
            .find(|id| id.key() == wanted)
            .ok_or_else(|| Error::UnknownSource(s.to_string()))
    }
}

/// One listing entry as extracted by an adapter, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub url: String,
    pub date: Option<NaiveDate>,
    /// Sample data standing in for a listing that could not be scraped.
    pub synthetic: bool,
}

impl RawItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date,
            synthetic: false,
        }
    }

    pub fn sample(title: impl Into<String>, url: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: Some(date),
            synthetic: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    pub url: String,
    pub date: NaiveDate,
    pub source: SourceId,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub synthetic: bool,
}

impl Article {
    /// Normalizes a raw item; a missing date becomes `today`.
    pub fn from_raw(item: RawItem, source: SourceId, today: NaiveDate) -> Self {
        Self {
            title: item.title,
            original_title: None,
            url: item.url,
            date: item.date.unwrap_or(today),
            source,
            scraped_at: None,
            synthetic: item.synthetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Idle,
    Scraping,
    Completed,
    Error,
    Stopped,
}

impl ScrapeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScrapeStatus::Completed | ScrapeStatus::Error | ScrapeStatus::Stopped)
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScrapeStatus::Idle => "idle",
            ScrapeStatus::Scraping => "scraping",
            ScrapeStatus::Completed => "completed",
            ScrapeStatus::Error => "error",
            ScrapeStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Immutable snapshot of a run. A new value is published for every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeProgress {
    pub status: ScrapeStatus,
    pub current_source: Option<String>,
    pub sources_completed: Vec<String>,
    pub total_sources: usize,
    pub current_source_index: usize,
    pub message: String,
    pub articles_scraped: usize,
}

impl Default for ScrapeProgress {
    fn default() -> Self {
        Self {
            status: ScrapeStatus::Idle,
            current_source: None,
            sources_completed: Vec::new(),
            total_sources: 0,
            current_source_index: 0,
            message: "Ready".to_string(),
            articles_scraped: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(SourceId),
}

impl SourceFilter {
    pub fn matches(&self, source: SourceId) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Only(id) => *id == source,
        }
    }
}

impl FromStr for SourceFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            Ok(SourceFilter::All)
        } else {
            s.parse().map(SourceFilter::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub source: SourceFilter,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub search: Option<String>,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            source: SourceFilter::All,
            page: 1,
            page_size: 20,
            search: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// One entry of the scrape log, written on every successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRecord {
    pub source: SourceId,
    pub timestamp: DateTime<Utc>,
    pub articles_count: usize,
    pub status: String,
}
