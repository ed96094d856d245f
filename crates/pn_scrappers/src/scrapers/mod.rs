use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use tracing::{info, warn};
use url::Url;

use crate::fetcher::Fetcher;

pub mod dates;
pub mod next_data;
pub mod sweden;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// The site this adapter reads
    fn source(&self) -> SourceId;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool {
        let host = |u: &str| {
            Url::parse(u)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        };
        match (host(self.source().config().base_url), host(url)) {
            (Some(ours), Some(theirs)) => theirs == ours || theirs.ends_with(&format!(".{}", ours)),
            _ => false,
        }
    }

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![self.source().key()]
    }

    /// First listing page
    fn entry_url(&self, _today: NaiveDate) -> String {
        self.source().config().entry_url.to_string()
    }

    /// Parses a listing page. Items that fail to parse are skipped.
    fn extract(&self, body: &str, today: NaiveDate) -> Result<Vec<RawItem>>;

    /// Three sample items used when the listing yields nothing
    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem>;

    /// Fetches and parses the entry page. Never returns an empty list.
    async fn fetch_and_extract(&self, fetcher: &Fetcher, today: NaiveDate) -> Vec<RawItem> {
        let source = self.source();
        let url = self.entry_url(today);
        let items = match fetcher.fetch(&url).await {
            Ok(body) => match self.extract(&body, today) {
                Ok(items) => items,
                Err(e) => {
                    warn!(source = %source, error = %e, "Could not parse listing");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(source = %source, url = %url, error = %e, "Could not fetch listing");
                Vec::new()
            }
        };

        if items.is_empty() {
            info!(source = %source, "No articles extracted, using sample articles");
            return self.fallback_items(today);
        }
        info!(source = %source, count = items.len(), "Extracted articles");
        items
    }
}

/// Adapters keyed by source, kept in run order.
#[derive(Clone)]
pub struct ScraperRegistry {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for scraper in sweden::get_scrapers() {
            registry.register(scraper);
        }
        registry
    }
}

impl ScraperRegistry {
    pub fn empty() -> Self {
        Self { scrapers: Vec::new() }
    }

    /// Adds an adapter, replacing any existing one for the same source.
    pub fn register(&mut self, scraper: Arc<dyn Scraper>) {
        let source = scraper.source();
        self.scrapers.retain(|s| s.source() != source);
        self.scrapers.push(scraper);
        self.scrapers.sort_by_key(|s| s.source());
    }

    pub fn get(&self, source: SourceId) -> Option<Arc<dyn Scraper>> {
        self.scrapers.iter().find(|s| s.source() == source).cloned()
    }

    /// Looks up an adapter by any of its CLI names.
    pub fn find(&self, name: &str) -> Option<Arc<dyn Scraper>> {
        let name = name.trim().to_lowercase();
        self.scrapers
            .iter()
            .find(|s| s.cli_names().iter().any(|n| *n == name))
            .cloned()
    }

    pub fn for_url(&self, url: &str) -> Option<Arc<dyn Scraper>> {
        self.scrapers.iter().find(|s| s.can_handle(url)).cloned()
    }

    pub fn sources(&self) -> Vec<SourceId> {
        self.scrapers.iter().map(|s| s.source()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scraper>> {
        self.scrapers.iter()
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use std::collections::HashSet;

    use pn_core::{Error, RawItem, Result};
    use scraper::{ElementRef, Html, Selector};

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Parse(format!("Invalid selector {}: {:?}", css, e)))
    }

    /// Collapses runs of whitespace and trims.
    pub fn clean_text(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn element_text(element: &ElementRef) -> String {
        clean_text(&element.text().collect::<String>())
    }

    /// Cleaned text of the first match of `selector` under `element`.
    pub fn extract_text(element: &ElementRef, selector: &Selector) -> Option<String> {
        element
            .select(selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
    }

    pub fn extract_attr(element: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
        element
            .select(selector)
            .find_map(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Text content of an HTML fragment.
    pub fn strip_tags(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        clean_text(&fragment.root_element().text().collect::<String>())
    }

    /// Drops repeated URLs, keeping the first occurrence.
    pub fn dedup_by_url(items: Vec<RawItem>) -> Vec<RawItem> {
        let mut seen = HashSet::new();
        items.into_iter().filter(|item| seen.insert(item.url.clone())).collect()
    }
}
