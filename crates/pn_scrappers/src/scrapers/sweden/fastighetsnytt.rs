use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::scrapers::dates::parse_iso_date;
use crate::scrapers::next_data::{article_listings, extract_next_data};
use crate::scrapers::utils;
use crate::scrapers::Scraper;

/// Fastighetsnytt front page. The listing is read from the embedded Next.js
/// page data; plain article links are used when that blob is missing.
#[derive(Debug, Default, Clone)]
pub struct FastighetsnyttScraper;

impl FastighetsnyttScraper {
    pub fn new() -> Self {
        Self
    }

    fn parse_listing(&self, article: &Value, today: NaiveDate) -> Option<RawItem> {
        let href = article.get("url").and_then(Value::as_str)?;
        let headline = article.get("headlineHtml").and_then(Value::as_str)?;
        let title = utils::strip_tags(headline);
        if title.is_empty() {
            return None;
        }
        let url = self.source().resolve_url(href)?;
        let date = article
            .get("publicationTime")
            .and_then(Value::as_str)
            .and_then(parse_iso_date)
            .unwrap_or(today);
        Some(RawItem::new(title, url, Some(date)))
    }

    fn link_items(&self, document: &Html) -> Result<Vec<RawItem>> {
        let link = utils::selector(r#"a[href*="/artikel/"], a[href*="/nyhet/"]"#)?;
        let items = document
            .select(&link)
            .filter_map(|a| {
                let title = utils::element_text(&a);
                if title.is_empty() {
                    return None;
                }
                let url = self.source().resolve_url(a.value().attr("href")?)?;
                Some(RawItem::new(title, url, None))
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl Scraper for FastighetsnyttScraper {
    fn source(&self) -> SourceId {
        SourceId::Fastighetsnytt
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["fastighetsnytt", "fn"]
    }

    fn extract(&self, body: &str, today: NaiveDate) -> Result<Vec<RawItem>> {
        let document = Html::parse_document(body);
        let items = match extract_next_data(&document) {
            Some(data) => article_listings(&data)
                .into_iter()
                .filter_map(|article| self.parse_listing(article, today))
                .collect(),
            None => {
                debug!(source = "fastighetsnytt", "No page data found, reading article links");
                self.link_items(&document)?
            }
        };
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Fastighetsnytt: Marknadsutveckling fortsätter",
                "https://www.fastighetsnytt.se/artikel/marknadsutveckling-fortsatter",
                today,
            ),
            RawItem::sample(
                "Nya trender inom fastighetsbranschen",
                "https://www.fastighetsnytt.se/artikel/nya-trender-fastighetsbranschen",
                today,
            ),
            RawItem::sample(
                "Investeringsmöjligheter i fastigheter",
                "https://www.fastighetsnytt.se/artikel/investeringsmojligheter-fastigheter",
                today,
            ),
        ]
    }
}
