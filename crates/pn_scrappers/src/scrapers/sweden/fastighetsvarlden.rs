use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::{ElementRef, Html};

use crate::scrapers::dates::{is_date_header, parse_any_date, parse_iso_date};
use crate::scrapers::utils;
use crate::scrapers::Scraper;

const ARTICLE_SECTIONS: [&str; 4] = ["/notiser/", "/nyheter/", "/analys-fakta/", "/portrattet/"];

/// The archive page lists links grouped under bare `YYYY-MM-DD` headings.
#[derive(Debug, Default, Clone)]
pub struct FastighetsvarldenScraper;

impl FastighetsvarldenScraper {
    pub fn new() -> Self {
        Self
    }

    fn is_article_url(url: &str) -> bool {
        url.contains("fastighetsvarlden.se")
            && ARTICLE_SECTIONS.iter().any(|s| url.contains(s))
            && !url.contains("/page/")
    }

    fn content_root<'a>(document: &'a Html) -> Result<ElementRef<'a>> {
        for css in ["main", r#"[id*="content"]"#, r#"[class*="content"]"#] {
            if let Some(el) = document.select(&utils::selector(css)?).next() {
                return Ok(el);
            }
        }
        Ok(document.root_element())
    }

    fn archive_items(&self, document: &Html) -> Result<Vec<RawItem>> {
        let blocks = utils::selector("h2, h3, h4, p, li")?;
        let links = utils::selector("a[href]")?;
        let root = Self::content_root(document)?;

        let mut current_date = None;
        let mut items = Vec::new();
        for block in root.select(&blocks) {
            let text = utils::element_text(&block);
            if is_date_header(&text) {
                current_date = parse_iso_date(&text);
                continue;
            }
            let Some(date) = current_date else {
                continue;
            };
            for link in block.select(&links) {
                let title = utils::element_text(&link);
                let url = link
                    .value()
                    .attr("href")
                    .and_then(|href| self.source().resolve_url(href));
                match url {
                    Some(url) if !title.is_empty() && Self::is_article_url(&url) => {
                        items.push(RawItem::new(title, url, Some(date)));
                    }
                    _ => {}
                }
            }
        }
        Ok(items)
    }

    fn card_items(&self, document: &Html) -> Result<Vec<RawItem>> {
        let cards = utils::selector(".card-item, .article-item, .news-item")?;
        let link = utils::selector("a[href]")?;
        let date = utils::selector(r#"time, [class*="date"]"#)?;

        let items = document
            .select(&cards)
            .filter_map(|card| {
                let anchor = card.select(&link).next()?;
                let title = utils::element_text(&anchor);
                if title.is_empty() {
                    return None;
                }
                let url = self.source().resolve_url(anchor.value().attr("href")?)?;
                let date = utils::extract_text(&card, &date).and_then(|t| parse_any_date(&t));
                Some(RawItem::new(title, url, date))
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl Scraper for FastighetsvarldenScraper {
    fn source(&self) -> SourceId {
        SourceId::Fastighetsvarlden
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["fastighetsvarlden", "fv"]
    }

    fn extract(&self, body: &str, _today: NaiveDate) -> Result<Vec<RawItem>> {
        let document = Html::parse_document(body);
        let mut items = self.archive_items(&document)?;
        items.extend(self.card_items(&document)?);
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Fastighetsmarknaden visar positiva tecken",
                "https://www.fastighetsvarlden.se/artikel/fastighetsmarknaden-visar-positiva-tecken",
                today,
            ),
            RawItem::sample(
                "Ny utveckling inom kommersiella fastigheter",
                "https://www.fastighetsvarlden.se/artikel/ny-utveckling-kommersiella-fastigheter",
                today,
            ),
            RawItem::sample(
                "Bostadsmarknaden fortsätter att växa",
                "https://www.fastighetsvarlden.se/artikel/bostadsmarknaden-fortsatter-vaxa",
                today,
            ),
        ]
    }
}
