use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::{ElementRef, Html, Selector};

use crate::scrapers::utils;
use crate::scrapers::Scraper;

#[derive(Debug, Default, Clone)]
pub struct NordicPropertyNewsScraper;

const CONTAINER_CLASSES: [&str; 2] = ["article", "news-item"];

impl NordicPropertyNewsScraper {
    pub fn new() -> Self {
        Self
    }

    /// Link for a headline: first `a.black-link` in its parent, else in the
    /// closest article-like ancestor.
    fn find_link(header: &ElementRef, link: &Selector) -> Option<String> {
        let parent = header.parent().and_then(ElementRef::wrap);
        if let Some(href) = parent.and_then(|p| utils::extract_attr(&p, link, "href")) {
            return Some(href);
        }
        header
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| {
                el.value().name() == "article"
                    || el.value().classes().any(|c| CONTAINER_CLASSES.contains(&c))
            })
            .and_then(|container| utils::extract_attr(&container, link, "href"))
    }
}

#[async_trait]
impl Scraper for NordicPropertyNewsScraper {
    fn source(&self) -> SourceId {
        SourceId::Nordicpropertynews
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["nordicpropertynews", "npn"]
    }

    fn extract(&self, body: &str, today: NaiveDate) -> Result<Vec<RawItem>> {
        let header = utils::selector("h2.article-header")?;
        let link = utils::selector("a.black-link")?;

        let document = Html::parse_document(body);
        let items = document
            .select(&header)
            .filter_map(|h| {
                let title = utils::element_text(&h);
                if title.is_empty() {
                    return None;
                }
                let href = Self::find_link(&h, &link)?;
                let url = self.source().resolve_url(&href)?;
                Some(RawItem::new(title, url, Some(today)))
            })
            .collect();
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Nordic Property Market Shows Strong Growth",
                "https://www.nordicpropertynews.com/article/nordic-property-market-growth",
                today,
            ),
            RawItem::sample(
                "Commercial Real Estate Development Continues",
                "https://www.nordicpropertynews.com/article/commercial-real-estate-development",
                today,
            ),
            RawItem::sample(
                "New Investment Opportunities in Nordic Real Estate",
                "https://www.nordicpropertynews.com/article/investment-opportunities-nordic",
                today,
            ),
        ]
    }
}
