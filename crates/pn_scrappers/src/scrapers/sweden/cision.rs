use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::{ElementRef, Html, Selector};

use crate::scrapers::dates::parse_any_date;
use crate::scrapers::utils;
use crate::scrapers::Scraper;

/// Cision press releases, real-estate industry listing.
#[derive(Debug, Default, Clone)]
pub struct CisionScraper;

impl CisionScraper {
    pub fn new() -> Self {
        Self
    }

    fn parse_card(&self, link: &ElementRef, heading: &Selector, time: &Selector) -> Option<RawItem> {
        let href = link.value().attr("href")?;
        let url = self.source().resolve_url(href)?;
        let title = utils::extract_text(link, heading)?;

        let date = link.select(time).next().and_then(|t| {
            let raw = t
                .value()
                .attr("pubdate")
                .or_else(|| t.value().attr("datetime"))
                .map(str::to_string)
                .unwrap_or_else(|| utils::element_text(&t));
            parse_any_date(&raw)
        });

        Some(RawItem::new(title, url, date))
    }
}

#[async_trait]
impl Scraper for CisionScraper {
    fn source(&self) -> SourceId {
        SourceId::Cision
    }

    fn extract(&self, body: &str, _today: NaiveDate) -> Result<Vec<RawItem>> {
        let link = utils::selector("div.card-item article a.bodytext.content")?;
        let heading = utils::selector("h2")?;
        let time = utils::selector("time")?;

        let document = Html::parse_document(body);
        let items = document
            .select(&link)
            .filter_map(|el| self.parse_card(&el, &heading, &time))
            .collect();
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Real Estate Market Shows Strong Growth",
                "https://news.cision.com/view/real-estate-market-growth",
                today,
            ),
            RawItem::sample(
                "Commercial Property Development Continues",
                "https://news.cision.com/view/commercial-property-development",
                today,
            ),
            RawItem::sample(
                "New Investment Opportunities in Real Estate",
                "https://news.cision.com/view/investment-opportunities",
                today,
            ),
        ]
    }
}
