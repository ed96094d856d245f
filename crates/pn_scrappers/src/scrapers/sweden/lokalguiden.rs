use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::Html;

use crate::scrapers::utils;
use crate::scrapers::Scraper;

#[derive(Debug, Default, Clone)]
pub struct LokalguidenScraper;

impl LokalguidenScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scraper for LokalguidenScraper {
    fn source(&self) -> SourceId {
        SourceId::Lokalguiden
    }

    // The magazine listing carries no dates, so items take the scrape date.
    fn extract(&self, body: &str, today: NaiveDate) -> Result<Vec<RawItem>> {
        let card = utils::selector("div.article[data-id]")?;
        let heading = utils::selector("p.title")?;
        let link = utils::selector(r#"a[href*="/magasinet/artikel/"]"#)?;

        let document = Html::parse_document(body);
        let items = document
            .select(&card)
            .filter(|el| !el.value().classes().any(|c| c == "quote-article"))
            .filter_map(|el| {
                let title = utils::extract_text(&el, &heading)?;
                let href = utils::extract_attr(&el, &link, "href")?;
                let url = self.source().resolve_url(&href)?;
                Some(RawItem::new(title, url, Some(today)))
            })
            .collect();
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Lokala fastighetsutvecklingar på gång",
                "https://www.lokalguiden.se/magasinet/artikel/lokala-fastighetsutvecklingar",
                today,
            ),
            RawItem::sample(
                "Nya bostadsprojekt i regionen",
                "https://www.lokalguiden.se/magasinet/artikel/nya-bostadsprojekt",
                today,
            ),
            RawItem::sample(
                "Kommersiella fastigheter får nytt liv",
                "https://www.lokalguiden.se/magasinet/artikel/kommersiella-fastigheter",
                today,
            ),
        ]
    }
}
