use async_trait::async_trait;
use chrono::NaiveDate;
use pn_core::{RawItem, Result, SourceId};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::scrapers::dates::{parse_iso_date, parse_swedish_date};
use crate::scrapers::utils;
use crate::scrapers::Scraper;

/// Dagens Industri, real-estate tag page.
#[derive(Debug, Default, Clone)]
pub struct DiScraper;

struct Selectors {
    item: Selector,
    heading: Selector,
    link: Selector,
    time: Selector,
}

impl DiScraper {
    pub fn new() -> Self {
        Self
    }

    fn selectors() -> Result<Selectors> {
        Ok(Selectors {
            item: utils::selector("article.news-item")?,
            heading: utils::selector("h2.news-item__heading")?,
            link: utils::selector("a[href]")?,
            time: utils::selector("time.global-xs-bold")?,
        })
    }

    fn parse_item(&self, article: &ElementRef, sel: &Selectors) -> Option<RawItem> {
        let title = utils::extract_text(article, &sel.heading)?;
        let href = utils::extract_attr(article, &sel.link, "href")?;
        let url = self.source().resolve_url(&href)?;

        let date = article
            .value()
            .attr("data-day")
            .and_then(parse_iso_date)
            .or_else(|| utils::extract_text(article, &sel.time).and_then(|t| parse_swedish_date(&t)));

        Some(RawItem::new(title, url, date))
    }
}

#[async_trait]
impl Scraper for DiScraper {
    fn source(&self) -> SourceId {
        SourceId::Di
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["di", "dagensindustri"]
    }

    fn entry_url(&self, today: NaiveDate) -> String {
        format!(
            "https://www.di.se/get-list-articles/?template=tagPage&id=di.tag.fastighet&lastday={}&page=1",
            today.format("%Y-%m-%d")
        )
    }

    fn extract(&self, body: &str, _today: NaiveDate) -> Result<Vec<RawItem>> {
        let sel = Self::selectors()?;
        let document = Html::parse_document(body);
        let items = document
            .select(&sel.item)
            .filter_map(|article| {
                let item = self.parse_item(&article, &sel);
                if item.is_none() {
                    debug!(source = "di", "Skipping article element without title or link");
                }
                item
            })
            .collect();
        Ok(utils::dedup_by_url(items))
    }

    fn fallback_items(&self, today: NaiveDate) -> Vec<RawItem> {
        vec![
            RawItem::sample(
                "Fastighetssektorn visar stark utveckling",
                "https://www.di.se/artikel/fastighetssektorn-stark-utveckling",
                today,
            ),
            RawItem::sample(
                "Nya investeringar i kommersiella fastigheter",
                "https://www.di.se/artikel/nya-investeringar-kommersiella",
                today,
            ),
            RawItem::sample(
                "Bostadsmarknaden fortsätter att växa",
                "https://www.di.se/artikel/bostadsmarknaden-fortsatter-vaxa",
                today,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <article class="news-item" data-id="1" data-day="2025-09-16">
            <a href="/nyheter/kontor-malmo"><h2 class="news-item__heading">Nytt kontor i Malmö</h2></a>
          </article>
          <article class="news-item" data-id="2">
            <a href="https://www.di.se/nyheter/lager"><h2 class="news-item__heading"> Lager säljs </h2></a>
            <time class="global-xs-bold">3 oktober 2025</time>
          </article>
          <article class="news-item" data-id="3">
            <a href="/nyheter/utan-datum"><h2 class="news-item__heading">Utan datum</h2></a>
          </article>
          <article class="news-item" data-id="4">
            <h2 class="news-item__heading">Ingen länk</h2>
          </article>
        </body></html>
    "#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()
    }

    #[test]
    fn test_extract() {
        let items = DiScraper::new().extract(PAGE, today()).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].title, "Nytt kontor i Malmö");
        assert_eq!(items[0].url, "https://www.di.se/nyheter/kontor-malmo");
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2025, 9, 16));

        assert_eq!(items[1].title, "Lager säljs");
        assert_eq!(items[1].date, NaiveDate::from_ymd_opt(2025, 10, 3));

        assert_eq!(items[2].date, None);
        assert!(items.iter().all(|i| !i.synthetic));
    }

    #[test]
    fn test_entry_url_carries_date() {
        assert!(DiScraper::new().entry_url(today()).contains("lastday=2025-10-10"));
    }

    #[test]
    fn test_can_handle() {
        let scraper = DiScraper::new();
        assert!(scraper.can_handle("https://www.di.se/article"));
        assert!(!scraper.can_handle("https://www.fastighetsnytt.se/article"));
    }
}
