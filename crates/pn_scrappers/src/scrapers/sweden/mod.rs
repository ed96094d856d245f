use std::sync::Arc;

use crate::scrapers::Scraper;

pub mod cision;
pub mod di;
pub mod fastighetsnytt;
pub mod fastighetsvarlden;
pub mod lokalguiden;
pub mod nordicpropertynews;

pub use cision::CisionScraper;
pub use di::DiScraper;
pub use fastighetsnytt::FastighetsnyttScraper;
pub use fastighetsvarlden::FastighetsvarldenScraper;
pub use lokalguiden::LokalguidenScraper;
pub use nordicpropertynews::NordicPropertyNewsScraper;

pub const REGION: &str = "sweden";

/// Returns every Swedish property-news scraper, in run order
pub fn get_scrapers() -> Vec<Arc<dyn Scraper>> {
    vec![
        Arc::new(FastighetsvarldenScraper::new()),
        Arc::new(CisionScraper::new()),
        Arc::new(LokalguidenScraper::new()),
        Arc::new(DiScraper::new()),
        Arc::new(FastighetsnyttScraper::new()),
        Arc::new(NordicPropertyNewsScraper::new()),
    ]
}
