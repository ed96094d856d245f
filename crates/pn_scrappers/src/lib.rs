pub mod cli;
pub mod fetcher;
pub mod gate;
pub mod logging;
pub mod manager;
pub mod scrapers;
pub mod transport;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use fetcher::Fetcher;
pub use gate::filter_new;
pub use manager::{RunOutcome, ScraperManager, SourceSelection};
pub use scrapers::{Scraper, ScraperRegistry};
pub use transport::{RelayTransport, ReqwestTransport, Transport};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::{Fetcher, ScraperManager};
    pub use pn_core::{Article, Error, RawItem, Result, SourceId};
}
