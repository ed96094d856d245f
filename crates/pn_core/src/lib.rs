pub mod config;
pub mod error;
pub mod storage;
pub mod translation;
pub mod types;

pub use config::Settings;
pub use error::{Error, FetchError};
pub use storage::ArticleStorage;
pub use translation::Translator;
pub use types::{
    Article, ArticlePage, ArticleQuery, RawItem, ScrapeProgress, ScrapeRecord, ScrapeStatus,
    SourceConfig, SourceFilter, SourceId,
};

pub type Result<T> = std::result::Result<T, Error>;
