use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{Article, ArticlePage, ArticleQuery, ScrapeRecord, SourceId};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// URLs already stored for a source
    async fn known_urls(&self, source: SourceId) -> Result<HashSet<String>>;

    /// Persist new articles for a source, stamping `scraped_at` and logging the scrape.
    /// Returns the number of articles written.
    async fn save_articles(&self, articles: Vec<Article>, source: SourceId) -> Result<usize>;

    /// Filtered, searched and paginated view of stored articles
    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticlePage>;

    /// Most recent scrape log entry for a source
    async fn last_scrape(&self, source: SourceId) -> Result<Option<ScrapeRecord>>;

    /// Drop all articles and scrape records
    async fn clear(&self) -> Result<()>;
}
