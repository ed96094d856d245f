use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pn_core::{
    Article, ArticlePage, ArticleQuery, ArticleStorage, Error, Result, ScrapeRecord, SourceId,
};
use tokio::sync::RwLock;

use crate::query::run_query;

pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Scrape records kept per source; older ones are dropped on save.
pub const MAX_SCRAPE_RECORDS: usize = 50;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    scrapes: Vec<ScrapeRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(articles: Vec<Article>, scrapes: Vec<ScrapeRecord>) -> Self {
        Self { articles, scrapes }
    }

    pub fn into_parts(self) -> (Vec<Article>, Vec<ScrapeRecord>) {
        (self.articles, self.scrapes)
    }

    /// Inserts articles not yet stored under `(source, url)`, returning how many were new.
    ///
    /// Stored articles are never rewritten: a URL already present for the
    /// source is skipped.
    pub fn upsert(&mut self, articles: Vec<Article>, source: SourceId) -> Result<usize> {
        articles.iter().try_for_each(|a| check_source(a, source))?;
        let now = Utc::now();
        let mut known = self.known_urls(source);
        let mut written = 0;
        for mut article in articles {
            if !known.insert(article.url.clone()) {
                continue;
            }
            article.scraped_at.get_or_insert(now);
            self.articles.push(article);
            written += 1;
        }
        self.record_scrape(ScrapeRecord {
            source,
            timestamp: now,
            articles_count: written,
            status: "success".to_string(),
        });
        Ok(written)
    }

    fn record_scrape(&mut self, record: ScrapeRecord) {
        let source = record.source;
        self.scrapes.push(record);
        let kept = self.scrapes.iter().filter(|r| r.source == source).count();
        if kept > MAX_SCRAPE_RECORDS {
            let mut excess = kept - MAX_SCRAPE_RECORDS;
            self.scrapes.retain(|r| {
                if excess > 0 && r.source == source {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    pub fn known_urls(&self, source: SourceId) -> HashSet<String> {
        self.articles
            .iter()
            .filter(|a| a.source == source)
            .map(|a| a.url.clone())
            .collect()
    }

    pub fn last_scrape(&self, source: SourceId) -> Option<ScrapeRecord> {
        self.scrapes.iter().rev().find(|r| r.source == source).cloned()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }
}

pub(crate) fn check_source(article: &Article, source: SourceId) -> Result<()> {
    if article.source != source {
        return Err(Error::Storage(format!(
            "article {} belongs to {}, not {}",
            article.url, article.source, source
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    max_page_size: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn known_urls(&self, source: SourceId) -> Result<HashSet<String>> {
        Ok(self.store.read().await.known_urls(source))
    }

    async fn save_articles(&self, articles: Vec<Article>, source: SourceId) -> Result<usize> {
        self.store.write().await.upsert(articles, source)
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        let store = self.store.read().await;
        Ok(run_query(store.articles(), query, self.max_page_size))
    }

    async fn last_scrape(&self, source: SourceId) -> Result<Option<ScrapeRecord>> {
        Ok(self.store.read().await.last_scrape(source))
    }

    async fn clear(&self) -> Result<()> {
        *self.store.write().await = MemoryStore::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(url: &str, source: SourceId) -> Article {
        Article {
            title: "Test Article".to_string(),
            original_title: None,
            url: url.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 16).unwrap(),
            source,
            scraped_at: None,
            synthetic: false,
        }
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        let saved = storage
            .save_articles(
                vec![article("https://x/1", SourceId::Di), article("https://x/2", SourceId::Di)],
                SourceId::Di,
            )
            .await
            .unwrap();
        assert_eq!(saved, 2);

        let known = storage.known_urls(SourceId::Di).await.unwrap();
        assert!(known.contains("https://x/1"));
        assert!(storage.known_urls(SourceId::Cision).await.unwrap().is_empty());

        let page = storage.query_articles(&ArticleQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.articles.iter().all(|a| a.scraped_at.is_some()));

        let record = storage.last_scrape(SourceId::Di).await.unwrap().unwrap();
        assert_eq!(record.articles_count, 2);
        assert_eq!(record.status, "success");
    }

    #[tokio::test]
    async fn test_resave_leaves_stored_article_untouched() {
        let storage = MemoryStorage::new();
        let mut original = article("https://x/1", SourceId::Di);
        original.title = "Original".to_string();
        storage.save_articles(vec![original], SourceId::Di).await.unwrap();
        let first = storage.query_articles(&ArticleQuery::default()).await.unwrap().articles[0].scraped_at;

        let mut changed = article("https://x/1", SourceId::Di);
        changed.title = "Changed".to_string();
        let saved = storage.save_articles(vec![changed], SourceId::Di).await.unwrap();
        assert_eq!(saved, 0);
        let page = storage.query_articles(&ArticleQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.articles[0].title, "Original");
        assert_eq!(page.articles[0].scraped_at, first);
    }

    #[test]
    fn test_duplicate_urls_in_one_batch() {
        let mut store = MemoryStore::new();
        let written = store
            .upsert(vec![article("https://x/1", SourceId::Di), article("https://x/1", SourceId::Di)], SourceId::Di)
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.articles().len(), 1);
    }

    #[test]
    fn test_scrape_records_are_pruned_per_source() {
        let mut store = MemoryStore::new();
        store.upsert(vec![article("https://x/c", SourceId::Cision)], SourceId::Cision).unwrap();
        for i in 0..MAX_SCRAPE_RECORDS + 5 {
            store.upsert(vec![article(&format!("https://x/{}", i), SourceId::Di)], SourceId::Di).unwrap();
        }
        let (_, scrapes) = store.into_parts();
        let di = scrapes.iter().filter(|r| r.source == SourceId::Di).count();
        assert_eq!(di, MAX_SCRAPE_RECORDS);
        assert!(scrapes.iter().any(|r| r.source == SourceId::Cision));
    }

    #[tokio::test]
    async fn test_same_url_in_two_sources() {
        let storage = MemoryStorage::new();
        storage.save_articles(vec![article("https://x/1", SourceId::Di)], SourceId::Di).await.unwrap();
        storage.save_articles(vec![article("https://x/1", SourceId::Cision)], SourceId::Cision).await.unwrap();
        assert_eq!(storage.query_articles(&ArticleQuery::default()).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn test_wrong_source_rejected() {
        let storage = MemoryStorage::new();
        let result = storage.save_articles(vec![article("https://x/1", SourceId::Di)], SourceId::Cision).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = MemoryStorage::new();
        storage.save_articles(vec![article("https://x/1", SourceId::Di)], SourceId::Di).await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.query_articles(&ArticleQuery::default()).await.unwrap().total, 0);
        assert!(storage.last_scrape(SourceId::Di).await.unwrap().is_none());
    }
}
