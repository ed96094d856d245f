use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pn_core::{
    Article, ArticlePage, ArticleQuery, ArticleStorage, Result, ScrapeRecord, SourceFilter,
    SourceId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::memory::{MemoryStore, DEFAULT_MAX_PAGE_SIZE};
use crate::query::run_query;

/// On-disk layout of `<key>_news_data.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SourceFile {
    source: Option<SourceId>,
    last_scrape: Option<DateTime<Utc>>,
    total_articles: usize,
    articles: Vec<Article>,
    #[serde(default)]
    scrapes: Vec<ScrapeRecord>,
}

/// One JSON document per source under a data directory.
pub struct JsonFileStorage {
    data_dir: PathBuf,
    max_page_size: usize,
    // Serializes read-modify-write cycles on the files.
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(Self {
            data_dir,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            lock: Mutex::new(()),
        })
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn file_for(&self, source: SourceId) -> PathBuf {
        self.data_dir.join(format!("{}_news_data.json", source.key()))
    }

    async fn load(&self, source: SourceId) -> Result<SourceFile> {
        let path = self.file_for(source);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SourceFile::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<SourceFile>(&raw) {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupted data file, starting fresh");
                Ok(SourceFile::default())
            }
        }
    }

    async fn store(&self, source: SourceId, file: &SourceFile) -> Result<()> {
        let path = self.file_for(source);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(file)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), articles = file.total_articles, "Wrote data file");
        Ok(())
    }

    fn sources(filter: SourceFilter) -> Vec<SourceId> {
        match filter {
            SourceFilter::All => SourceId::ALL.to_vec(),
            SourceFilter::Only(id) => vec![id],
        }
    }
}

#[async_trait]
impl ArticleStorage for JsonFileStorage {
    async fn known_urls(&self, source: SourceId) -> Result<HashSet<String>> {
        let file = self.load(source).await?;
        Ok(file.articles.into_iter().map(|a| a.url).collect())
    }

    async fn save_articles(&self, articles: Vec<Article>, source: SourceId) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let file = self.load(source).await?;
        let mut store = MemoryStore::from_parts(file.articles, file.scrapes);
        let written = store.upsert(articles, source)?;
        let last_scrape = store.last_scrape(source).map(|r| r.timestamp);
        let (articles, scrapes) = store.into_parts();

        let file = SourceFile {
            source: Some(source),
            last_scrape,
            total_articles: articles.len(),
            articles,
            scrapes,
        };
        self.store(source, &file).await?;
        Ok(written)
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticlePage> {
        let mut all = Vec::new();
        for source in Self::sources(query.source) {
            all.extend(self.load(source).await?.articles);
        }
        Ok(run_query(&all, query, self.max_page_size))
    }

    async fn last_scrape(&self, source: SourceId) -> Result<Option<ScrapeRecord>> {
        let file = self.load(source).await?;
        Ok(MemoryStore::from_parts(Vec::new(), file.scrapes).last_scrape(source))
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        for source in SourceId::ALL {
            match tokio::fs::remove_file(self.file_for(source)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(url: &str, day: u32) -> Article {
        Article {
            title: format!("Article {}", day),
            original_title: Some(format!("Artikel {}", day)),
            url: url.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            source: SourceId::Di,
            scraped_at: None,
            synthetic: false,
        }
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        let saved = storage
            .save_articles(vec![article("https://x/1", 1), article("https://x/2", 2)], SourceId::Di)
            .await
            .unwrap();
        assert_eq!(saved, 2);
        assert!(storage.file_for(SourceId::Di).exists());

        let reopened = JsonFileStorage::new(dir.path()).await.unwrap();
        let page = reopened.query_articles(&ArticleQuery::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.articles[0].url, "https://x/2");
        assert_eq!(page.articles[0].original_title.as_deref(), Some("Artikel 2"));

        let known = reopened.known_urls(SourceId::Di).await.unwrap();
        assert_eq!(known.len(), 2);
        let record = reopened.last_scrape(SourceId::Di).await.unwrap().unwrap();
        assert_eq!(record.articles_count, 2);
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        storage.save_articles(vec![article("https://x/1", 1)], SourceId::Di).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("di_news_data.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["source"], "di");
        assert_eq!(json["total_articles"], 1);
        assert!(json["last_scrape"].is_string());
        assert_eq!(json["articles"][0]["url"], "https://x/1");
    }

    #[tokio::test]
    async fn test_scrape_log_is_capped_on_disk() {
        use crate::backends::memory::MAX_SCRAPE_RECORDS;

        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        for _ in 0..MAX_SCRAPE_RECORDS + 3 {
            storage.save_articles(Vec::new(), SourceId::Di).await.unwrap();
        }

        let raw = std::fs::read_to_string(storage.file_for(SourceId::Di)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["scrapes"].as_array().unwrap().len(), MAX_SCRAPE_RECORDS);
    }

    #[tokio::test]
    async fn test_corrupted_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("di_news_data.json"), "{not json").unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();

        assert!(storage.known_urls(SourceId::Di).await.unwrap().is_empty());
        let saved = storage.save_articles(vec![article("https://x/1", 1)], SourceId::Di).await.unwrap();
        assert_eq!(saved, 1);
        assert_eq!(storage.query_articles(&ArticleQuery::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_clear_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).await.unwrap();
        storage.save_articles(vec![article("https://x/1", 1)], SourceId::Di).await.unwrap();
        storage.clear().await.unwrap();
        assert!(!storage.file_for(SourceId::Di).exists());
        assert_eq!(storage.query_articles(&ArticleQuery::default()).await.unwrap().total, 0);
    }
}
