use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use pn_core::config::TranslationSettings;
use pn_core::{Article, ArticlePage, ArticleStorage, FetchError, ScrapeProgress, ScrapeStatus, Settings, SourceId};
use pn_scrappers::{Fetcher, RunOutcome, ScraperManager, SourceSelection, Transport};
use pn_storage::MemoryStorage;
use pn_translation::{PassthroughTranslator, TranslationCache};
use pn_web::handlers::{ControlResponse, ErrorResponse};
use pn_web::{create_app, AppState};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt; // for oneshot

/// Never answers, so a started run stays in flight.
struct Hanging;

#[async_trait]
impl Transport for Hanging {
    async fn get(&self, _url: &str) -> Result<String, FetchError> {
        std::future::pending().await
    }
}

fn test_manager(storage: Arc<MemoryStorage>) -> Arc<ScraperManager> {
    let translations = Arc::new(TranslationCache::new(
        Arc::new(PassthroughTranslator),
        &TranslationSettings::default(),
    ));
    let settings = Settings::default();
    let scraping = settings.scraping.clone();
    let manager = ScraperManager::new(storage, translations, settings.scraping)
        .with_fetcher_factory(move |_| Ok(Fetcher::new(Arc::new(Hanging), None, &scraping)));
    Arc::new(manager)
}

fn app_for(manager: Arc<ScraperManager>) -> Router {
    create_app(AppState::new(manager, Settings::default()))
}

fn article(title: &str, url: &str, source: SourceId, day: u32) -> Article {
    Article {
        title: title.to_string(),
        original_title: None,
        url: url.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
        source,
        scraped_at: None,
        synthetic: false,
    }
}

async fn seeded_storage() -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .save_articles(
            vec![
                article("Nytt kontor i Malmö", "https://www.di.se/a", SourceId::Di, 14),
                article("Lager säljs", "https://www.di.se/b", SourceId::Di, 16),
            ],
            SourceId::Di,
        )
        .await
        .unwrap();
    storage
        .save_articles(
            vec![article("Office deal in Oslo", "https://news.cision.com/c", SourceId::Cision, 15)],
            SourceId::Cision,
        )
        .await
        .unwrap();
    storage
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn json<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_list_articles() {
    let app = app_for(test_manager(seeded_storage().await));

    let (status, body) = send(app.clone(), "GET", "/api/articles").await;
    assert_eq!(status, StatusCode::OK);
    let page: ArticlePage = json(&body);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);
    let titles: Vec<_> = page.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Lager säljs", "Office deal in Oslo", "Nytt kontor i Malmö"]);

    let (_, body) = send(app.clone(), "GET", "/api/articles?source=di&search=KONTOR").await;
    let page: ArticlePage = json(&body);
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].url, "https://www.di.se/a");

    let (_, body) = send(app, "GET", "/api/articles?page=2&page_size=2").await;
    let page: ArticlePage = json(&body);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.articles.len(), 1);
}

#[tokio::test]
async fn test_list_articles_rejects_unknown_source() {
    let app = app_for(test_manager(Arc::new(MemoryStorage::new())));
    let (status, body) = send(app, "GET", "/api/articles?source=svd").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json(&body);
    assert!(error.error.contains("svd"));
}

#[tokio::test]
async fn test_list_sources() {
    let app = app_for(test_manager(Arc::new(MemoryStorage::new())));
    let (status, body) = send(app, "GET", "/api/sources").await;
    assert_eq!(status, StatusCode::OK);

    let sources: Vec<Value> = json(&body);
    let keys: Vec<_> = sources.iter().map(|s| s["key"].as_str().unwrap()).collect();
    assert_eq!(
        keys,
        vec!["fastighetsvarlden", "cision", "lokalguiden", "di", "fastighetsnytt", "nordicpropertynews"]
    );
    assert_eq!(sources[3]["requiresTranslation"], Value::Bool(true));
}

#[tokio::test]
async fn test_last_scrape() {
    let app = app_for(test_manager(seeded_storage().await));

    let (status, body) = send(app.clone(), "GET", "/api/sources/di/last-scrape").await;
    assert_eq!(status, StatusCode::OK);
    let record: Value = json(&body);
    assert_eq!(record["articlesCount"], 2);
    assert_eq!(record["status"], "success");

    let (status, body) = send(app.clone(), "GET", "/api/sources/lokalguiden/last-scrape").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<Value>(&body), Value::Null);

    let (status, _) = send(app, "GET", "/api/sources/svd/last-scrape").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_progress_starts_idle() {
    let app = app_for(test_manager(Arc::new(MemoryStorage::new())));
    let (status, body) = send(app, "GET", "/api/scrape/progress").await;
    assert_eq!(status, StatusCode::OK);
    let progress: ScrapeProgress = json(&body);
    assert_eq!(progress.status, ScrapeStatus::Idle);
    assert_eq!(progress.message, "Ready");
}

#[tokio::test]
async fn test_start_scrape_and_busy() {
    let manager = test_manager(Arc::new(MemoryStorage::new()));
    let app = app_for(manager.clone());

    let (status, body) = send(app.clone(), "POST", "/api/scrape?source=di").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let started: ControlResponse = json(&body);
    assert!(started.success);
    assert!(manager.is_running());

    let (status, body) = send(app.clone(), "POST", "/api/scrape").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = json(&body);
    assert_eq!(error.error, "Scraping already in progress");
    assert_eq!(manager.start(SourceSelection::All), RunOutcome::Busy);

    let (status, body) = send(app, "POST", "/api/scrape/stop").await;
    assert_eq!(status, StatusCode::OK);
    let stopped: ControlResponse = json(&body);
    assert!(stopped.success);
    assert_eq!(manager.progress().status, ScrapeStatus::Stopped);
}

#[tokio::test]
async fn test_start_scrape_unknown_source() {
    let manager = test_manager(Arc::new(MemoryStorage::new()));
    let (status, _) = send(app_for(manager.clone()), "POST", "/api/scrape?source=svd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!manager.is_running());
}

#[tokio::test]
async fn test_stop_when_idle() {
    let app = app_for(test_manager(Arc::new(MemoryStorage::new())));
    let (status, body) = send(app, "POST", "/api/scrape/stop").await;
    assert_eq!(status, StatusCode::OK);
    let response: ControlResponse = json(&body);
    assert!(!response.success);
    assert_eq!(response.message, "No scraping in progress");
}
