use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pn_core::{
    ArticlePage, ArticleQuery, Error, ScrapeProgress, ScrapeRecord, SourceConfig, SourceFilter,
    SourceId,
};
use pn_scrappers::{RunOutcome, SourceSelection};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::UnknownSource(_) => ApiError::NotFound(e.to_string()),
            Error::Busy => ApiError::Conflict(e.to_string()),
            Error::Config(_) | Error::Parse(_) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// `{success, message}` body of the scrape control endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesParams {
    pub source: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub search: Option<String>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticlesParams>,
) -> Result<Json<ArticlePage>, ApiError> {
    let source = params
        .source
        .as_deref()
        .unwrap_or("all")
        .parse::<SourceFilter>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let query = ArticleQuery {
        source,
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(state.settings.ui.articles_per_page),
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    Ok(Json(state.storage().query_articles(&query).await?))
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceConfig>> {
    let sources = state
        .manager
        .registry()
        .sources()
        .into_iter()
        .map(|s| s.config())
        .collect();
    Json(sources)
}

pub async fn last_scrape(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Option<ScrapeRecord>>, ApiError> {
    let source: SourceId = key.parse()?;
    Ok(Json(state.storage().last_scrape(source).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub source: Option<String>,
}

pub async fn start_scrape(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> Result<Response, ApiError> {
    let selection = match params.source.as_deref().map(str::trim) {
        None | Some("") | Some("all") => SourceSelection::All,
        Some(name) => SourceSelection::single(name),
    };
    selection.resolve(state.manager.registry())?;

    match state.manager.start(selection) {
        RunOutcome::Busy => Err(ApiError::Conflict(Error::Busy.to_string())),
        _ => {
            info!("Scrape started from API");
            let body = ControlResponse {
                success: true,
                message: "Checking for new articles...".to_string(),
            };
            Ok((StatusCode::ACCEPTED, Json(body)).into_response())
        }
    }
}

pub async fn stop_scrape(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let response = if state.manager.stop() {
        ControlResponse {
            success: true,
            message: "Scraping stopped".to_string(),
        }
    } else {
        ControlResponse {
            success: false,
            message: "No scraping in progress".to_string(),
        }
    };
    Json(response)
}

pub async fn scrape_progress(State(state): State<Arc<AppState>>) -> Json<ScrapeProgress> {
    Json(state.manager.progress())
}
