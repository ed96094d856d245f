use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate};
use pn_core::config::ScrapingSettings;
use pn_core::{Article, ArticleStorage, Error, Result, ScrapeProgress, ScrapeStatus, SourceId};
use pn_progress::{ProgressHub, ProgressStream};
use pn_translation::TranslationCache;
use tracing::{debug, info};

use crate::fetcher::Fetcher;
use crate::gate::filter_new;
use crate::logging::Logger;
use crate::scrapers::{Scraper, ScraperRegistry};

/// Builds the fetcher used for one source during one run.
pub type FetcherFactory = Arc<dyn Fn(SourceId) -> Result<Fetcher> + Send + Sync>;

const STOPPED_MESSAGE: &str = "Scraping stopped by user";

/// Which sources a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelection {
    #[default]
    All,
    /// Keys or CLI names, e.g. `["di", "npn"]`.
    Named(Vec<String>),
}

impl SourceSelection {
    pub fn single(name: impl Into<String>) -> Self {
        SourceSelection::Named(vec![name.into()])
    }

    /// Adapters to run, in declared source order. Any unknown name fails the whole selection.
    pub fn resolve(&self, registry: &ScraperRegistry) -> Result<Vec<Arc<dyn Scraper>>> {
        match self {
            SourceSelection::All => Ok(registry.iter().cloned().collect()),
            SourceSelection::Named(names) => {
                let mut wanted = HashSet::new();
                for name in names {
                    let scraper = registry
                        .find(name)
                        .ok_or_else(|| Error::UnknownSource(name.clone()))?;
                    wanted.insert(scraper.source());
                }
                Ok(registry
                    .iter()
                    .filter(|s| wanted.contains(&s.source()))
                    .cloned()
                    .collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run was spawned in the background.
    Started,
    /// The run finished with this final snapshot.
    Completed(ScrapeProgress),
    /// Another run is active; nothing was changed.
    Busy,
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives scrape runs: one source at a time, in declared order, publishing a
/// progress snapshot before and after each source.
///
/// Only one run is active at a time. `stop()` is cooperative: the source in
/// flight finishes and the loop exits at the next source boundary.
pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    translations: Arc<TranslationCache>,
    registry: ScraperRegistry,
    settings: ScrapingSettings,
    fetchers: FetcherFactory,
    hub: ProgressHub,
    running: AtomicBool,
    stop_requested: AtomicBool,
    state: Mutex<ScrapeProgress>,
    logger: Logger,
}

impl ScraperManager {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        translations: Arc<TranslationCache>,
        settings: ScrapingSettings,
    ) -> Self {
        let fetcher_settings = settings.clone();
        let fetchers: FetcherFactory =
            Arc::new(move |_: SourceId| Fetcher::from_settings(&fetcher_settings));
        Self {
            storage,
            translations,
            registry: ScraperRegistry::default(),
            settings,
            fetchers,
            hub: ProgressHub::new(),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            state: Mutex::new(ScrapeProgress::default()),
            logger: Logger::new().with_prefix("Scrape"),
        }
    }

    pub fn with_registry(mut self, registry: ScraperRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_fetcher_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(SourceId) -> Result<Fetcher> + Send + Sync + 'static,
    {
        self.fetchers = Arc::new(factory);
        self
    }

    pub fn registry(&self) -> &ScraperRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        &self.storage
    }

    pub fn translations(&self) -> &Arc<TranslationCache> {
        &self.translations
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.hub
    }

    pub fn progress(&self) -> ScrapeProgress {
        self.hub.latest()
    }

    pub fn subscribe(&self) -> ProgressStream {
        self.hub.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn scrape_all(&self) -> RunOutcome {
        self.scrape(SourceSelection::All).await
    }

    /// Runs to completion on the current task.
    pub async fn scrape(&self, selection: SourceSelection) -> RunOutcome {
        if !self.try_begin() {
            self.logger.warn("Scraping already in progress");
            return RunOutcome::Busy;
        }
        let _guard = RunGuard(&self.running);
        RunOutcome::Completed(self.run(selection).await)
    }

    /// Spawns the run and returns immediately.
    pub fn start(self: &Arc<Self>, selection: SourceSelection) -> RunOutcome {
        if !self.try_begin() {
            self.logger.warn("Scraping already in progress");
            return RunOutcome::Busy;
        }
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = RunGuard(&manager.running);
            manager.run(selection).await;
        });
        RunOutcome::Started
    }

    /// Requests a stop. Returns whether a run was active.
    pub fn stop(&self) -> bool {
        self.stop_requested.store(true, Ordering::SeqCst);
        let active = self.is_running();
        self.publish(|p| {
            p.status = ScrapeStatus::Stopped;
            p.message = STOPPED_MESSAGE.to_string();
        });
        self.logger.info(if active {
            "Stop requested, finishing current source"
        } else {
            "Stop requested while idle"
        });
        active
    }

    /// Scrapes one source outside of the progress machinery and returns the
    /// articles it saved.
    pub async fn scrape_source(&self, name: &str) -> Result<Vec<Article>> {
        let scraper = self
            .registry
            .find(name)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))?;
        if !self.try_begin() {
            return Err(Error::Busy);
        }
        let _guard = RunGuard(&self.running);
        let logger = self.logger.clone().with_prefix(scraper.source().name());
        self.scrape_one(scraper.as_ref(), today(), &logger).await
    }

    fn try_begin(&self) -> bool {
        let acquired = self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if acquired {
            self.stop_requested.store(false, Ordering::SeqCst);
        }
        acquired
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Applies `update` to the current state and publishes the result. Once a
    /// stop is requested a scraping status is reported as stopped.
    fn publish<F>(&self, update: F) -> ScrapeProgress
    where
        F: FnOnce(&mut ScrapeProgress),
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut state);
        if self.stop_requested() && state.status == ScrapeStatus::Scraping {
            state.status = ScrapeStatus::Stopped;
        }
        let snapshot = state.clone();
        self.hub.publish(snapshot.clone());
        snapshot
    }

    async fn run(&self, selection: SourceSelection) -> ScrapeProgress {
        let resolved = selection.resolve(&self.registry);
        let total_sources = resolved.as_ref().map_or(0, Vec::len);
        self.publish(|p| {
            *p = ScrapeProgress {
                status: ScrapeStatus::Scraping,
                total_sources,
                message: "Starting scrape...".to_string(),
                ..ScrapeProgress::default()
            };
        });

        let scrapers = match resolved {
            Ok(scrapers) => scrapers,
            Err(e) => {
                self.logger.error(&format!("Could not start: {}", e));
                return self.publish(|p| {
                    p.status = ScrapeStatus::Error;
                    p.current_source = None;
                    p.message = format!("Error: {}", e);
                });
            }
        };
        info!(sources = scrapers.len(), "Scrape run started");

        let today = today();
        let mut total = 0;
        for (index, scraper) in scrapers.iter().enumerate() {
            if self.stop_requested() {
                break;
            }
            let name = scraper.source().name();
            let logger = self.logger.clone().with_prefix(name);
            self.publish(|p| {
                p.current_source = Some(name.to_string());
                p.current_source_index = index + 1;
                p.message = format!("Checking {} for new articles...", name);
            });

            let (entry, message) = match self.scrape_one(scraper.as_ref(), today, &logger).await {
                Ok(saved) => {
                    total += saved.len();
                    logger.info(&format!("{} new articles", saved.len()));
                    (name.to_string(), format!("{}: {} new articles", name, saved.len()))
                }
                Err(e) => {
                    logger.error(&format!("Failed: {}", e));
                    let entry = format!("{} (Error)", name);
                    (entry.clone(), entry)
                }
            };
            self.publish(|p| {
                p.sources_completed.push(entry);
                p.articles_scraped = total;
                p.message = message;
            });
        }

        let snapshot = if self.stop_requested() {
            self.publish(|p| {
                p.status = ScrapeStatus::Stopped;
                p.current_source = None;
                p.articles_scraped = total;
                p.message = STOPPED_MESSAGE.to_string();
            })
        } else {
            self.publish(|p| {
                p.status = ScrapeStatus::Completed;
                p.current_source = None;
                p.articles_scraped = total;
                p.message = format!("Check completed! Found {} new articles", total);
            })
        };
        info!(status = %snapshot.status, articles = total, "Scrape run finished");
        snapshot
    }

    /// known URLs, adapter, gate, translation, persistence.
    async fn scrape_one(
        &self,
        scraper: &dyn Scraper,
        today: NaiveDate,
        logger: &Logger,
    ) -> Result<Vec<Article>> {
        let source = scraper.source();
        let fetcher = (self.fetchers)(source)?;
        let known = self.storage.known_urls(source).await?;

        let candidates = scraper
            .fetch_and_extract(&fetcher, today)
            .await
            .into_iter()
            .map(|item| Article::from_raw(item, source, today))
            .collect();
        let mut fresh = filter_new(candidates, &known);
        logger.debug(&format!("{} candidates after dedup", fresh.len()));

        if source.requires_translation() {
            for article in fresh.iter_mut() {
                let translated = self.translations.translate(&article.title, source).await;
                if translated != article.title {
                    article.original_title = Some(std::mem::replace(&mut article.title, translated));
                }
            }
        }

        if !self.settings.persist_fallback {
            let before = fresh.len();
            fresh.retain(|a| !a.synthetic);
            if fresh.len() < before {
                debug!(source = %source, dropped = before - fresh.len(), "Not persisting sample articles");
            }
        }

        if fresh.is_empty() {
            return Ok(fresh);
        }
        let saved = self.storage.save_articles(fresh.clone(), source).await?;
        debug!(source = %source, saved, "Saved articles");
        Ok(fresh)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
