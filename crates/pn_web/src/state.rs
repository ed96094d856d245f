use std::sync::Arc;

use pn_core::{ArticleStorage, Settings};
use pn_scrappers::ScraperManager;

pub struct AppState {
    pub manager: Arc<ScraperManager>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>, settings: Settings) -> Self {
        Self { manager, settings }
    }

    pub fn storage(&self) -> &Arc<dyn ArticleStorage> {
        self.manager.storage()
    }
}
