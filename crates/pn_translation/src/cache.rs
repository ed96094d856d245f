//! Memoizing, rate-limited front for a [`Translator`].
//!
//! `translate` never fails. English-native sources and titles that already
//! look English pass through untouched, cached results are reused, and a
//! failing service degrades to a canned phrase or the original text.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pn_core::config::TranslationSettings;
use pn_core::{SourceId, Translator};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::fallback::fallback_translation;
use crate::heuristic::is_probably_english;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    source_lang: String,
    target_lang: String,
}

pub struct TranslationCache {
    translator: Arc<dyn Translator>,
    source_lang: String,
    target_lang: String,
    min_interval: Duration,
    entries: Mutex<HashMap<CacheKey, String>>,
    last_call: Mutex<Option<Instant>>,
}

impl TranslationCache {
    pub fn new(translator: Arc<dyn Translator>, settings: &TranslationSettings) -> Self {
        Self {
            translator,
            source_lang: settings.source_language.clone(),
            target_lang: settings.target_language.clone(),
            min_interval: settings.rate_limit_delay(),
            entries: Mutex::new(HashMap::new()),
            last_call: Mutex::new(None),
        }
    }

    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    /// Title as it should be displayed for `source`.
    pub async fn translate(&self, title: &str, source: SourceId) -> String {
        if !source.requires_translation() {
            return title.to_string();
        }
        self.translate_text(title).await
    }

    pub async fn translate_text(&self, text: &str) -> String {
        if text.trim().is_empty() || is_probably_english(text) {
            return text.to_string();
        }

        let key = CacheKey {
            text: text.to_string(),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
        };
        if let Some(hit) = self.entries.lock().await.get(&key) {
            debug!(text, "Translation cache hit");
            return hit.clone();
        }

        self.wait_turn().await;
        match self
            .translator
            .translate(text, &self.source_lang, &self.target_lang)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => {
                debug!(text, translated = %translated, translator = self.translator.name(), "Translated");
                self.entries.lock().await.insert(key, translated.clone());
                translated
            }
            Ok(_) => {
                warn!(text, "Translator returned an empty result, using fallback");
                fallback_translation(text)
            }
            Err(e) => {
                warn!(text, error = %e, "Translation failed, using fallback");
                fallback_translation(text)
            }
        }
    }

    /// Spaces calls to the service at least `min_interval` apart.
    async fn wait_turn(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
