use std::sync::Arc;

use pn_core::config::TranslationSettings;
use pn_core::{Error, Result, Translator};
use tracing::info;

pub mod google;
pub mod passthrough;

pub use google::GoogleTranslator;
pub use passthrough::PassthroughTranslator;

/// Builds the translator named on the command line or in settings.
pub fn create_translator(name: &str, settings: &TranslationSettings) -> Result<Arc<dyn Translator>> {
    let translator: Arc<dyn Translator> = match name.to_lowercase().as_str() {
        "google" => Arc::new(GoogleTranslator::new(&settings.endpoint)?),
        "none" | "passthrough" => Arc::new(PassthroughTranslator),
        other => {
            return Err(Error::Config(format!(
                "Unknown translator: {} (expected google or none)",
                other
            )))
        }
    };
    info!(translator = translator.name(), "Translator initialized");
    Ok(translator)
}
