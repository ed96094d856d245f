pub mod cache;
pub mod fallback;
pub mod heuristic;
pub mod services;

pub use cache::TranslationCache;
pub use heuristic::is_probably_english;
pub use services::{create_translator, GoogleTranslator, PassthroughTranslator};

pub mod prelude {
    pub use super::services::create_translator;
    pub use super::TranslationCache;
    pub use pn_core::{Error, Result, Translator};
}
