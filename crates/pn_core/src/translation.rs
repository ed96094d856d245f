use std::fmt;

use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait Translator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Translate `text` from `source_lang` (or "auto") into `target_lang`
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}
