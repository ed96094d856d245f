use std::fmt;

use async_trait::async_trait;
use pn_core::{Error, Result, Translator};
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Client for the public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid translation endpoint {}: {}", endpoint, e)))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    fn request_url(&self, text: &str, source_lang: &str, target_lang: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source_lang)
            .append_pair("tl", target_lang)
            .append_pair("dt", "t")
            .append_pair("q", text);
        url
    }
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

/// The payload is `[[["translated", "original", ...], ...], ...]`; long
/// inputs come back split into several segments.
pub(crate) fn parse_response(payload: &Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Translation("Unexpected translation payload".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(Error::Translation("Empty translation".to_string()));
    }
    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google"
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let payload = self
            .client
            .get(self.request_url(text, source_lang, target_lang))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        parse_response(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_core::config::DEFAULT_TRANSLATE_ENDPOINT;
    use serde_json::json;

    #[test]
    fn test_request_url() {
        let translator = GoogleTranslator::new(DEFAULT_TRANSLATE_ENDPOINT).unwrap();
        let url = translator.request_url("Ny utveckling", "auto", "en");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client".to_string(), "gtx".to_string())));
        assert!(pairs.contains(&("sl".to_string(), "auto".to_string())));
        assert!(pairs.contains(&("tl".to_string(), "en".to_string())));
        assert!(pairs.contains(&("q".to_string(), "Ny utveckling".to_string())));
    }

    #[test]
    fn test_parse_response() {
        let payload = json!([[["New development", "Ny utveckling", null, null, 1]], null, "sv"]);
        assert_eq!(parse_response(&payload).unwrap(), "New development");

        let split = json!([[["First. ", "Första. "], ["Second.", "Andra."]], null, "sv"]);
        assert_eq!(parse_response(&split).unwrap(), "First. Second.");
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(parse_response(&json!({"error": "quota"})).is_err());
        assert!(parse_response(&json!([[]])).is_err());
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(GoogleTranslator::new("not a url"), Err(Error::Config(_))));
    }
}
