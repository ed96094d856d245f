use scraper::{Html, Selector};
use serde_json::Value;

/// Parses the `__NEXT_DATA__` JSON blob that Next.js pages embed.
pub fn extract_next_data(document: &Html) -> Option<Value> {
    let selector = Selector::parse(r#"script#__NEXT_DATA__[type="application/json"]"#).ok()?;
    let script = document.select(&selector).next()?;
    serde_json::from_str(script.text().collect::<String>().trim()).ok()
}

/// Article listings in a Next.js page: every `props.containers[]` entry with
/// `type == "articlelisting"`, flattened to its `article` objects.
pub fn article_listings(data: &Value) -> Vec<&Value> {
    let containers = data
        .pointer("/props/containers")
        .or_else(|| data.pointer("/props/pageProps/containers"))
        .and_then(Value::as_array);

    containers
        .into_iter()
        .flatten()
        .filter(|c| c.get("type").and_then(Value::as_str) == Some("articlelisting"))
        .filter_map(|c| c.get("article"))
        .collect()
}
