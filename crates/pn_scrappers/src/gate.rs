use std::collections::HashSet;

use pn_core::Article;

/// Keeps the candidates whose URL is not already stored, in their original
/// order. A URL repeated inside the batch is kept once.
pub fn filter_new(candidates: Vec<Article>, known: &HashSet<String>) -> Vec<Article> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|a| !known.contains(&a.url) && seen.insert(a.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pn_core::{RawItem, SourceId};

    fn article(title: &str, url: &str) -> Article {
        let today = NaiveDate::from_ymd_opt(2025, 9, 16).unwrap();
        Article::from_raw(RawItem::new(title, url, None), SourceId::Di, today)
    }

    #[test]
    fn test_drops_known_urls_and_keeps_order() {
        let known: HashSet<String> = ["https://x/2".to_string()].into();
        let candidates = vec![
            article("c", "https://x/3"),
            article("b", "https://x/2"),
            article("a", "https://x/1"),
        ];
        let titles: Vec<_> = filter_new(candidates, &known).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[test]
    fn test_collapses_repeats_within_batch() {
        let candidates = vec![
            article("first", "https://x/1"),
            article("second", "https://x/1"),
        ];
        let kept = filter_new(candidates, &HashSet::new());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "first");
    }

    #[test]
    fn test_everything_known() {
        let known: HashSet<String> = ["https://x/1".to_string()].into();
        assert!(filter_new(vec![article("a", "https://x/1")], &known).is_empty());
        assert!(filter_new(Vec::new(), &known).is_empty());
    }
}
