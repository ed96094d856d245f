use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    static ref ENGLISH_WORDS: HashSet<&'static str> = [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was",
        "one", "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new",
        "now", "old", "see", "two", "who", "boy", "did", "man", "oil", "sit", "yes", "yet",
    ]
    .into_iter()
    .collect();
}

/// Share of common English words above which a title is left untranslated.
const ENGLISH_RATIO: f64 = 0.3;

/// Cheap guess at whether `text` is already English.
pub fn is_probably_english(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }
    let hits = words.iter().filter(|w| ENGLISH_WORDS.contains(*w)).count();
    hits as f64 > ENGLISH_RATIO * words.len() as f64
}
