use std::cmp::Reverse;

use pn_core::{Article, ArticlePage, ArticleQuery};

/// Applies source filter, title search, newest-first ordering and pagination.
///
/// `max_page_size` caps whatever page size the caller asked for. Pages are
/// 1-based and clamped to `1..=total_pages`; an empty result still reports one page.
pub fn run_query<'a, I>(articles: I, query: &ArticleQuery, max_page_size: usize) -> ArticlePage
where
    I: IntoIterator<Item = &'a Article>,
{
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matching: Vec<&Article> = articles
        .into_iter()
        .filter(|a| query.source.matches(a.source))
        .filter(|a| match &needle {
            Some(needle) => title_matches(a, needle),
            None => true,
        })
        .collect();

    matching.sort_by_key(|a| (Reverse(a.date), Reverse(a.scraped_at)));

    let page_size = query.page_size.clamp(1, max_page_size.max(1));
    let total = matching.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let articles = matching
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    ArticlePage {
        articles,
        total,
        page,
        total_pages,
    }
}

fn title_matches(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle)
        || article
            .original_title
            .as_ref()
            .is_some_and(|t| t.to_lowercase().contains(needle))
}
