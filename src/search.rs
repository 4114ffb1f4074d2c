//! Substring search across page texts.
//!
//! Matches are produced page by page in ascending order and, within a page,
//! by ascending character offset.

use schemars::JsonSchema;
use serde::Serialize;

use crate::config::Config;
use crate::document::PdfDocument;
use crate::error::Result;

/// Search limits and matching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Characters of context around a match (split evenly on both sides).
    pub context_chars: usize,
    /// Maximum matches in total.
    pub max_results: usize,
    /// Maximum matches on one page.
    pub max_per_page: usize,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SearchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            context_chars: config.search_context_chars,
            max_results: config.max_search_results,
            max_per_page: config.max_results_per_page,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// A single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SearchMatch {
    /// Page containing the match (1-indexed).
    pub page_number: u32,
    /// Character offset of the match within the page text.
    pub offset: usize,
    /// Whitespace-normalized text around the match.
    pub context: String,
}

/// Outcome of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub matches: Vec<SearchMatch>,
    /// Whether scanning stopped because `max_results` was reached. Later
    /// pages were not searched.
    pub truncated: bool,
}

/// Search every page of `doc` for `query`.
///
/// Page text is extracted lazily, so pages after the total limit is reached
/// are never loaded.
pub fn search_document(
    doc: &PdfDocument,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchOutcome> {
    try_search_pages(doc.all_pages_text(), query, options)
}

/// Search `(page_number, text)` pairs for `query`.
///
/// Pages are visited in the order given; callers pass them ascending. An
/// empty query yields no matches.
pub fn search_pages<I, S>(pages: I, query: &str, options: &SearchOptions) -> SearchOutcome
where
    I: IntoIterator<Item = (u32, S)>,
    S: AsRef<str>,
{
    let pages = pages.into_iter().map(|(page, text)| (page, Ok(text)));
    try_search_pages(pages, query, options).unwrap_or_default()
}

/// Like [`search_pages`], for page texts that may fail to load.
///
/// Pages are pulled one at a time; the first failing page aborts the search,
/// and nothing is pulled once `max_results` matches have been collected.
pub fn try_search_pages<I, S>(
    pages: I,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchOutcome>
where
    I: IntoIterator<Item = (u32, Result<S>)>,
    S: AsRef<str>,
{
    let mut outcome = SearchOutcome::default();
    if query.is_empty() || options.max_results == 0 {
        return Ok(outcome);
    }

    let needle: Vec<char> = query.chars().map(|c| fold(c, options.case_sensitive)).collect();

    for (page_number, text) in pages {
        let text: Vec<char> = text?.as_ref().chars().collect();
        let haystack: Vec<char> = text
            .iter()
            .map(|&c| fold(c, options.case_sensitive))
            .collect();

        for offset in find_all(&haystack, &needle).take(options.max_per_page) {
            outcome.matches.push(SearchMatch {
                page_number,
                offset,
                context: snippet(&text, offset, needle.len(), options.context_chars),
            });
            if outcome.matches.len() >= options.max_results {
                outcome.truncated = true;
                return Ok(outcome);
            }
        }
    }

    Ok(outcome)
}

/// Case folding that keeps a one-to-one mapping between characters, so
/// offsets in the folded text are offsets in the original.
fn fold(c: char, case_sensitive: bool) -> char {
    if case_sensitive {
        return c;
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Start offsets of every (possibly overlapping) occurrence of `needle`.
fn find_all<'a>(haystack: &'a [char], needle: &'a [char]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, window)| *window == needle)
        .map(|(offset, _)| offset)
}

fn snippet(text: &[char], offset: usize, len: usize, context_chars: usize) -> String {
    let half = context_chars / 2;
    let start = offset.saturating_sub(half);
    let end = (offset + len + half).min(text.len());
    let raw: String = text[start..end].iter().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavigatorError;
    use std::cell::Cell;

    fn options() -> SearchOptions {
        SearchOptions {
            context_chars: 20,
            max_results: 10,
            max_per_page: 3,
            case_sensitive: false,
        }
    }

    #[test]
    fn test_orders_by_page_then_offset() {
        let pages = vec![
            (1, "nothing here"),
            (2, "apple pie and apple jam"),
            (3, "an apple"),
        ];
        let outcome = search_pages(pages, "apple", &options());

        let positions: Vec<(u32, usize)> = outcome
            .matches
            .iter()
            .map(|m| (m.page_number, m.offset))
            .collect();
        assert_eq!(positions, vec![(2, 0), (2, 14), (3, 3)]);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let outcome = search_pages(vec![(1, "The QUERY term")], "query", &options());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].offset, 4);
    }

    #[test]
    fn test_case_sensitive() {
        let opts = options().case_sensitive(true);
        let outcome = search_pages(vec![(1, "The QUERY term")], "query", &opts);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_absent_query_is_empty() {
        let outcome = search_pages(vec![(1, "some text")], "missing", &options());
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_empty_query_is_empty() {
        let outcome = search_pages(vec![(1, "some text")], "", &options());
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_offsets_are_characters() {
        let outcome = search_pages(vec![(1, "café crème brûlée")], "BRÛLÉE", &options());
        assert_eq!(outcome.matches[0].offset, 11);
    }

    #[test]
    fn test_context_is_normalized() {
        let opts = SearchOptions {
            context_chars: 10,
            ..options()
        };
        let outcome = search_pages(vec![(1, "alpha   beta\n\ngamma delta")], "gamma", &opts);
        assert_eq!(outcome.matches[0].context, "eta gamma delt");
    }

    #[test]
    fn test_per_page_limit() {
        let outcome = search_pages(vec![(1, "a a a a a"), (2, "a")], "a", &options());
        let pages: Vec<u32> = outcome.matches.iter().map(|m| m.page_number).collect();
        assert_eq!(pages, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_total_limit_truncates() {
        let opts = SearchOptions {
            max_results: 2,
            ..options()
        };
        let outcome = search_pages(vec![(1, "x"), (2, "x"), (3, "x")], "x", &opts);
        assert_eq!(outcome.matches.len(), 2);
        assert!(outcome.truncated);
    }

    #[test]
    fn test_overlapping_matches() {
        let outcome = search_pages(vec![(1, "aaa")], "aa", &options());
        let offsets: Vec<usize> = outcome.matches.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn test_limit_reached_on_last_match() {
        let opts = SearchOptions {
            max_results: 2,
            ..options()
        };
        let outcome = search_pages(vec![(1, "x"), (2, "x")], "x", &opts);
        assert_eq!(outcome.matches.len(), 2);
        assert!(outcome.truncated);
    }

    #[test]
    fn test_pages_after_limit_are_not_loaded() {
        let loaded = Cell::new(0);
        let pages = (1..=100u32).map(|page| {
            loaded.set(loaded.get() + 1);
            (page, Ok::<_, NavigatorError>("x marks x"))
        });
        let opts = SearchOptions {
            max_results: 4,
            ..options()
        };

        let outcome = try_search_pages(pages, "x", &opts).unwrap();
        assert_eq!(outcome.matches.len(), 4);
        assert!(outcome.truncated);
        assert_eq!(loaded.get(), 2);
    }

    #[test]
    fn test_page_error_before_limit_propagates() {
        let pages = vec![
            (1, Ok("nothing")),
            (2, Err(NavigatorError::internal("extraction failed"))),
        ];
        assert!(try_search_pages(pages, "x", &options()).is_err());
    }

    #[test]
    fn test_page_error_after_limit_is_never_reached() {
        let pages = vec![
            (1, Ok("x")),
            (2, Err(NavigatorError::internal("extraction failed"))),
        ];
        let opts = SearchOptions {
            max_results: 1,
            ..options()
        };
        let outcome = try_search_pages(pages, "x", &opts).unwrap();
        assert_eq!(outcome.matches.len(), 1);
    }
}
