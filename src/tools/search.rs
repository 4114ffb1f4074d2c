//! Full-document text search tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::PdfDocument;
use crate::error::Result;
use crate::search::{search_document, SearchMatch};
use crate::state::ServerState;

// ============== Search PDF Text ==============

/// Parameters for searching a document.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchPdfTextParams {
    /// Path to the PDF file.
    pub file_path: String,
    /// Text to search for.
    pub query: String,
    /// Match case exactly (default false).
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Result of a document search.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchPdfTextResult {
    pub file_name: String,
    pub query: String,
    pub total_results: usize,
    /// Whether the search stopped at `max_search_results`. Matches skipped by
    /// the per-page cap do not count.
    pub truncated: bool,
    /// Matches ordered by page, then by offset within the page.
    pub matches: Vec<SearchMatch>,
}

/// Search every page of a PDF for `query`.
///
/// No matches (or an empty query) is a successful, empty result.
pub fn search_pdf_text(
    state: &ServerState,
    params: SearchPdfTextParams,
) -> Result<SearchPdfTextResult> {
    let doc = PdfDocument::open(&params.file_path)?;

    let outcome = if params.query.is_empty() {
        Default::default()
    } else {
        let options = state.search_options().case_sensitive(params.case_sensitive);
        search_document(&doc, &params.query, &options)?
    };

    tracing::debug!(
        file = %params.file_path,
        query = %params.query,
        results = outcome.matches.len(),
        "Searched PDF"
    );

    Ok(SearchPdfTextResult {
        file_name: doc.file_name(),
        query: params.query,
        total_results: outcome.matches.len(),
        truncated: outcome.truncated,
        matches: outcome.matches,
    })
}
