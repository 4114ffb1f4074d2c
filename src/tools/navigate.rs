//! Tools that open a PDF in the external viewer.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{file_name, PdfDocument};
use crate::error::{NavigatorError, Result};
use crate::search::{search_document, SearchMatch};
use crate::state::ServerState;
use crate::viewer::{ViewerCommand, ViewerKind};

/// Fail unless `path` exists and is named like a PDF.
fn validate_pdf_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(NavigatorError::FileNotFound(path.display().to_string()));
    }
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(NavigatorError::NotAPdf(path.display().to_string()));
    }
    Ok(())
}

/// Resolve the viewer and start it at `page`.
fn launch_viewer(state: &ServerState, path: &Path, page: u32) -> Result<OpenPdfPageResult> {
    let viewer = state.resolver().resolve(state.launcher())?;
    let absolute = std::fs::canonicalize(path)?;
    let command = viewer.command(&absolute, page);

    tracing::info!(
        viewer = %viewer.kind,
        page,
        program = %command.program,
        "Opening PDF in viewer"
    );
    state.launcher().spawn(&command)?;

    Ok(OpenPdfPageResult {
        file_name: file_name(path),
        page_number: page,
        viewer: viewer.kind,
        page_jump: viewer.kind.supports_page_jump(viewer.platform),
        command,
    })
}

// ============== Open PDF Page ==============

/// Parameters for opening a page in the viewer.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenPdfPageParams {
    /// Path to the PDF file.
    pub file_path: String,
    /// Page to open (1-indexed).
    pub page_number: u32,
}

/// Result of launching the viewer.
#[derive(Debug, Serialize, JsonSchema)]
pub struct OpenPdfPageResult {
    pub file_name: String,
    /// Requested page (1-indexed).
    pub page_number: u32,
    /// Viewer that was started.
    pub viewer: ViewerKind,
    /// False when the viewer cannot be told which page to show.
    pub page_jump: bool,
    /// The command line that was spawned.
    pub command: ViewerCommand,
}

/// Open a PDF in the configured viewer at a given page.
///
/// Returns once the viewer process has been started.
pub fn open_pdf_page(state: &ServerState, params: OpenPdfPageParams) -> Result<OpenPdfPageResult> {
    let path = Path::new(&params.file_path);
    validate_pdf_path(path)?;

    let doc = PdfDocument::open(path)?;
    doc.validate_page(params.page_number)?;
    drop(doc);

    launch_viewer(state, path, params.page_number)
}

// ============== Search And Open ==============

/// Parameters for searching and opening a match.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchAndOpenParams {
    /// Path to the PDF file.
    pub file_path: String,
    /// Text to search for.
    pub query: String,
    /// Which match to open (1-indexed, default 1).
    #[serde(default = "default_result_index")]
    pub result_index: u32,
    /// Match case exactly (default false).
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_result_index() -> u32 {
    1
}

/// Result of searching and opening a match.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchAndOpenResult {
    /// The 1-indexed match that was opened.
    pub result_index: u32,
    pub total_results: usize,
    pub selected_match: SearchMatch,
    pub opened: OpenPdfPageResult,
}

/// Search a PDF and open the viewer at the page of match `result_index`.
pub fn search_and_open(
    state: &ServerState,
    params: SearchAndOpenParams,
) -> Result<SearchAndOpenResult> {
    if params.query.trim().is_empty() {
        return Err(NavigatorError::EmptyQuery);
    }
    let path = Path::new(&params.file_path);
    validate_pdf_path(path)?;

    let options = state.search_options().case_sensitive(params.case_sensitive);
    let outcome = {
        let doc = PdfDocument::open(path)?;
        search_document(&doc, &params.query, &options)?
    };

    if outcome.matches.is_empty() {
        return Err(NavigatorError::NoSearchResults {
            query: params.query,
            file: file_name(path),
        });
    }

    let total_results = outcome.matches.len();
    let selected_match = (params.result_index as usize)
        .checked_sub(1)
        .and_then(|i| outcome.matches.into_iter().nth(i))
        .ok_or_else(|| NavigatorError::ResultIndexOutOfRange {
            index: params.result_index,
            count: total_results,
        })?;

    let opened = launch_viewer(state, path, selected_match.page_number)?;

    Ok(SearchAndOpenResult {
        result_index: params.result_index,
        total_results,
        selected_match,
        opened,
    })
}
