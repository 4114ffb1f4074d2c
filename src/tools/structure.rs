//! Document-level tools: table of contents, page summaries and metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{PdfDocument, PdfMetadata, TocEntry};
use crate::error::Result;

/// Non-empty lines that make up a page summary.
const SUMMARY_LINES: usize = 3;
/// Maximum summary length in characters.
const SUMMARY_CHARS: usize = 100;

// ============== Get PDF Structure ==============

/// Parameters for getting the document structure.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPdfStructureParams {
    /// Path to the PDF file.
    pub file_path: String,
}

/// Opening lines of a page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PageSummary {
    /// Page number (1-indexed).
    pub page_number: u32,
    pub summary: String,
}

/// Result of getting the document structure.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetPdfStructureResult {
    pub file_name: String,
    pub total_pages: u32,
    /// Flattened table of contents in document order.
    pub toc: Vec<TocEntry>,
    /// Summaries of pages that contain text.
    pub page_summaries: Vec<PageSummary>,
}

/// Get the table of contents and a short summary of every page.
pub fn get_pdf_structure(params: GetPdfStructureParams) -> Result<GetPdfStructureResult> {
    let doc = PdfDocument::open(&params.file_path)?;
    let toc = doc.toc()?;

    let mut page_summaries = Vec::new();
    for (page_number, text) in doc.all_pages_text() {
        if let Some(summary) = page_summary(&text?) {
            page_summaries.push(PageSummary {
                page_number,
                summary,
            });
        }
    }

    Ok(GetPdfStructureResult {
        file_name: doc.file_name(),
        total_pages: doc.page_count(),
        toc,
        page_summaries,
    })
}

/// First few non-empty lines joined by spaces, capped in length.
fn page_summary(text: &str) -> Option<String> {
    let summary = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(SUMMARY_LINES)
        .collect::<Vec<_>>()
        .join(" ");

    if summary.is_empty() {
        None
    } else {
        Some(summary.chars().take(SUMMARY_CHARS).collect())
    }
}

// ============== Get PDF Info ==============

/// Parameters for getting document information.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPdfInfoParams {
    /// Path to the PDF file.
    pub file_path: String,
}

/// Document information.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetPdfInfoResult {
    pub file_name: String,
    pub page_count: u32,
    #[serde(flatten)]
    pub metadata: PdfMetadata,
}

/// Get metadata and the page count.
pub fn get_pdf_info(params: GetPdfInfoParams) -> Result<GetPdfInfoResult> {
    let doc = PdfDocument::open(&params.file_path)?;

    Ok(GetPdfInfoResult {
        file_name: doc.file_name(),
        page_count: doc.page_count(),
        metadata: doc.metadata(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_summary_takes_first_lines() {
        let text = "\n  Introduction section \n\nThis is the intro\nMore\nIgnored\n";
        assert_eq!(
            page_summary(text).as_deref(),
            Some("Introduction section This is the intro More")
        );
    }

    #[test]
    fn test_page_summary_blank_page() {
        assert_eq!(page_summary("\n \n\t\n"), None);
    }

    #[test]
    fn test_page_summary_is_capped() {
        let text = "x".repeat(250);
        assert_eq!(page_summary(&text).unwrap().chars().count(), SUMMARY_CHARS);
    }
}
