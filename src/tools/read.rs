//! Text extraction tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::PdfDocument;
use crate::error::Result;

/// Text of a single page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PageText {
    /// Page number (1-indexed).
    pub page_number: u32,
    /// Extracted plain text; empty if the page has none.
    pub text: String,
}

// ============== Read PDF Text ==============

/// Parameters for reading a range of pages.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadPdfTextParams {
    /// Path to the PDF file.
    pub file_path: String,
    /// First page to read (1-indexed, default 1).
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Last page to read (1-indexed, inclusive). Defaults to the last page.
    #[serde(default)]
    pub end_page: Option<u32>,
}

fn default_start_page() -> u32 {
    1
}

/// Result of reading a page range.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ReadPdfTextResult {
    pub file_name: String,
    pub total_pages: u32,
    pub start_page: u32,
    pub end_page: u32,
    /// One entry per requested page, in ascending order.
    pub pages: Vec<PageText>,
}

/// Read the text of pages `start_page..=end_page`.
pub fn read_pdf_text(params: ReadPdfTextParams) -> Result<ReadPdfTextResult> {
    let doc = PdfDocument::open(&params.file_path)?;
    let range = doc.validate_range(params.start_page, params.end_page)?;

    let pages = range
        .clone()
        .map(|page_number| {
            Ok(PageText {
                page_number,
                text: doc.page_text(page_number)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReadPdfTextResult {
        file_name: doc.file_name(),
        total_pages: doc.page_count(),
        start_page: *range.start(),
        end_page: *range.end(),
        pages,
    })
}

// ============== Read PDF Page ==============

/// Parameters for reading one page.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadPdfPageParams {
    /// Path to the PDF file.
    pub file_path: String,
    /// Page to read (1-indexed).
    pub page_number: u32,
}

/// Result of reading one page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ReadPdfPageResult {
    pub file_name: String,
    pub total_pages: u32,
    pub page_number: u32,
    pub text: String,
}

/// Read the text of a single page.
pub fn read_pdf_page(params: ReadPdfPageParams) -> Result<ReadPdfPageResult> {
    let doc = PdfDocument::open(&params.file_path)?;
    let text = doc.page_text(params.page_number)?;

    Ok(ReadPdfPageResult {
        file_name: doc.file_name(),
        total_pages: doc.page_count(),
        page_number: params.page_number,
        text,
    })
}
