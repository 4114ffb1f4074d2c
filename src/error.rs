//! Error types for the PDF navigator MCP server.

use thiserror::Error;

/// Errors that can occur while serving a tool call.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// The given path does not exist.
    #[error("PDF file not found: {0}")]
    FileNotFound(String),

    /// The path exists but does not carry a `.pdf` extension.
    #[error("File is not a PDF: {0}")]
    NotAPdf(String),

    /// MuPDF could not open the file as a PDF.
    #[error("Invalid PDF {path}: {reason}")]
    InvalidPdf { path: String, reason: String },

    /// Page number outside `1..=total`.
    #[error("Page {page} out of range (1-{total})")]
    PageOutOfRange { page: u32, total: u32 },

    /// Start page after end page.
    #[error("Start page {start} cannot be greater than end page {end}")]
    InvalidPageRange { start: u32, end: u32 },

    /// A query was required but none was given.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// A search that had to produce a match found nothing.
    #[error("No results found for '{query}' in {file}")]
    NoSearchResults { query: String, file: String },

    /// `result_index` does not name one of the matches (1-indexed).
    #[error("Result {index} not found (search returned {count} results, valid range: 1-{count})")]
    ResultIndexOutOfRange { index: u32, count: usize },

    /// The configured viewer is unknown or cannot be located.
    #[error("PDF viewer unavailable: {0}")]
    ViewerUnavailable(String),

    /// The viewer process could not be started.
    #[error("Failed to launch {viewer}: {reason}")]
    ViewerLaunchFailed { viewer: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// MuPDF library error.
    #[error("MuPDF error: {0}")]
    MupdfError(#[from] mupdf::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Internal error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NavigatorError {
    /// Create an internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an invalid-PDF error for `path`.
    pub fn invalid_pdf(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPdf {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for PDF navigator operations.
pub type Result<T> = std::result::Result<T, NavigatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_out_of_range_message() {
        let err = NavigatorError::PageOutOfRange { page: 10, total: 5 };
        assert_eq!(err.to_string(), "Page 10 out of range (1-5)");
    }

    #[test]
    fn test_result_index_message() {
        let err = NavigatorError::ResultIndexOutOfRange { index: 4, count: 2 };
        assert!(err.to_string().contains("Result 4 not found"));
        assert!(err.to_string().contains("1-2"));
    }
}
