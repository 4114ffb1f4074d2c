//! Scoped access to a PDF on disk: page text, outlines and metadata.
//!
//! A [`PdfDocument`] lives for a single tool call. The MuPDF handle is
//! released when it is dropped, on success and error paths alike.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use mupdf::{Document, MetadataName, TextPageFlags};
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{NavigatorError, Result};

/// A single table-of-contents entry, flattened from the outline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TocEntry {
    /// Nesting level (1 = top level).
    pub level: u32,
    /// Bookmark title.
    pub title: String,
    /// Target page (1-indexed), if the bookmark points inside the document.
    pub page: Option<u32>,
}

/// Document information dictionary.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    /// Application that created the document.
    pub creator: Option<String>,
    /// Application that produced the PDF.
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// An open PDF document.
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
    page_count: u32,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl PdfDocument {
    /// Open the PDF at `path`.
    ///
    /// Fails with [`NavigatorError::FileNotFound`] if nothing exists at the
    /// path and [`NavigatorError::InvalidPdf`] if MuPDF cannot read it as an
    /// unencrypted PDF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            return Err(NavigatorError::FileNotFound(display));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| NavigatorError::invalid_pdf(&display, "path is not valid UTF-8"))?;
        let document =
            Document::open(path_str).map_err(|e| NavigatorError::invalid_pdf(&display, e))?;

        if !document.is_pdf() {
            return Err(NavigatorError::invalid_pdf(&display, "not a PDF document"));
        }
        if document
            .needs_password()
            .map_err(|e| NavigatorError::invalid_pdf(&display, e))?
        {
            return Err(NavigatorError::invalid_pdf(&display, "document is password protected"));
        }

        let page_count = document
            .page_count()
            .map_err(|e| NavigatorError::invalid_pdf(&display, e))?;
        let page_count = u32::try_from(page_count)
            .map_err(|_| NavigatorError::invalid_pdf(&display, "negative page count"))?;

        tracing::debug!(path = %display, page_count, "Opened PDF");

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_count,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the path, for display.
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// Total number of pages.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Check that `page` (1-indexed) exists.
    pub fn validate_page(&self, page: u32) -> Result<()> {
        if page < 1 || page > self.page_count {
            return Err(NavigatorError::PageOutOfRange {
                page,
                total: self.page_count,
            });
        }
        Ok(())
    }

    /// Validate an inclusive page range; `end = None` means the last page.
    pub fn validate_range(&self, start: u32, end: Option<u32>) -> Result<RangeInclusive<u32>> {
        self.validate_page(start)?;
        let end = match end {
            Some(end) => {
                self.validate_page(end)?;
                end
            }
            None => self.page_count,
        };
        if start > end {
            return Err(NavigatorError::InvalidPageRange { start, end });
        }
        Ok(start..=end)
    }

    /// Plain text of `page` (1-indexed).
    ///
    /// Each text line ends with a newline and blocks are separated by a blank
    /// line.
    pub fn page_text(&self, page: u32) -> Result<String> {
        self.validate_page(page)?;
        let index = i32::try_from(page - 1)
            .map_err(|_| NavigatorError::internal(format!("page {} overflows", page)))?;
        let page = self.document.load_page(index)?;
        let text_page = page.to_text_page(TextPageFlags::empty())?;

        let mut result = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                result.extend(line.chars().filter_map(|ch| ch.char()));
                result.push('\n');
            }
            result.push('\n');
        }
        Ok(result)
    }

    /// Text of every page in order, paired with its page number.
    pub fn all_pages_text(&self) -> impl Iterator<Item = (u32, Result<String>)> + '_ {
        (1..=self.page_count).map(move |page| (page, self.page_text(page)))
    }

    /// Flattened table of contents in document order.
    pub fn toc(&self) -> Result<Vec<TocEntry>> {
        let mut entries = Vec::new();
        for outline in &self.document.outlines()? {
            collect_toc(outline, 1, &mut entries);
        }
        Ok(entries)
    }

    /// Document metadata; empty values are reported as `None`.
    pub fn metadata(&self) -> PdfMetadata {
        let field = |name: MetadataName| {
            self.document
                .metadata(name)
                .ok()
                .filter(|s| !s.is_empty())
        };

        PdfMetadata {
            title: field(MetadataName::Title),
            author: field(MetadataName::Author),
            subject: field(MetadataName::Subject),
            keywords: field(MetadataName::Keywords),
            creator: field(MetadataName::Creator),
            producer: field(MetadataName::Producer),
            creation_date: field(MetadataName::CreationDate),
            modification_date: field(MetadataName::ModDate),
        }
    }
}

fn collect_toc(outline: &mupdf::Outline, level: u32, entries: &mut Vec<TocEntry>) {
    let page = outline
        .dest
        .as_ref()
        .map(|dest| dest.loc.page_number as u32 + 1);

    entries.push(TocEntry {
        level,
        title: outline.title.clone(),
        page,
    });

    for child in &outline.down {
        collect_toc(child, level + 1, entries);
    }
}

/// File name of `path`, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
