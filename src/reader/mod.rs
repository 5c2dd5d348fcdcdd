//! Book processing pipeline: parse, assemble, paginate.

mod assemble;
mod paginate;
mod session;

pub use assemble::{assemble, AssembledContent, DocumentBoundary};
pub use paginate::{paginate, split_units, Page, DEFAULT_MAX_PAGE_CHARS};
pub use session::{ReaderSession, RenderedView};

use serde::Serialize;

use crate::epub::{extract_toc, EpubBook, EpubError, TocEntry};

/// Everything the reader client needs to display a book.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub pages: Vec<String>,
    pub page_count: usize,
    pub toc: Vec<TocEntry>,
}

/// Run the whole pipeline over a raw archive.
pub fn process_book(data: &[u8], max_page_chars: usize) -> Result<RenderPayload, EpubError> {
    let book = EpubBook::from_bytes(data)?;
    let toc = extract_toc(&book);
    let assembled = assemble(&book);
    let pages = paginate(&assembled.html, max_page_chars);

    tracing::info!(
        documents = assembled.documents_used(),
        pages = pages.len(),
        toc_entries = toc.len(),
        "processed book"
    );

    Ok(RenderPayload {
        page_count: pages.len(),
        pages: pages.into_iter().map(|p| p.html).collect(),
        toc,
    })
}
