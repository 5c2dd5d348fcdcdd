//! EPUB container access and navigation extraction.
//!
//! The archive reader indexes the container once per upload request and owns
//! all resource bytes for the lifetime of that request. Downstream stages
//! (inlining, assembly) only borrow from it.

use serde::Serialize;
use thiserror::Error;

mod archive;
mod toc;

pub use archive::{EpubBook, ResourceRef};
pub use toc::extract_toc;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, Error)]
pub enum EpubError {
    #[error("failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("failed to parse package XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A declared resource from the package manifest. Immutable once loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

/// A flat table-of-contents entry in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    pub label: String,
    pub href: String,
}

/// Media types the assembler treats as spine documents.
pub fn is_document_media_type(media_type: &str) -> bool {
    matches!(media_type, "application/xhtml+xml" | "text/html")
}
