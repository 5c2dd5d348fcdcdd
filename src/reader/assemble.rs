//! Content assembly: spine documents, inlined and concatenated.

use crate::epub::{is_document_media_type, EpubBook};
use crate::html::inline_images;

/// Where one spine document starts inside the assembled stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBoundary {
    pub id: String,
    pub href: String,
    /// Byte offset into the assembled markup.
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct AssembledContent {
    pub html: String,
    pub boundaries: Vec<DocumentBoundary>,
}

impl AssembledContent {
    /// Number of spine documents that made it into the stream.
    pub fn documents_used(&self) -> usize {
        self.boundaries.len()
    }
}

/// Walk the spine in order, inline each document's images, and concatenate
/// into a single markup stream.
///
/// Non-document manifest entries are skipped; they are only reachable via
/// inlining. A document that cannot be decoded as UTF-8 is logged and
/// skipped rather than failing the whole book, and a document whose
/// rewrite fails falls back to its original markup.
pub fn assemble(book: &EpubBook) -> AssembledContent {
    let mut assembled = AssembledContent::default();

    for id in book.spine_ids() {
        let Some(entry) = book.entry_by_id(id) else {
            tracing::warn!(id = %id, "spine references unknown manifest id, skipping");
            continue;
        };
        if !is_document_media_type(&entry.media_type) {
            continue;
        }
        let Some(resource) = book.resource_by_href(&entry.href) else {
            tracing::warn!(id = %id, href = %entry.href, "spine document missing from archive, skipping");
            continue;
        };
        let text = match std::str::from_utf8(resource.data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(id = %id, href = %entry.href, error = %e, "spine document is not valid UTF-8, skipping");
                continue;
            }
        };

        let inlined = match inline_images(text, book) {
            Ok(inlined) => inlined,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "image inlining failed, keeping original markup");
                text.to_string()
            }
        };

        assembled.boundaries.push(DocumentBoundary {
            id: id.clone(),
            href: entry.href.clone(),
            offset: assembled.html.len(),
        });
        assembled.html.push_str(&inlined);
    }

    assembled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::test_support::EpubBuilder;

    #[test]
    fn test_spine_order_concatenation() {
        let data = EpubBuilder::new()
            .chapter("ch2", "ch2.xhtml", "<p>second</p>")
            .chapter("ch1", "ch1.xhtml", "<p>first</p>")
            .build();
        let book = EpubBook::from_bytes(&data).unwrap();

        let assembled = assemble(&book);
        assert_eq!(assembled.html, "<p>second</p><p>first</p>");
        assert_eq!(assembled.documents_used(), 2);
        assert_eq!(assembled.boundaries[0].id, "ch2");
        assert_eq!(assembled.boundaries[1].offset, "<p>second</p>".len());
    }

    #[test]
    fn test_non_document_spine_entries_skipped() {
        let data = EpubBuilder::new()
            .chapter("ch1", "ch1.xhtml", "<p>text</p>")
            .spine_resource("style", "style.css", "text/css", b"p { color: red }")
            .build();
        let book = EpubBook::from_bytes(&data).unwrap();

        let assembled = assemble(&book);
        assert_eq!(assembled.documents_used(), 1);
        assert!(!assembled.html.contains("color"));
    }

    #[test]
    fn test_document_count_matches_document_spine_entries() {
        let data = EpubBuilder::new()
            .chapter("a", "a.xhtml", "<p>a</p>")
            .chapter("b", "b.xhtml", "<p>b</p>")
            .spine_resource("css", "s.css", "text/css", b"")
            .chapter("c", "c.xhtml", "<p>c</p>")
            .build();
        let book = EpubBook::from_bytes(&data).unwrap();

        let document_entries = book
            .spine_ids()
            .iter()
            .filter_map(|id| book.entry_by_id(id))
            .filter(|e| is_document_media_type(&e.media_type))
            .count();

        assert_eq!(assemble(&book).documents_used(), document_entries);
    }

    #[test]
    fn test_undecodable_document_skipped() {
        let data = EpubBuilder::new()
            .chapter("good", "good.xhtml", "<p>ok</p>")
            .spine_resource(
                "bad",
                "bad.xhtml",
                "application/xhtml+xml",
                &[0xff, 0xfe, 0x00, 0x80],
            )
            .build();
        let book = EpubBook::from_bytes(&data).unwrap();

        let assembled = assemble(&book);
        assert_eq!(assembled.documents_used(), 1);
        assert_eq!(assembled.html, "<p>ok</p>");
    }

    #[test]
    fn test_images_inlined_during_assembly() {
        let data = EpubBuilder::new()
            .chapter("ch1", "ch1.xhtml", r#"<p>pic:</p><img src="i.png"/>"#)
            .image("i", "i.png", "image/png", &[5, 6, 7])
            .build();
        let book = EpubBook::from_bytes(&data).unwrap();

        let assembled = assemble(&book);
        assert!(assembled.html.contains("data:image/png;base64,"));
        assert!(!assembled.html.contains(r#"src="i.png""#));
    }
}
