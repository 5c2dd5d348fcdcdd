//! Image inlining using lol_html.
//!
//! Rewrites image references in chapter markup into self-contained data
//! URIs so rendered pages carry no dependency on the source archive.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use thiserror::Error;

use crate::epub::EpubBook;

#[derive(Debug, Error)]
pub enum InlineError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Replace every resolvable `img[src]` with a base64 data URI.
///
/// The media type comes from the manifest declaration of the resolved
/// resource, not a hardcoded image type. Unresolvable references are left
/// untouched so a broken image degrades instead of failing the chapter.
pub fn inline_images(html: &str, book: &EpubBook) -> Result<String, InlineError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(src) = el.get_attribute("src") {
                    if src.is_empty() || src.starts_with("data:") || src.starts_with("http") {
                        return Ok(());
                    }
                    if let Some(resource) = book.resource_by_href(&src) {
                        let payload = BASE64.encode(resource.data);
                        el.set_attribute(
                            "src",
                            &format!("data:{};base64,{}", resource.media_type, payload),
                        )?;
                    } else {
                        tracing::debug!(src = %src, "image reference not found, leaving as-is");
                    }
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| InlineError::Rewrite(e.to_string()))?;

    Ok(result)
}
