//! HTML processing for chapter content.
//!
//! Uses lol_html for streaming HTML rewriting.

mod inline;

pub use inline::{inline_images, InlineError};
