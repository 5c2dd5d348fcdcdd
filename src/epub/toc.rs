//! Navigation document parsing.
//!
//! Supports both NCX (`navMap`/`navPoint`) and EPUB 3 XHTML nav documents.
//! The result is a flat list in document order; nesting is intentionally
//! flattened. A navigation point missing its label or target is skipped
//! rather than aborting extraction.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{EpubBook, TocEntry};

/// Extract the table of contents. Empty when the book has no navigation
/// document or the document cannot be read.
pub fn extract_toc(book: &EpubBook) -> Vec<TocEntry> {
    let Some(bytes) = book.navigation_document() else {
        return Vec::new();
    };
    let Ok(xml) = std::str::from_utf8(bytes) else {
        tracing::warn!("navigation document is not valid UTF-8, skipping TOC");
        return Vec::new();
    };
    parse_navigation(xml)
}

/// Parse a navigation document of either flavor.
pub fn parse_navigation(xml: &str) -> Vec<TocEntry> {
    match root_element_name(xml).as_deref() {
        Some("ncx") => parse_ncx(xml),
        _ => parse_nav_html(xml),
    }
}

fn root_element_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Pending navPoint frame: completed entries are emitted as soon as both
/// parts are known, which yields document (pre)order even for nested points.
#[derive(Default)]
struct PendingPoint {
    label: String,
    href: Option<String>,
    emitted: bool,
}

fn parse_ncx(xml: &str) -> Vec<TocEntry> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut stack: Vec<PendingPoint> = Vec::new();
    let mut in_label = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"navPoint" => stack.push(PendingPoint::default()),
                b"navLabel" => in_label = true,
                b"text" if in_label => in_text = true,
                b"content" => set_point_href(&mut stack, &mut entries, &e),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"content" {
                    set_point_href(&mut stack, &mut entries, &e);
                }
            }
            Ok(Event::Text(t)) if in_text => {
                if let (Some(point), Ok(text)) = (stack.last_mut(), t.unescape()) {
                    point.label.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"navPoint" => {
                    if let Some(point) = stack.pop() {
                        emit_if_complete(point, &mut entries);
                    }
                }
                b"navLabel" => {
                    in_label = false;
                    in_text = false;
                    try_emit_top(&mut stack, &mut entries);
                }
                b"text" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed NCX document, stopping TOC parse");
                break;
            }
            Ok(_) => {}
        }
    }

    entries
}

fn set_point_href(
    stack: &mut Vec<PendingPoint>,
    entries: &mut Vec<TocEntry>,
    element: &quick_xml::events::BytesStart<'_>,
) {
    let src = element
        .try_get_attribute("src")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if let (Some(point), Some(src)) = (stack.last_mut(), src) {
        point.href = Some(src);
    }
    try_emit_top(stack, entries);
}

fn try_emit_top(stack: &mut [PendingPoint], entries: &mut Vec<TocEntry>) {
    if let Some(point) = stack.last_mut() {
        if !point.emitted && !point.label.trim().is_empty() {
            if let Some(href) = point.href.as_ref().filter(|h| !h.is_empty()) {
                entries.push(TocEntry {
                    label: point.label.trim().to_string(),
                    href: href.clone(),
                });
                point.emitted = true;
            }
        }
    }
}

fn emit_if_complete(mut point: PendingPoint, entries: &mut Vec<TocEntry>) {
    if point.emitted {
        return;
    }
    point.emitted = true;
    if let Some(href) = point.href.filter(|h| !h.is_empty()) {
        let label = point.label.trim().to_string();
        if !label.is_empty() {
            entries.push(TocEntry { label, href });
        }
    }
}

/// EPUB 3 nav document: anchors inside the `toc`-typed `<nav>` element, or
/// inside the first `<nav>` when none is typed.
fn parse_nav_html(xml: &str) -> Vec<TocEntry> {
    let mut reader = Reader::from_str(xml);
    let mut toc_entries: Vec<TocEntry> = Vec::new();
    let mut fallback_entries: Vec<TocEntry> = Vec::new();
    let mut nav_depth = 0usize;
    let mut in_toc_nav = false;
    let mut seen_fallback_nav = false;
    let mut collect_fallback = false;
    let mut anchor: Option<(String, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"nav" => {
                    nav_depth += 1;
                    if nav_depth == 1 {
                        let nav_type = e
                            .try_get_attribute("epub:type")
                            .ok()
                            .flatten()
                            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
                            .unwrap_or_default();
                        in_toc_nav = nav_type.split_whitespace().any(|t| t == "toc");
                        collect_fallback = !in_toc_nav && !seen_fallback_nav;
                    }
                }
                b"a" if nav_depth > 0 && anchor.is_none() => {
                    let href = e
                        .try_get_attribute("href")
                        .ok()
                        .flatten()
                        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
                        .unwrap_or_default();
                    anchor = Some((String::new(), href));
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let (Some((label, _)), Ok(text)) = (anchor.as_mut(), t.unescape()) {
                    label.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"nav" => {
                    if nav_depth == 1 {
                        if in_toc_nav && !toc_entries.is_empty() {
                            return toc_entries;
                        }
                        if collect_fallback && !fallback_entries.is_empty() {
                            seen_fallback_nav = true;
                        }
                        in_toc_nav = false;
                        collect_fallback = false;
                    }
                    nav_depth = nav_depth.saturating_sub(1);
                }
                b"a" => {
                    if let Some((label, href)) = anchor.take() {
                        let label = label.trim().to_string();
                        if !label.is_empty() && !href.is_empty() {
                            let entry = TocEntry { label, href };
                            if in_toc_nav {
                                toc_entries.push(entry);
                            } else if collect_fallback {
                                fallback_entries.push(entry);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed nav document, stopping TOC parse");
                break;
            }
            Ok(_) => {}
        }
    }

    if !toc_entries.is_empty() {
        toc_entries
    } else {
        fallback_entries
    }
}
