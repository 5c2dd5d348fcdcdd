//! Splitting assembled markup into bounded-size pages.
//!
//! The tokenizer walks the markup with a real parser and flattens top-level
//! paragraph and image elements into structural units. A unit is never
//! split across pages; markup between units rides along as filler attached
//! to the adjacent unit, so concatenating all pages reproduces the input
//! exactly.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Soft target for page size, in characters.
pub const DEFAULT_MAX_PAGE_CHARS: usize = 3000;

/// One screen of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based ordinal position.
    pub number: usize,
    pub html: String,
}

/// Split `content` into pages of at most `max_chars` characters.
///
/// The bound is soft: a single unit larger than `max_chars` is emitted
/// alone on its own page rather than split.
pub fn paginate(content: &str, max_chars: usize) -> Vec<Page> {
    let units = split_units(content);

    let mut pages: Vec<Page> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for unit in units {
        let unit_chars = unit.chars().count();
        if !current.is_empty() && current_chars + unit_chars > max_chars {
            pages.push(Page {
                number: pages.len() + 1,
                html: std::mem::take(&mut current),
            });
            current_chars = 0;
        }
        current.push_str(&unit);
        current_chars += unit_chars;
    }

    if !current.is_empty() {
        pages.push(Page {
            number: pages.len() + 1,
            html: current,
        });
    }

    pages
}

/// Element names that form structural units at the top level.
fn is_unit_element(name: &[u8]) -> bool {
    name == b"p" || name == b"img"
}

/// Open unit capture: byte offset where the element started, its name, and
/// the nesting depth of same-named descendants.
struct Capture {
    start: usize,
    name: Vec<u8>,
    depth: usize,
}

/// Tokenize markup into structural units with filler attached.
///
/// Spans are taken directly from the input by byte offset, so the
/// concatenation of the returned units equals `content` byte-for-byte.
/// On a parse error the unconsumed remainder is kept as trailing filler.
pub fn split_units(content: &str) -> Vec<String> {
    let mut reader = Reader::from_str(content);
    let mut units: Vec<String> = Vec::new();
    let mut leading = String::new();
    let mut capture: Option<Capture> = None;
    let mut pos = 0usize;

    fn attach_filler(units: &mut [String], leading: &mut String, span: &str) {
        if span.is_empty() {
            return;
        }
        match units.last_mut() {
            Some(last) => last.push_str(span),
            None => leading.push_str(span),
        }
    }

    fn finish_unit(units: &mut Vec<String>, leading: &mut String, unit: &str) {
        let mut full = std::mem::take(leading);
        full.push_str(unit);
        units.push(full);
    }

    loop {
        let start = pos;
        let event = reader.read_event();
        pos = reader.buffer_position();
        let span = &content[start..pos];

        match event {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                match capture.as_mut() {
                    Some(open) => {
                        if name == open.name {
                            open.depth += 1;
                        }
                    }
                    None => {
                        if name == b"p" {
                            capture = Some(Capture {
                                start,
                                name,
                                depth: 1,
                            });
                        } else if name == b"img" {
                            // Void element; a bare `<img>` start is already
                            // the whole unit.
                            finish_unit(&mut units, &mut leading, span);
                        } else {
                            attach_filler(&mut units, &mut leading, span);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name().as_ref().to_vec();
                match capture.as_mut() {
                    Some(open) if name == open.name => {
                        open.depth -= 1;
                        if open.depth == 0 {
                            let unit = &content[open.start..pos];
                            finish_unit(&mut units, &mut leading, unit);
                            capture = None;
                        }
                    }
                    Some(_) => {}
                    None => attach_filler(&mut units, &mut leading, span),
                }
            }
            Ok(Event::Empty(e)) => {
                if capture.is_none() {
                    if is_unit_element(e.local_name().as_ref()) {
                        finish_unit(&mut units, &mut leading, span);
                    } else {
                        attach_filler(&mut units, &mut leading, span);
                    }
                }
            }
            Ok(_) => {
                if capture.is_none() {
                    attach_filler(&mut units, &mut leading, span);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, offset = start, "markup parse error, keeping remainder intact");
                let remainder = &content[start..];
                match capture.take() {
                    Some(open) => finish_unit(&mut units, &mut leading, &content[open.start..]),
                    None => attach_filler(&mut units, &mut leading, remainder),
                }
                pos = content.len();
                break;
            }
        }
    }

    // Unit still open at end of input.
    if let Some(open) = capture.take() {
        finish_unit(&mut units, &mut leading, &content[open.start..]);
        leading.clear();
    }

    // No units at all: the whole stream is one unit so nothing is lost.
    if units.is_empty() && !leading.is_empty() {
        units.push(leading);
    } else if !leading.is_empty() {
        // Leading filler with units following would have been consumed by
        // the first finish_unit; anything left belongs to the last unit.
        if let Some(last) = units.last_mut() {
            last.push_str(&leading);
        }
    }

    units
}
