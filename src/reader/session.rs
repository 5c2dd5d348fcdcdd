//! Reader session state machine.
//!
//! Tracks the current page, paragraph highlighting, and progress for one
//! paginated book. The server hands the full page set to the client, and
//! the client mirrors this logic, but keeping the state machine here lets
//! the navigation rules be tested independently of any UI.

use super::paginate::Page;

/// What the reader shows for the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub html: String,
    /// Human-readable position, e.g. "Page 3 of 12".
    pub indicator: String,
    /// Whole-percent progress through the book.
    pub progress_percent: u8,
}

/// Navigation state over a fixed page set.
#[derive(Debug)]
pub struct ReaderSession {
    pages: Vec<Page>,
    current: usize,
    highlighted_unit: Option<usize>,
}

impl ReaderSession {
    /// Start at the first page with nothing highlighted.
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages,
            current: 0,
            highlighted_unit: None,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based number of the current page, or 0 when there are no pages.
    pub fn current_page(&self) -> usize {
        if self.pages.is_empty() {
            0
        } else {
            self.current + 1
        }
    }

    pub fn highlighted_unit(&self) -> Option<usize> {
        self.highlighted_unit
    }

    /// Advance one page. Returns whether the position changed; turning the
    /// page clears any highlight.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            self.highlighted_unit = None;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns whether the position changed; turning the
    /// page clears any highlight.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            self.highlighted_unit = None;
            true
        } else {
            false
        }
    }

    /// Highlight one unit on the current page. Selecting the same unit
    /// again keeps it highlighted; selecting another moves the highlight.
    pub fn select_unit(&mut self, index: usize) {
        self.highlighted_unit = Some(index);
    }

    pub fn render(&self) -> RenderedView {
        if self.pages.is_empty() {
            return RenderedView {
                html: String::new(),
                indicator: "Page 0 of 0".to_string(),
                progress_percent: 0,
            };
        }
        let total = self.pages.len();
        let number = self.current + 1;
        RenderedView {
            html: self.pages[self.current].html.clone(),
            indicator: format!("Page {} of {}", number, total),
            progress_percent: (number * 100 / total) as u8,
        }
    }
}
