//! Search-result highlighting and search-box key handling.
//!
//! The search endpoint returns titles and body excerpts as sequences of marks:
//!
//! ```json
//! { "marks": [{ "type": "raw", "text": "Install " }, { "type": "mark", "text": "tokio" }] }
//! ```
//!
//! [`render_marks`] turns them into elements, emphasizing every non-raw mark.

use serde::{Deserialize, Serialize};

use crate::attrs::Attrs;
use crate::element::ElementFactory;

/// Kind of a highlighted text run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkKind {
    /// Plain text.
    Raw,
    /// A match, emphasized when rendered.
    Other(String),
}

impl From<String> for MarkKind {
    fn from(kind: String) -> Self {
        if kind == "raw" {
            Self::Raw
        } else {
            Self::Other(kind)
        }
    }
}

impl From<MarkKind> for String {
    fn from(kind: MarkKind) -> Self {
        match kind {
            MarkKind::Raw => "raw".to_owned(),
            MarkKind::Other(kind) => kind,
        }
    }
}

/// One run of text in a search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Run kind.
    #[serde(rename = "type")]
    pub kind: MarkKind,
    /// Run text.
    pub text: String,
}

impl Mark {
    /// Plain text run.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            kind: MarkKind::Raw,
            text: text.into(),
        }
    }

    /// Highlighted run.
    #[must_use]
    pub fn highlight(text: impl Into<String>) -> Self {
        Self {
            kind: MarkKind::Other("mark".to_owned()),
            text: text.into(),
        }
    }
}

/// A highlighted fragment (a result title or body excerpt).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marked {
    /// Runs in display order.
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl Marked {
    /// Text of all runs concatenated.
    pub fn plain_text(&self) -> String {
        self.marks.iter().map(|mark| mark.text.as_str()).collect()
    }
}

/// Render marks: raw runs as `span`, all others as `strong`.
///
/// Runs whose text is blank after trimming are dropped.
pub fn render_marks<F: ElementFactory>(marks: &[Mark], factory: &F) -> Vec<F::Element> {
    marks
        .iter()
        .filter(|mark| !mark.text.trim().is_empty())
        .map(|mark| {
            let tag = match mark.kind {
                MarkKind::Raw => "span",
                MarkKind::Other(_) => "strong",
            };
            factory.element(tag, Attrs::new(), vec![factory.text(&mark.text)])
        })
        .collect()
}

/// Action requested by a key press in the search box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKey {
    /// Open the active result.
    Enter,
    /// Dismiss the results.
    Escape,
    /// Move the selection down.
    ArrowDown,
    /// Move the selection up.
    ArrowUp,
    /// Any other key: the query changed, search again.
    Input,
}

impl SearchKey {
    /// Classify a DOM key code.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            13 => Self::Enter,
            27 => Self::Escape,
            40 => Self::ArrowDown,
            38 => Self::ArrowUp,
            _ => Self::Input,
        }
    }
}

/// Keyboard selection over a list of results.
///
/// Nothing is selected initially. Moving past either end wraps around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchCursor {
    len: usize,
    active: Option<usize>,
}

impl SearchCursor {
    /// Cursor over `len` results.
    pub fn new(len: usize) -> Self {
        Self { len, active: None }
    }

    /// Index of the selected result.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no results.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the result count and clear the selection.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.active = None;
    }

    /// Clear the selection.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Select the next result.
    pub fn select_next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.active = Some(match self.active {
            Some(index) if index + 1 < self.len => index + 1,
            _ => 0,
        });
        self.active
    }

    /// Select the previous result.
    pub fn select_previous(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.active = Some(match self.active {
            Some(index) if index > 0 => index - 1,
            _ => self.len - 1,
        });
        self.active
    }

    /// Apply a navigation key. Returns the selection after the key.
    ///
    /// `Escape` and `Input` clear the selection; `Enter` leaves it unchanged.
    pub fn apply(&mut self, key: SearchKey) -> Option<usize> {
        match key {
            SearchKey::ArrowDown => self.select_next(),
            SearchKey::ArrowUp => self.select_previous(),
            SearchKey::Enter => self.active,
            SearchKey::Escape | SearchKey::Input => {
                self.reset();
                None
            }
        }
    }
}
