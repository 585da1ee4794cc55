//! Input deck line buffer and marker scanning
//!
//! A deck is handled as an ordered list of lines. Content is only ever
//! inserted, never edited or removed, so everything the solver wrote keeps
//! its relative order.

mod scanner;

pub use scanner::{element_set_lines, label_lines, scan, InjectionPoints, SetInjection};

/// Start of a part definition; the rest of the line is the part name
pub const PART_MARKER: &str = "*Part, name=";
/// Header written directly after every part definition
pub const NODE_MARKER: &str = "*Node";
/// Start of an element definition section
pub const ELEMENT_MARKER: &str = "*Element, type=";
pub const BOUNDARY_CONDITIONS_MARKER: &str = "** BOUNDARY CONDITIONS";
pub const PREDEFINED_FIELDS_MARKER: &str = "** PREDEFINED FIELDS";
/// Prefix of the `** ----...` line closing a model data section
pub const SECTION_SEPARATOR_PREFIX: &str = "** -";

pub const ELSET_KEYWORD: &str = "*Elset, elset=";
pub const INITIAL_STRESS_KEYWORD: &str = "*Initial Conditions, type=STRESS";

/// Maximum number of element labels on one data line
pub const LABELS_PER_LINE: usize = 8;

/// Ordered, insert-only sequence of deck lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckBuffer {
    lines: Vec<String>,
}

impl DeckBuffer {
    /// Split deck text into lines, ignoring leading and trailing blank space
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.trim().lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Insert a line so that it ends up at `index`
    pub fn insert(&mut self, index: usize, line: impl Into<String>) {
        self.lines.insert(index, line.into());
    }

    /// Insert lines starting at `index`, keeping their order.
    /// Returns the number of inserted lines.
    pub fn insert_all<I>(&mut self, index: usize, lines: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.lines.len();
        self.lines.splice(index..index, lines);
        self.lines.len() - before
    }

    /// Deck text with every line terminated by a newline
    pub fn to_text(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}
