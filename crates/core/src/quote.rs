//! Quotations: deferred token sequences.

use std::fmt;

/// An ordered, immutable sequence of tokens awaiting execution.
///
/// The root quotation is the whole program; `[ ... ]` literals and the bodies
/// registered by `def` are nested quotations. A body never changes after
/// construction, so the machine shares quotations by `Rc` instead of
/// copying them onto the data stack or the frame stack.
///
/// Tokens are stored as raw text. Nothing is resolved at capture time: a
/// token only becomes a built-in, a defined word, or a data item when the
/// quotation executes.
#[derive(Debug, Clone, PartialEq)]
pub struct Quotation {
    tokens: Vec<String>,
}

impl Quotation {
    pub fn new(tokens: Vec<String>) -> Self {
        Quotation { tokens }
    }

    /// Number of tokens in the body.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `pos`, or `None` once `pos` is past the end.
    pub fn token(&self, pos: usize) -> Option<&str> {
        self.tokens.get(pos).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for Quotation {
    /// Bracketed source form, e.g. `[ 1 2 + ]`; an empty body is `[ ]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return write!(f, "[ ]");
        }
        write!(f, "[ {} ]", self.tokens.join(" "))
    }
}
