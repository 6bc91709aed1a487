//! User word definitions.

use crate::quote::Quotation;
use std::collections::HashMap;
use std::rc::Rc;

/// The name → body mapping built by `def`.
///
/// A later definition replaces an earlier one wholesale; nothing is ever
/// deleted or merged. Bodies are shared immutable quotations, so replacing
/// an entry never touches the old body. If the old body is mid-execution
/// on the frame stack it simply runs to completion there.
///
/// Reserved words never appear here: dispatch checks them first, so their
/// tokens execute instead of ever becoming Atom operands for `def`.
#[derive(Debug, Default)]
pub struct Registry {
    words: HashMap<String, Rc<Quotation>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register `name`, replacing any previous body.
    pub fn define(&mut self, name: String, body: Rc<Quotation>) {
        self.words.insert(name, body);
    }

    /// Body for `name`, if defined.
    pub fn lookup(&self, name: &str) -> Option<&Rc<Quotation>> {
        self.words.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.words.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
