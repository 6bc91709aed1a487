//! Final-state snapshot of a run.

use crate::error::InterpretError;
use serde::Serialize;
use std::fmt;

/// The immutable result of one interpreter run.
///
/// `stack` holds the rendered data items, top of stack first. `error` is
/// populated exactly when `success` is false. The human rendering is two
/// lines (the outcome, then the comma-joined stack); the JSON rendering
/// serializes the struct as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub success: bool,
    pub error: Option<String>,
    pub stack: Vec<String>,
}

impl Snapshot {
    /// Snapshot for a run that never started, e.g. no program text.
    pub fn rejected(err: &InterpretError) -> Self {
        Snapshot {
            success: false,
            error: Some(err.to_string()),
            stack: Vec::new(),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => writeln!(f, "OK")?,
            Some(msg) => writeln!(f, "FAIL: {}", msg)?,
        }
        write!(f, "{}", self.stack.join(", "))
    }
}
