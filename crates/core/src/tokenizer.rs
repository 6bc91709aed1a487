//! Source tokenizer.
//!
//! LForth has no lexical structure beyond whitespace separation: every token
//! is a word, and what a word means is decided at dispatch time, not here.

use crate::error::InterpretError;

/// The exact characters that separate tokens. Anything else, including other
/// Unicode whitespace, is token text.
const SEPARATORS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Split program text into executable tokens.
///
/// Runs of separators collapse; empty tokens are discarded. Source with no
/// tokens at all is refused so a run of nothing reports as a failure rather
/// than a silent success.
pub fn tokenize(source: &str) -> Result<Vec<String>, InterpretError> {
    let tokens: Vec<String> = source
        .split(SEPARATORS)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    if tokens.is_empty() {
        return Err(InterpretError::Input("No program supplied".to_string()));
    }
    Ok(tokens)
}
