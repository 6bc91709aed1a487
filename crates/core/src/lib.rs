//! LForth: a stack-based concatenative language.
//!
//! A program is a whitespace-separated sequence of words. Dispatch tries the
//! reserved words first (`+ - * / % ^ [ ] call idx def`), then the user
//! definitions built by `def`, and finally pushes the token as a literal
//! data item (Integer, Float, or Atom). `[ ... ]` captures a first-class
//! quotation; `call` invokes one; nested invocations run on a single
//! execution frame stack.
//!
//! # Modules
//!
//! - `tokenizer`: whitespace splitting of program text
//! - `value`: the data item model and literal classification
//! - `quote`: immutable quotation bodies
//! - `registry`: the name → quotation mapping built by `def`
//! - `machine`: the stack machine and dispatch loop
//! - `builtins`: the reserved-word table and operations
//! - `error`: the interpreter error taxonomy
//! - `snapshot`: the final-state report handed back to callers

pub mod builtins;
pub mod error;
pub mod machine;
pub mod quote;
pub mod registry;
pub mod snapshot;
pub mod tokenizer;
pub mod value;

pub use builtins::Builtin;
pub use error::InterpretError;
pub use machine::{Machine, Status};
pub use quote::Quotation;
pub use registry::Registry;
pub use snapshot::Snapshot;
pub use tokenizer::tokenize;
pub use value::Value;

/// Interpret `source` to completion and capture the final state.
///
/// This is the whole external contract in one call: every failure mode,
/// including unusable program text, comes back as a snapshot with
/// `success = false` rather than an `Err`.
///
/// ```
/// let state = lforth::interpret("1 2 +");
/// assert!(state.success);
/// assert_eq!(state.stack, ["3"]);
/// ```
pub fn interpret(source: &str) -> Snapshot {
    match Machine::load(source) {
        Ok(mut machine) => {
            machine.run();
            machine.snapshot()
        }
        Err(e) => Snapshot::rejected(&e),
    }
}
