//! Interpreter error types.

/// Error raised by a run of the interpreter.
///
/// Every failure an LForth program can provoke falls into one of these
/// variants; the machine halts on the first one raised and surfaces it in
/// the final snapshot. Each variant carries the human-readable cause, which
/// is also what `Display` renders.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretError {
    /// No usable program text (empty or whitespace-only source)
    Input(String),
    /// Unbalanced quotation brackets
    Syntax(String),
    /// Integer division or modulo by zero
    Arithmetic(String),
    /// An operand had the wrong variant for the word that consumed it
    TypeMismatch(String),
    /// A word required more operands or depth than the data stack holds
    StackUnderflow(String),
}

impl InterpretError {
    /// Short classifier for logs and assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            InterpretError::Input(_) => "input error",
            InterpretError::Syntax(_) => "syntax error",
            InterpretError::Arithmetic(_) => "arithmetic error",
            InterpretError::TypeMismatch(_) => "type mismatch",
            InterpretError::StackUnderflow(_) => "stack underflow",
        }
    }
}

impl std::fmt::Display for InterpretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpretError::Input(s)
            | InterpretError::Syntax(s)
            | InterpretError::Arithmetic(s)
            | InterpretError::TypeMismatch(s)
            | InterpretError::StackUnderflow(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for InterpretError {}
