//! Reserved words.
//!
//! The fixed dispatch table consulted before user definitions. Each word
//! validates its operands in place before popping anything, so a failed
//! word leaves every stack exactly as it found it.

use crate::error::InterpretError;
use crate::machine::Machine;
use crate::quote::Quotation;
use crate::value::Value;
use std::rc::Rc;
use tracing::debug;

/// A reserved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// One of `+ - * / % ^`
    Arith(ArithOp),
    /// `[`: opens a quotation literal
    BeginQuote,
    /// `]`: only ever dispatched unmatched
    EndQuote,
    /// `call`: invokes the quotation on top of the data stack
    Call,
    /// `idx`: duplicates from depth
    Idx,
    /// `def`: binds a name to a quotation
    Def,
}

/// Numeric operator spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Builtin {
    /// Reserved-word lookup. `None` means the token falls through to the
    /// definition registry and then to literal parsing.
    pub fn lookup(token: &str) -> Option<Builtin> {
        match token {
            "+" => Some(Builtin::Arith(ArithOp::Add)),
            "-" => Some(Builtin::Arith(ArithOp::Sub)),
            "*" => Some(Builtin::Arith(ArithOp::Mul)),
            "/" => Some(Builtin::Arith(ArithOp::Div)),
            "%" => Some(Builtin::Arith(ArithOp::Mod)),
            "^" => Some(Builtin::Arith(ArithOp::Pow)),
            "[" => Some(Builtin::BeginQuote),
            "]" => Some(Builtin::EndQuote),
            "call" => Some(Builtin::Call),
            "idx" => Some(Builtin::Idx),
            "def" => Some(Builtin::Def),
            _ => None,
        }
    }

    /// Source spelling of the word.
    pub fn token(self) -> &'static str {
        match self {
            Builtin::Arith(op) => op.token(),
            Builtin::BeginQuote => "[",
            Builtin::EndQuote => "]",
            Builtin::Call => "call",
            Builtin::Idx => "idx",
            Builtin::Def => "def",
        }
    }

    /// Run the word against the machine.
    pub(crate) fn execute(self, machine: &mut Machine) -> Result<(), InterpretError> {
        match self {
            Builtin::Arith(op) => arithmetic(machine, op),
            Builtin::BeginQuote => begin_quote(machine),
            Builtin::EndQuote => Err(InterpretError::Syntax(
                "unexpected ] with no open quotation".to_string(),
            )),
            Builtin::Call => call(machine),
            Builtin::Idx => index(machine),
            Builtin::Def => define(machine),
        }
    }
}

impl ArithOp {
    fn token(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
            ArithOp::Pow => "^",
        }
    }

    /// Integer form. Wrapping on overflow; only `/ 0`, `% 0`, and `0 ^ -n`
    /// raise.
    fn apply_int(self, a: i64, b: i64) -> Result<i64, InterpretError> {
        match self {
            ArithOp::Add => Ok(a.wrapping_add(b)),
            ArithOp::Sub => Ok(a.wrapping_sub(b)),
            ArithOp::Mul => Ok(a.wrapping_mul(b)),
            ArithOp::Div if b == 0 => {
                Err(InterpretError::Arithmetic("divide by zero".to_string()))
            }
            ArithOp::Div => Ok(a.wrapping_div(b)),
            ArithOp::Mod if b == 0 => {
                Err(InterpretError::Arithmetic("modulo by zero".to_string()))
            }
            ArithOp::Mod => Ok(a.wrapping_rem(b)),
            ArithOp::Pow => int_pow(a, b),
        }
    }

    /// Float form; IEEE-754 semantics throughout, so dividing by zero yields
    /// an infinity rather than an error.
    fn apply_float(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Mod => a % b,
            ArithOp::Pow => a.powf(b),
        }
    }
}

/// Integer exponentiation by squaring, wrapping on overflow.
///
/// A negative exponent stays in the integer domain the way `/` does:
/// `0 ^ -n` is a division by zero, bases `1` and `-1` keep their
/// parity-adjusted sign, and any larger magnitude truncates to zero.
fn int_pow(base: i64, exp: i64) -> Result<i64, InterpretError> {
    if exp < 0 {
        return match base {
            0 => Err(InterpretError::Arithmetic(
                "zero to a negative power".to_string(),
            )),
            1 => Ok(1),
            -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
            _ => Ok(0),
        };
    }
    let mut result: i64 = 1;
    let mut base = base;
    let mut exp = exp as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    Ok(result)
}

/// Apply `op` to the top two data items, right-hand operand topmost.
///
/// Stack effect: `( a b -- r )`. Integer op when both operands are Integer,
/// otherwise both promote to Float. Operands are read in place and only
/// popped once the result exists.
fn arithmetic(machine: &mut Machine, op: ArithOp) -> Result<(), InterpretError> {
    let len = machine.data.len();
    if len < 2 {
        return Err(InterpretError::StackUnderflow(format!(
            "{} needs two operands, the stack holds {}",
            op.token(),
            len
        )));
    }
    let result = match (&machine.data[len - 2], &machine.data[len - 1]) {
        (Value::Int(a), Value::Int(b)) => Value::Int(op.apply_int(*a, *b)?),
        (Value::Int(a), Value::Float(b)) => Value::Float(op.apply_float(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Value::Float(op.apply_float(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Value::Float(op.apply_float(*a, *b)),
        (lhs, rhs) => {
            let bad = if lhs.is_numeric() { rhs } else { lhs };
            return Err(InterpretError::TypeMismatch(format!(
                "{} expects numeric operands, found {}",
                op.token(),
                bad.type_name()
            )));
        }
    };
    machine.data.truncate(len - 2);
    machine.data.push(result);
    Ok(())
}

/// Capture a quotation literal.
///
/// Stack effect: `( -- quot )`. Scans the executing quotation from the
/// cursor to the matching `]`, honoring nesting; the tokens in between are
/// pushed as one quotation value and the cursor jumps past the `]`. The
/// scan never crosses the end of the current quotation.
fn begin_quote(machine: &mut Machine) -> Result<(), InterpretError> {
    let Some(frame) = machine.frames.last_mut() else {
        return Err(InterpretError::StackUnderflow(
            "no executing quotation".to_string(),
        ));
    };
    let mut depth = 1usize;
    let mut end = frame.pos;
    loop {
        let Some(token) = frame.quote.token(end) else {
            return Err(InterpretError::Syntax(
                "unterminated [ quotation".to_string(),
            ));
        };
        match token {
            "[" => depth += 1,
            "]" => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        end += 1;
    }
    let body = frame.quote.tokens()[frame.pos..end].to_vec();
    frame.pos = end + 1;
    machine
        .data
        .push(Value::Quotation(Rc::new(Quotation::new(body))));
    Ok(())
}

/// Invoke the quotation on top of the data stack.
///
/// Stack effect: `( quot -- )` plus a new execution frame. The caller frame
/// resumes where it left off once the body exhausts.
fn call(machine: &mut Machine) -> Result<(), InterpretError> {
    let body = match machine.data.last() {
        None => {
            return Err(InterpretError::StackUnderflow(
                "call needs a quotation operand".to_string(),
            ));
        }
        Some(Value::Quotation(q)) => Rc::clone(q),
        Some(other) => {
            return Err(InterpretError::TypeMismatch(format!(
                "call expects a quotation, found {}",
                other.type_name()
            )));
        }
    };
    machine.data.pop();
    machine.invoke(body);
    Ok(())
}

/// Duplicate the item `n` below the top, where `n` comes off the stack.
///
/// Stack effect: `( xn .. x0 n -- xn .. x0 xn )`. A negative index is
/// consumed and ignored. The depth check runs before the index is popped,
/// so a too-deep index stays in place alongside the rest of the stack.
fn index(machine: &mut Machine) -> Result<(), InterpretError> {
    let n = match machine.data.last() {
        None => {
            return Err(InterpretError::StackUnderflow(
                "idx needs an index operand".to_string(),
            ));
        }
        Some(Value::Int(n)) => *n,
        Some(other) => {
            return Err(InterpretError::TypeMismatch(format!(
                "idx expects an integer index, found {}",
                other.type_name()
            )));
        }
    };
    if n < 0 {
        machine.data.pop();
        return Ok(());
    }
    let slot = usize::try_from(n)
        .ok()
        .and_then(|depth| depth.checked_add(2))
        .and_then(|needed| machine.data.len().checked_sub(needed));
    let Some(slot) = slot else {
        return Err(InterpretError::StackUnderflow(format!(
            "idx {} exceeds a stack of {}",
            n,
            machine.data.len() - 1
        )));
    };
    machine.data.pop();
    let copy = machine.data[slot].clone();
    machine.data.push(copy);
    Ok(())
}

/// Bind a name to a quotation.
///
/// Stack effect: `( quot name -- )`. The name is an Atom on top with the
/// body beneath it; both are validated before either is popped. Rebinding
/// an existing name replaces the body wholesale.
fn define(machine: &mut Machine) -> Result<(), InterpretError> {
    let len = machine.data.len();
    if len < 2 {
        return Err(InterpretError::StackUnderflow(format!(
            "def needs a quotation and a name, the stack holds {}",
            len
        )));
    }
    let name = match &machine.data[len - 1] {
        Value::Atom(name) => name.clone(),
        other => {
            return Err(InterpretError::TypeMismatch(format!(
                "def expects an atom name on top, found {}",
                other.type_name()
            )));
        }
    };
    let body = match &machine.data[len - 2] {
        Value::Quotation(q) => Rc::clone(q),
        other => {
            return Err(InterpretError::TypeMismatch(format!(
                "def expects a quotation beneath the name, found {}",
                other.type_name()
            )));
        }
    };
    machine.data.truncate(len - 2);
    debug!(name = %name, tokens = body.len(), "word defined");
    machine.defs.define(name, body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Status;

    fn run(source: &str) -> Machine {
        let mut machine = Machine::load(source).expect("program should load");
        machine.run();
        machine
    }

    fn faulted(machine: &Machine) -> &InterpretError {
        machine.error().expect("machine should have faulted")
    }

    #[test]
    fn test_lookup_covers_all_reserved_words() {
        for token in ["+", "-", "*", "/", "%", "^", "[", "]", "call", "idx", "def"] {
            let word = Builtin::lookup(token).expect("reserved");
            assert_eq!(word.token(), token);
        }
        assert!(Builtin::lookup("dup").is_none());
        assert!(Builtin::lookup("").is_none());
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(run("1 2 +").data(), [Value::Int(3)]);
        assert_eq!(run("10 4 -").data(), [Value::Int(6)]);
        assert_eq!(run("6 7 *").data(), [Value::Int(42)]);
        assert_eq!(run("7 2 /").data(), [Value::Int(3)]);
        assert_eq!(run("-7 2 /").data(), [Value::Int(-3)]);
        assert_eq!(run("7 2 %").data(), [Value::Int(1)]);
        assert_eq!(run("-7 2 %").data(), [Value::Int(-1)]);
        assert_eq!(run("2 10 ^").data(), [Value::Int(1024)]);
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_eq!(
            run("9223372036854775807 1 +").data(),
            [Value::Int(i64::MIN)]
        );
        assert_eq!(
            run("-9223372036854775808 -1 /").data(),
            [Value::Int(i64::MIN)]
        );
    }

    #[test]
    fn test_float_and_mixed_arithmetic() {
        assert_eq!(run("1.5 2.25 +").data(), [Value::Float(3.75)]);
        assert_eq!(run("1 2.5 +").data(), [Value::Float(3.5)]);
        assert_eq!(run("2.5 4 *").data(), [Value::Float(10.0)]);
        assert_eq!(run("9 2.0 ^").data(), [Value::Float(81.0)]);
        assert_eq!(run("7.5 2.0 %").data(), [Value::Float(1.5)]);
    }

    #[test]
    fn test_float_divide_by_zero_is_infinite() {
        assert_eq!(run("1.0 0.0 /").data(), [Value::Float(f64::INFINITY)]);
        assert_eq!(run("3 0.0 /").data(), [Value::Float(f64::INFINITY)]);
    }

    #[test]
    fn test_integer_divide_by_zero_faults_without_popping() {
        let machine = run("3 0 /");
        assert!(matches!(faulted(&machine), InterpretError::Arithmetic(_)));
        assert_eq!(machine.data(), [Value::Int(3), Value::Int(0)]);

        let machine = run("3 0 %");
        assert!(matches!(faulted(&machine), InterpretError::Arithmetic(_)));
        assert_eq!(machine.data(), [Value::Int(3), Value::Int(0)]);
    }

    #[test]
    fn test_pow_negative_exponents() {
        assert_eq!(run("1 -5 ^").data(), [Value::Int(1)]);
        assert_eq!(run("-1 -5 ^").data(), [Value::Int(-1)]);
        assert_eq!(run("-1 -4 ^").data(), [Value::Int(1)]);
        assert_eq!(run("2 -1 ^").data(), [Value::Int(0)]);
        assert_eq!(run("-10 -3 ^").data(), [Value::Int(0)]);

        let machine = run("0 -1 ^");
        assert!(matches!(faulted(&machine), InterpretError::Arithmetic(_)));
    }

    #[test]
    fn test_arithmetic_underflow() {
        let machine = run("1 +");
        assert!(matches!(
            faulted(&machine),
            InterpretError::StackUnderflow(_)
        ));
        assert_eq!(machine.data(), [Value::Int(1)]);
    }

    #[test]
    fn test_arithmetic_type_mismatch_keeps_operands() {
        let machine = run("1 x +");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
        assert_eq!(
            machine.data(),
            [Value::Int(1), Value::Atom("x".to_string())]
        );

        let machine = run("[ 1 ] 2 *");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
    }

    #[test]
    fn test_quote_capture_pushes_value() {
        let machine = run("[ 1 2 + ]");
        assert_eq!(machine.status(), &Status::Completed);
        let [Value::Quotation(q)] = machine.data() else {
            panic!("expected one quotation, got {:?}", machine.data());
        };
        assert_eq!(q.tokens(), ["1", "2", "+"]);
    }

    #[test]
    fn test_quote_capture_is_not_execution() {
        // Reserved words inside the brackets are captured, not run
        let machine = run("[ 1 0 / ]");
        assert_eq!(machine.status(), &Status::Completed);
    }

    #[test]
    fn test_nested_quote_capture() {
        let machine = run("[ 1 [ 2 ] call ]");
        let [Value::Quotation(q)] = machine.data() else {
            panic!("expected one quotation");
        };
        assert_eq!(q.tokens(), ["1", "[", "2", "]", "call"]);
    }

    #[test]
    fn test_empty_quote() {
        let machine = run("[ ]");
        let [Value::Quotation(q)] = machine.data() else {
            panic!("expected one quotation");
        };
        assert!(q.is_empty());
    }

    #[test]
    fn test_unterminated_quote_is_syntax_error() {
        let machine = run("[ 1 2");
        assert!(matches!(faulted(&machine), InterpretError::Syntax(_)));
        assert!(machine.data().is_empty());
    }

    #[test]
    fn test_bare_close_bracket_is_syntax_error() {
        let machine = run("]");
        assert!(matches!(faulted(&machine), InterpretError::Syntax(_)));

        let machine = run("1 ] 2");
        assert!(matches!(faulted(&machine), InterpretError::Syntax(_)));
        assert_eq!(machine.data(), [Value::Int(1)]);
    }

    #[test]
    fn test_call_runs_quotation() {
        let machine = run("[ 1 2 + ] call");
        assert_eq!(machine.status(), &Status::Completed);
        assert_eq!(machine.data(), [Value::Int(3)]);
        assert_eq!(machine.frame_depth(), 0);
    }

    #[test]
    fn test_call_empty_quotation() {
        let machine = run("[ ] call 5");
        assert_eq!(machine.data(), [Value::Int(5)]);
    }

    #[test]
    fn test_call_type_mismatch_leaves_operand() {
        let machine = run("5 call");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
        assert_eq!(machine.data(), [Value::Int(5)]);
    }

    #[test]
    fn test_call_underflow() {
        let machine = run("call");
        assert!(matches!(
            faulted(&machine),
            InterpretError::StackUnderflow(_)
        ));
    }

    #[test]
    fn test_idx_duplicates_from_depth() {
        // 0 duplicates the top, 1 the one beneath it
        assert_eq!(
            run("5 0 idx").data(),
            [Value::Int(5), Value::Int(5)]
        );
        assert_eq!(
            run("5 7 1 idx").data(),
            [Value::Int(5), Value::Int(7), Value::Int(5)]
        );
    }

    #[test]
    fn test_idx_negative_is_noop_but_consumed() {
        assert_eq!(run("5 -1 idx").data(), [Value::Int(5)]);
    }

    #[test]
    fn test_idx_duplicates_quotations_by_reference() {
        let machine = run("[ 1 ] 0 idx");
        let [Value::Quotation(a), Value::Quotation(b)] = machine.data() else {
            panic!("expected two quotations");
        };
        assert!(Rc::ptr_eq(a, b));
    }

    #[test]
    fn test_idx_too_deep_keeps_index() {
        let machine = run("5 3 idx");
        assert!(matches!(
            faulted(&machine),
            InterpretError::StackUnderflow(_)
        ));
        assert_eq!(machine.data(), [Value::Int(5), Value::Int(3)]);
    }

    #[test]
    fn test_idx_on_empty_stack() {
        let machine = run("0 idx");
        assert!(matches!(
            faulted(&machine),
            InterpretError::StackUnderflow(_)
        ));
        assert_eq!(machine.data(), [Value::Int(0)]);
    }

    #[test]
    fn test_idx_type_mismatch() {
        let machine = run("5 x idx");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
    }

    #[test]
    fn test_def_registers_word() {
        let machine = run("[ 2 * ] double def");
        assert_eq!(machine.status(), &Status::Completed);
        assert!(machine.data().is_empty());
        assert!(machine.definitions().contains("double"));
        assert_eq!(
            machine.definitions().lookup("double").unwrap().tokens(),
            ["2", "*"]
        );
    }

    #[test]
    fn test_def_name_must_be_atom() {
        let machine = run("[ 1 ] 5 def");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
        assert_eq!(machine.data().len(), 2);
    }

    #[test]
    fn test_def_body_must_be_quotation() {
        let machine = run("5 foo def");
        assert!(matches!(faulted(&machine), InterpretError::TypeMismatch(_)));
        assert_eq!(
            machine.data(),
            [Value::Int(5), Value::Atom("foo".to_string())]
        );
    }

    #[test]
    fn test_def_underflow() {
        let machine = run("def");
        assert!(matches!(
            faulted(&machine),
            InterpretError::StackUnderflow(_)
        ));
    }

    #[test]
    fn test_int_pow_wraps_like_mul() {
        // 2^64 wraps to zero in 64-bit arithmetic
        assert_eq!(run("2 64 ^").data(), [Value::Int(0)]);
        assert_eq!(run("2 63 ^").data(), [Value::Int(i64::MIN)]);
        assert_eq!(run("0 0 ^").data(), [Value::Int(1)]);
    }
}
