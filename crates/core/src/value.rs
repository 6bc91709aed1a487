//! Data items: the values LForth programs push and consume.

use crate::quote::Quotation;
use std::fmt;
use std::rc::Rc;

/// A single data-stack value.
///
/// Exactly one variant is populated per item and items are immutable once
/// created. Quotation values share their body by reference: duplicating one
/// (e.g. via `idx`) bumps a reference count rather than copying tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    /// An opaque symbolic token, carried verbatim
    Atom(String),
    /// A first-class deferred code block, as captured by `[ ... ]`
    Quotation(Rc<Quotation>),
}

impl Value {
    /// Classify one token as a data item.
    ///
    /// Exact integer parse first (optional sign, base 10), then the strict
    /// float grammar, then Atom carrying the verbatim text. Total: no token
    /// fails to become a value. Digit runs too large for an `i64` fall
    /// through to the float parse.
    pub fn parse_token(token: &str) -> Value {
        if let Ok(n) = token.parse::<i64>() {
            return Value::Int(n);
        }
        if is_float_token(token) {
            if let Ok(x) = token.parse::<f64>() {
                return Value::Float(x);
            }
        }
        Value::Atom(token.to_string())
    }

    /// Variant name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Atom(_) => "atom",
            Value::Quotation(_) => "quotation",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

/// Strict float shape: optional sign, decimal digits with at most one
/// point, optional `e`/`E` exponent with its own optional sign.
///
/// `f64::from_str` itself also accepts `inf`, `NaN`, and exponent-less
/// keywords that LForth treats as atoms, so the token shape is validated
/// before the numeric parse runs.
fn is_float_token(token: &str) -> bool {
    let body = token.strip_prefix(['+', '-']).unwrap_or(token);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mut digits = 0usize;
    let mut seen_point = false;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    if digits == 0 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

impl fmt::Display for Value {
    /// Rendered form: decimal text for numbers, verbatim text for atoms,
    /// bracketed tokens for quotations.
    ///
    /// Floats use the shortest decimal that re-parses to the same value; a
    /// whole-valued float keeps its `.0` so the rendering re-parses as a
    /// Float rather than an Integer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Atom(s) => write!(f, "{}", s),
            Value::Quotation(q) => write!(f, "{}", q),
        }
    }
}
