//! Scalar values carried by capability fields

use std::fmt;

/// Exact rational, used for framerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    pub num: i32,
    pub den: i32,
}

impl Fraction {
    pub const fn new(num: i32, den: i32) -> Self {
        Fraction { num, den }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// One concrete scalar a capability field can take.
///
/// The variants mirror the value types that appear on sink pads: integers
/// (dimensions, rates, channels), fractions (framerates), booleans and
/// strings (formats, layouts).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i32),
    Fraction(Fraction),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Caps-text token including its type annotation, e.g. `(int)320` or
    /// `(fraction)25/1`. Strings are quoted only when they contain
    /// characters the grammar would otherwise split on.
    pub fn caps_token(&self) -> String {
        match self {
            Value::Int(v) => format!("(int){v}"),
            Value::Fraction(fr) => format!("(fraction){fr}"),
            Value::Bool(b) => format!("(boolean){b}"),
            Value::Str(s) => format!("(string){}", quoted(s)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Fraction(fr) => write!(f, "{fr}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Quote a string token if it contains grammar delimiters or whitespace.
pub(crate) fn quoted(s: &str) -> String {
    let bare = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '/' | '.' | ':'));
    if bare {
        s.to_string()
    } else {
        let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
}
