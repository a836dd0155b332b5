//! Parser for the caps text serialization format
//!
//! Accepts the form emitted by media introspection tools:
//!
//! ```text
//! video/x-raw, format=(string){ I420, YV12 }, width=(int)[ 16, 1920 ]; video/x-bayer, ...
//! ```
//!
//! Structures are separated by `;`, fields by `,`. Values may carry a type
//! annotation (`(int)`, `(string)`, `(fraction)`, `(boolean)`, or their short
//! aliases) before a scalar, a `{ ... }` list or a `[ low, high ]` range; the
//! annotation may also sit on individual list elements. Untyped scalars are
//! inferred. Errors carry the byte offset they were detected at.

use crate::error::{CapsError, Result};
use crate::structure::{CapsStructure, RawValueSpec};
use crate::value::{Fraction, Value};

/// Parse a full caps string into its structures, in declaration order.
///
/// The special caps `ANY` and `EMPTY` carry no structures and parse to an
/// empty vector.
pub fn parse_caps(input: &str) -> Result<Vec<CapsStructure>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CapsError::Parse {
            offset: 0,
            message: "empty caps".into(),
        });
    }
    if trimmed.eq_ignore_ascii_case("ANY") || trimmed.eq_ignore_ascii_case("EMPTY") {
        return Ok(Vec::new());
    }

    let mut p = Parser::new(input);
    let mut structures = vec![p.structure()?];
    loop {
        p.skip_ws();
        if p.at_end() {
            break;
        }
        if !p.eat(';') {
            return Err(p.err("expected ';' or end of caps"));
        }
        p.skip_ws();
        if p.at_end() {
            break;
        }
        structures.push(p.structure()?);
    }
    Ok(structures)
}

/// Parse exactly one structure.
pub fn parse_structure(input: &str) -> Result<CapsStructure> {
    let mut p = Parser::new(input);
    let s = p.structure()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.err("trailing input after structure"));
    }
    Ok(s)
}

/// Parse a single field value specification, e.g. `{ (string)I420, (string)YV12 }`
/// or `[ 1, 2147483647 ]`.
pub fn parse_value(input: &str) -> Result<RawValueSpec> {
    let mut p = Parser::new(input);
    let v = p.value_spec()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.err("trailing input after value"));
    }
    Ok(v)
}

#[derive(Clone, Copy, PartialEq)]
enum TypeHint {
    Int,
    Str,
    Fraction,
    Bool,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{c}'")))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn err_at(&self, offset: usize, message: impl Into<String>) -> CapsError {
        CapsError::Parse {
            offset,
            message: message.into(),
        }
    }

    fn err(&self, message: impl Into<String>) -> CapsError {
        self.err_at(self.pos, message)
    }

    /// Longest run of non-delimiter characters (may be empty).
    fn token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace()
                || matches!(c, ',' | ';' | '{' | '}' | '[' | ']' | '(' | ')' | '=' | '"')
            {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn structure(&mut self) -> Result<CapsStructure> {
        self.skip_ws();
        let start = self.pos;
        let name = self.token();
        if name.is_empty() {
            return Err(self.err("expected a media-type name"));
        }
        if !name.contains('/') {
            return Err(self.err_at(start, format!("'{name}' is not a media-type name")));
        }
        // Optional caps-feature clause, e.g. video/x-raw(memory:GLMemory).
        // Features do not constrain fields and are dropped.
        if self.peek() == Some('(') {
            loop {
                match self.bump() {
                    Some(')') => break,
                    Some(_) => continue,
                    None => return Err(self.err("unterminated caps-feature clause")),
                }
            }
        }

        let mut structure = CapsStructure::new(name);
        loop {
            self.skip_ws();
            if !self.eat(',') {
                break;
            }
            self.skip_ws();
            let field = self.token();
            if field.is_empty() {
                return Err(self.err("expected a field name"));
            }
            self.skip_ws();
            self.expect('=')?;
            let spec = self.value_spec()?;
            structure = structure.with_field(field, spec);
        }
        Ok(structure)
    }

    fn value_spec(&mut self) -> Result<RawValueSpec> {
        self.skip_ws();
        let hint = self.type_hint()?;
        self.skip_ws();
        match self.peek() {
            Some('{') => self.list(hint),
            Some('[') => self.range(hint),
            _ => Ok(RawValueSpec::Fixed(self.scalar(hint)?)),
        }
    }

    /// Consume a leading `(type)` annotation if present.
    fn type_hint(&mut self) -> Result<Option<TypeHint>> {
        if self.peek() != Some('(') {
            return Ok(None);
        }
        let open = self.pos;
        self.bump();
        let name = self.token();
        if !self.eat(')') {
            return Err(self.err_at(open, "unterminated type annotation"));
        }
        let hint = match name {
            "int" | "i" => TypeHint::Int,
            "string" | "str" | "s" => TypeHint::Str,
            "fraction" => TypeHint::Fraction,
            "boolean" | "bool" | "b" => TypeHint::Bool,
            other => {
                return Err(self.err_at(open, format!("unsupported field type '({other})'")));
            }
        };
        Ok(Some(hint))
    }

    /// One list or range element: an optional per-element annotation
    /// overriding the container's, then a scalar.
    fn element(&mut self, outer: Option<TypeHint>) -> Result<Value> {
        self.skip_ws();
        let hint = self.type_hint()?;
        self.skip_ws();
        if matches!(self.peek(), Some('{') | Some('[')) {
            return Err(self.err("nested containers are not supported"));
        }
        self.scalar(hint.or(outer))
    }

    fn list(&mut self, outer: Option<TypeHint>) -> Result<RawValueSpec> {
        self.expect('{')?;
        self.skip_ws();
        let mut items = Vec::new();
        if self.eat('}') {
            return Ok(RawValueSpec::List(items));
        }
        loop {
            items.push(self.element(outer)?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }
        Ok(RawValueSpec::List(items))
    }

    fn range(&mut self, outer: Option<TypeHint>) -> Result<RawValueSpec> {
        let open = self.pos;
        self.expect('[')?;
        let low = self.element(outer)?;
        self.skip_ws();
        self.expect(',')?;
        let high = self.element(outer)?;
        self.skip_ws();
        if self.eat(',') {
            return Err(self.err_at(open, "step ranges are not supported"));
        }
        self.expect(']')?;
        match (low, high) {
            (Value::Int(min), Value::Int(max)) => {
                if min > max {
                    return Err(self.err_at(open, "range minimum exceeds maximum"));
                }
                Ok(RawValueSpec::IntRange { min, max })
            }
            (Value::Fraction(min), Value::Fraction(max)) => {
                Ok(RawValueSpec::FractionRange { min, max })
            }
            _ => Err(self.err_at(open, "range endpoints must be two ints or two fractions")),
        }
    }

    fn scalar(&mut self, hint: Option<TypeHint>) -> Result<Value> {
        self.skip_ws();
        if self.peek() == Some('"') {
            let s = self.quoted_string()?;
            return match hint {
                None | Some(TypeHint::Str) => Ok(Value::Str(s)),
                Some(_) => Err(self.err("quoted string under a non-string annotation")),
            };
        }
        let start = self.pos;
        let tok = self.token();
        if tok.is_empty() {
            return Err(self.err("expected a value"));
        }
        match hint {
            Some(TypeHint::Int) => tok
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|_| self.err_at(start, format!("invalid integer '{tok}'"))),
            Some(TypeHint::Fraction) => {
                if let Some(fr) = try_fraction(tok) {
                    Ok(Value::Fraction(fr))
                } else if let Ok(n) = tok.parse::<i32>() {
                    Ok(Value::Fraction(Fraction::new(n, 1)))
                } else {
                    Err(self.err_at(start, format!("invalid fraction '{tok}'")))
                }
            }
            Some(TypeHint::Bool) => match tok.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(self.err_at(start, format!("invalid boolean '{tok}'"))),
            },
            Some(TypeHint::Str) => Ok(Value::Str(tok.to_string())),
            None => Ok(infer(tok)),
        }
    }

    fn quoted_string(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(self.err("unterminated string escape")),
                },
                Some(c) => out.push(c),
            }
        }
    }
}

/// Untyped scalars: boolean words, then integers, then fractions, then
/// strings.
fn infer(tok: &str) -> Value {
    if tok.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if tok.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = tok.parse::<i32>() {
        return Value::Int(n);
    }
    if let Some(fr) = try_fraction(tok) {
        return Value::Fraction(fr);
    }
    Value::Str(tok.to_string())
}

fn try_fraction(tok: &str) -> Option<Fraction> {
    let (num, den) = tok.split_once('/')?;
    let num = num.parse::<i32>().ok()?;
    let den = den.parse::<i32>().ok()?;
    if den <= 0 {
        return None;
    }
    Some(Fraction::new(num, den))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_video_structure() {
        let caps = parse_caps(
            "video/x-raw, format=(string){ I420, YV12 }, width=(int)[ 16, 1920 ], \
             height=(int)[ 16, 1080 ], framerate=(fraction)[ 0/1, 100/1 ]",
        )
        .unwrap();
        assert_eq!(caps.len(), 1);
        let s = &caps[0];
        assert_eq!(s.name(), "video/x-raw");
        assert_eq!(
            s.field("format"),
            Some(&RawValueSpec::List(vec![
                Value::Str("I420".into()),
                Value::Str("YV12".into()),
            ]))
        );
        assert_eq!(
            s.field("width"),
            Some(&RawValueSpec::IntRange { min: 16, max: 1920 })
        );
        assert_eq!(
            s.field("framerate"),
            Some(&RawValueSpec::FractionRange {
                min: Fraction::new(0, 1),
                max: Fraction::new(100, 1),
            })
        );
    }

    #[test]
    fn test_parse_untyped_values_are_inferred() {
        let s = parse_structure(
            "audio/x-raw, rate=[4000, 96000], channels=2, layout=interleaved, \
             framerate=30/1, interlaced=true",
        )
        .unwrap();
        assert_eq!(
            s.field("rate"),
            Some(&RawValueSpec::IntRange { min: 4000, max: 96000 })
        );
        assert_eq!(s.field("channels"), Some(&RawValueSpec::Fixed(Value::Int(2))));
        assert_eq!(
            s.field("layout"),
            Some(&RawValueSpec::Fixed(Value::Str("interleaved".into())))
        );
        assert_eq!(
            s.field("framerate"),
            Some(&RawValueSpec::Fixed(Value::Fraction(Fraction::new(30, 1))))
        );
        assert_eq!(
            s.field("interlaced"),
            Some(&RawValueSpec::Fixed(Value::Bool(true)))
        );
    }

    #[test]
    fn test_parse_multiple_structures() {
        let caps = parse_caps(
            "video/x-raw, width=(int)320; video/x-raw-yuv, format=(string)I420",
        )
        .unwrap();
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[0].name(), "video/x-raw");
        assert_eq!(caps[1].name(), "video/x-raw-yuv");
    }

    #[test]
    fn test_parse_any_and_empty_yield_no_structures() {
        assert!(parse_caps("ANY").unwrap().is_empty());
        assert!(parse_caps("  EMPTY ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_per_element_annotations() {
        let spec = parse_value("{ (string)I420, (string)YV12 }").unwrap();
        assert_eq!(
            spec,
            RawValueSpec::List(vec![Value::Str("I420".into()), Value::Str("YV12".into())])
        );
    }

    #[test]
    fn test_parse_fraction_annotation_promotes_bare_ints() {
        let spec = parse_value("(fraction)25").unwrap();
        assert_eq!(spec, RawValueSpec::Fixed(Value::Fraction(Fraction::new(25, 1))));
    }

    #[test]
    fn test_parse_caps_feature_clause_is_dropped() {
        let s = parse_structure("video/x-raw(memory:GLMemory), width=(int)320").unwrap();
        assert_eq!(s.name(), "video/x-raw");
        assert_eq!(s.field("width"), Some(&RawValueSpec::Fixed(Value::Int(320))));
    }

    #[test]
    fn test_parse_quoted_strings() {
        let s = parse_structure("video/x-raw, format=(string)\"odd, value\"").unwrap();
        assert_eq!(
            s.field("format"),
            Some(&RawValueSpec::Fixed(Value::Str("odd, value".into())))
        );
    }

    #[test]
    fn test_parse_empty_list_is_allowed_here() {
        // Rejection happens at domain construction, not in the grammar.
        assert_eq!(parse_value("{ }").unwrap(), RawValueSpec::List(Vec::new()));
    }

    #[test]
    fn test_parse_rejects_step_ranges() {
        let err = parse_value("[ 1, 100, 2 ]").unwrap_err();
        assert!(err.to_string().contains("step ranges"));
    }

    #[test]
    fn test_parse_rejects_reversed_ranges() {
        let err = parse_value("[ 100, 1 ]").unwrap_err();
        assert!(err.to_string().contains("minimum exceeds maximum"));
    }

    #[test]
    fn test_parse_rejects_mixed_range_endpoints() {
        let err = parse_value("[ 1, 2/1 ]").unwrap_err();
        assert!(err.to_string().contains("two ints or two fractions"));
    }

    #[test]
    fn test_parse_rejects_unknown_annotations() {
        let err = parse_value("(double)1.5").unwrap_err();
        assert!(err.to_string().contains("unsupported field type"));
    }

    #[test]
    fn test_parse_rejects_bare_field_text() {
        assert!(parse_caps("width=320").is_err());
        assert!(parse_caps("").is_err());
    }

    #[test]
    fn test_parse_errors_carry_byte_offsets() {
        let err = parse_structure("video/x-raw, width=").unwrap_err();
        match err {
            CapsError::Parse { offset, .. } => assert_eq!(offset, 19),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_trailing_semicolon_is_tolerated() {
        let caps = parse_caps("video/x-raw, width=(int)320;").unwrap();
        assert_eq!(caps.len(), 1);
    }
}
