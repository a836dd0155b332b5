//! Capability descriptors as advertised by a sink pad

use std::fmt;

use crate::value::{Fraction, Value};

/// Raw specification of the values one field may take, as advertised.
///
/// The shape is resolved once, when the descriptor is parsed; every later
/// stage branches on this tag instead of re-probing a dynamic value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValueSpec {
    /// A single concrete value
    Fixed(Value),
    /// An enumerated set of alternatives, advertised order preserved
    List(Vec<Value>),
    /// Closed integer interval
    IntRange { min: i32, max: i32 },
    /// Closed fraction interval
    FractionRange { min: Fraction, max: Fraction },
}

impl fmt::Display for RawValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValueSpec::Fixed(v) => write!(f, "{}", v.caps_token()),
            RawValueSpec::List(vs) => {
                write!(f, "{{ ")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v.caps_token())?;
                }
                write!(f, " }}")
            }
            RawValueSpec::IntRange { min, max } => write!(f, "(int)[ {min}, {max} ]"),
            RawValueSpec::FractionRange { min, max } => {
                write!(f, "(fraction)[ {min}, {max} ]")
            }
        }
    }
}

/// One advertised capability descriptor: a media-type name plus ordered
/// fields.
///
/// Field declaration order is significant (it drives matrix iteration order)
/// and is preserved exactly as parsed. A descriptor is read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapsStructure {
    name: String,
    fields: Vec<(String, RawValueSpec)>,
}

impl CapsStructure {
    pub fn new(name: impl Into<String>) -> Self {
        CapsStructure {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping declaration order.
    pub fn with_field(mut self, name: impl Into<String>, spec: RawValueSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Media-type name, e.g. `video/x-raw`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[(String, RawValueSpec)] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&RawValueSpec> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for CapsStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (name, spec) in &self.fields {
            write!(f, ", {name}={spec}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_is_preserved() {
        let s = CapsStructure::new("video/x-raw")
            .with_field("width", RawValueSpec::IntRange { min: 16, max: 1920 })
            .with_field("height", RawValueSpec::Fixed(Value::Int(1080)));
        let names: Vec<&str> = s.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["width", "height"]);
    }

    #[test]
    fn test_display_round_trips_the_canonical_form() {
        let s = CapsStructure::new("video/x-raw")
            .with_field(
                "format",
                RawValueSpec::List(vec![Value::Str("I420".into()), Value::Str("YV12".into())]),
            )
            .with_field("width", RawValueSpec::IntRange { min: 16, max: 1920 })
            .with_field(
                "framerate",
                RawValueSpec::FractionRange {
                    min: Fraction::new(0, 1),
                    max: Fraction::new(100, 1),
                },
            );
        assert_eq!(
            s.to_string(),
            "video/x-raw, format={ (string)I420, (string)YV12 }, \
             width=(int)[ 16, 1920 ], framerate=(fraction)[ 0/1, 100/1 ]"
        );
    }

    #[test]
    fn test_field_lookup() {
        let s = CapsStructure::new("audio/x-raw")
            .with_field("rate", RawValueSpec::IntRange { min: 8000, max: 48000 });
        assert!(s.field("rate").is_some());
        assert!(s.field("channels").is_none());
    }
}
