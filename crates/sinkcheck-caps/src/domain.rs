//! Field-domain normalization
//!
//! Turns one advertised descriptor into bounded candidate domains suitable
//! for manual testing. Unbounded or impractically wide advertisements are
//! reduced here: framerate is pinned, spatial dimensions and sample rates
//! are clamped into windows a human can actually judge on real hardware.

use crate::error::{CapsError, Result};
use crate::structure::{CapsStructure, RawValueSpec};
use crate::value::{Fraction, Value};

/// Window for `width` and `height` candidates.
pub const DIMENSION_WINDOW: (i32, i32) = (120, 1280);

/// Window for audio `rate` candidates.
pub const RATE_WINDOW: (i32, i32) = (4000, 96000);

/// Every framerate domain collapses to this single value.
pub const PINNED_FRAMERATE: Fraction = Fraction::new(25, 1);

/// Candidate values for one field, in sweep order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidates {
    pub name: String,
    pub values: Vec<Value>,
}

impl FieldCandidates {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        FieldCandidates {
            name: name.into(),
            values,
        }
    }
}

/// Normalized domain for one descriptor: the media-type name plus a
/// non-empty candidate list per declared field, in declared order.
///
/// The name acts as a synthetic single-candidate field that sits last in
/// iteration order; it participates in every configuration but never varies.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDomain {
    name: String,
    fields: Vec<FieldCandidates>,
}

impl FieldDomain {
    /// Build a domain, rejecting any field with an empty candidate list.
    pub fn new(name: impl Into<String>, fields: Vec<FieldCandidates>) -> Result<Self> {
        for field in &fields {
            if field.values.is_empty() {
                return Err(CapsError::InvalidDomain {
                    field: field.name.clone(),
                });
            }
        }
        Ok(FieldDomain {
            name: name.into(),
            fields,
        })
    }

    /// Normalize one advertised descriptor.
    ///
    /// Per-field rules, in precedence order:
    /// 1. a field named `framerate` is pinned to `25/1` whatever it advertises;
    /// 2. integer ranges produce `[low, low + (high - low) / 2, high]`, with
    ///    `width`/`height` endpoints clamped into [`DIMENSION_WINDOW`] and
    ///    `rate` endpoints into [`RATE_WINDOW`] first;
    /// 3. fraction ranges on other fields keep their two endpoints;
    /// 4. lists pass through unchanged, fixed values become one candidate.
    pub fn from_structure(structure: &CapsStructure) -> Result<Self> {
        let fields = structure
            .fields()
            .iter()
            .map(|(name, spec)| FieldCandidates::new(name.clone(), candidates_for(name, spec)))
            .collect();
        FieldDomain::new(structure.name(), fields)
    }

    /// Normalize a descriptor list, preserving order.
    pub fn from_structures(structures: &[CapsStructure]) -> Result<Vec<Self>> {
        structures.iter().map(Self::from_structure).collect()
    }

    /// Media-type name (the synthetic trailing field).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields with their candidates, in sweep order.
    pub fn fields(&self) -> &[FieldCandidates] {
        &self.fields
    }
}

fn candidates_for(field: &str, spec: &RawValueSpec) -> Vec<Value> {
    if field == "framerate" {
        return vec![Value::Fraction(PINNED_FRAMERATE)];
    }
    match spec {
        RawValueSpec::Fixed(v) => vec![v.clone()],
        RawValueSpec::List(vs) => vs.clone(),
        RawValueSpec::IntRange { min, max } => {
            let (low, high) = match clamp_window(field) {
                Some((lo, hi)) => ((*min).clamp(lo, hi), (*max).clamp(lo, hi)),
                None => (*min, *max),
            };
            // Widened so the midpoint cannot overflow on extreme spans.
            let mid = (low as i64 + (high as i64 - low as i64) / 2) as i32;
            vec![Value::Int(low), Value::Int(mid), Value::Int(high)]
        }
        RawValueSpec::FractionRange { min, max } => {
            vec![Value::Fraction(*min), Value::Fraction(*max)]
        }
    }
}

fn clamp_window(field: &str) -> Option<(i32, i32)> {
    match field {
        "width" | "height" => Some(DIMENSION_WINDOW),
        "rate" => Some(RATE_WINDOW),
        _ => None,
    }
}
