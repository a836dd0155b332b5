//! One-factor-at-a-time matrix expansion
//!
//! A full cartesian product over the candidate domains explodes far past
//! what a person can sit through, so the sweep varies one field at a time
//! against a fixed baseline: configuration count is the sum of the domain
//! sizes, not their product, and a failure implicates exactly one field.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::FieldDomain;
use crate::error::CapsError;
use crate::parse::parse_structure;
use crate::structure::RawValueSpec;
use crate::value::Value;

/// A fully concrete capability assignment: the media-type name plus one
/// value per field, in domain order.
///
/// Serializes as its canonical caps string and parses back from it, so a
/// persisted record stays readable next to pipeline descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Configuration {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Configuration {
            name: name.into(),
            fields,
        }
    }

    /// Media-type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concrete field assignments in domain order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Look up one field's value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == field)
            .map(|(_, v)| v)
    }

    /// Canonical caps rendering, e.g.
    /// `video/x-raw, width=(int)320, framerate=(fraction)25/1`.
    pub fn to_caps_string(&self) -> String {
        let mut out = self.name.clone();
        for (name, value) in &self.fields {
            out.push_str(", ");
            out.push_str(name);
            out.push('=');
            out.push_str(&value.caps_token());
        }
        out
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_caps_string())
    }
}

impl From<Configuration> for String {
    fn from(config: Configuration) -> String {
        config.to_caps_string()
    }
}

impl TryFrom<String> for Configuration {
    type Error = CapsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let structure = parse_structure(&s)?;
        let mut fields = Vec::with_capacity(structure.fields().len());
        for (name, spec) in structure.fields() {
            match spec {
                RawValueSpec::Fixed(v) => fields.push((name.clone(), v.clone())),
                _ => return Err(CapsError::NotFixed(s)),
            }
        }
        Ok(Configuration::new(structure.name(), fields))
    }
}

/// Expand one domain into its configuration sweep.
///
/// The first field in iteration order is swept through every candidate with
/// the rest held at baseline (the first candidate of each field); every
/// subsequent field then contributes one configuration per non-baseline
/// candidate, overriding that single field. The result is deterministic and
/// cheap enough to recompute on demand; its size is the sum of the domain
/// sizes minus the number of trailing fields.
pub fn expand(domain: &FieldDomain) -> Vec<Configuration> {
    let fields = domain.fields();
    if fields.is_empty() {
        return vec![Configuration::new(domain.name(), Vec::new())];
    }

    let baseline: Vec<(String, Value)> = fields
        .iter()
        .map(|f| (f.name.clone(), f.values[0].clone()))
        .collect();

    let mut out = Vec::new();
    for value in &fields[0].values {
        let mut assignment = baseline.clone();
        assignment[0].1 = value.clone();
        out.push(Configuration::new(domain.name(), assignment));
    }
    for (index, field) in fields.iter().enumerate().skip(1) {
        for value in field.values.iter().skip(1) {
            let mut assignment = baseline.clone();
            assignment[index].1 = value.clone();
            out.push(Configuration::new(domain.name(), assignment));
        }
    }
    out
}

/// Expand several domains and concatenate in order.
pub fn expand_all<'a, I>(domains: I) -> Vec<Configuration>
where
    I: IntoIterator<Item = &'a FieldDomain>,
{
    domains.into_iter().flat_map(expand).collect()
}
