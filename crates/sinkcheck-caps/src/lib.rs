//! Capability descriptor model and test-matrix expansion
//!
//! Pure, synchronous core of the harness: parse advertised sink caps into
//! descriptors, normalize each descriptor's fields into bounded candidate
//! domains, and expand the domains into a one-factor-at-a-time sweep of
//! concrete configurations.

pub mod domain;
pub mod error;
pub mod matrix;
pub mod parse;
pub mod structure;
pub mod value;

pub use domain::{
    FieldCandidates, FieldDomain, DIMENSION_WINDOW, PINNED_FRAMERATE, RATE_WINDOW,
};
pub use error::{CapsError, Result};
pub use matrix::{expand, expand_all, Configuration};
pub use parse::{parse_caps, parse_structure, parse_value};
pub use structure::{CapsStructure, RawValueSpec};
pub use value::{Fraction, Value};
