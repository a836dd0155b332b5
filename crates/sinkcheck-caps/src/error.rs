//! Error types for capability parsing and domain construction

use thiserror::Error;

/// Errors surfaced by the caps layer
#[derive(Error, Debug)]
pub enum CapsError {
    /// Input that does not follow the caps text grammar
    #[error("Caps parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A field whose normalized candidate list came out empty
    #[error("Invalid domain: field '{field}' has no candidate values")]
    InvalidDomain { field: String },

    /// Text that parsed, but does not describe a single fully-fixed structure
    #[error("Not a fixed configuration: {0}")]
    NotFixed(String),
}

/// Result type for caps operations
pub type Result<T> = std::result::Result<T, CapsError>;
