//! Error types for the typeahead engine.

use thiserror::Error;

/// Errors raised while building engine primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("inverted key range {from}..={to}")]
    InvertedRange { from: u32, to: u32 },

    #[error("duplicate mapping rule '{0}'")]
    DuplicateRule(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
