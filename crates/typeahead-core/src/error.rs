//! Error types for typeahead core.

use thiserror::Error;
use typeahead_engine::EngineError;

/// Invalid configuration. Fatal: an instance built from it never attaches.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("rule '{rule}': {source}")]
    Rule {
        rule: String,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Mapping(#[from] EngineError),

    #[error("rule '{rule}': unknown behavior '{behavior}'")]
    UnknownBehavior { rule: String, behavior: String },

    #[error("rule '{rule}': unknown operator '{operator}'")]
    UnknownOperator { rule: String, operator: String },

    #[error("rule '{rule}', condition {index}: {reason}")]
    InvalidCondition {
        rule: String,
        index: usize,
        reason: String,
    },

    #[error("too many mapping rules: {count} (max {max})")]
    TooManyRules { count: usize, max: usize },

    #[error("rule '{rule}': too many conditions: {count} (max {max})")]
    TooManyConditions {
        rule: String,
        count: usize,
        max: usize,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The target element cannot host a typeahead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("element not valid for autocomplete: {element}")]
    Incompatible { element: String },

    #[error("cannot pair select element with an input: {reason}")]
    CompanionUnavailable { reason: String },
}

/// A request that did not produce a usable response. Always absorbed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request aborted")]
    Aborted,

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Errors that prevent an instance from becoming operative.
#[derive(Error, Debug)]
pub enum TypeaheadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Attach(#[from] AttachError),
}

pub type Result<T> = std::result::Result<T, TypeaheadError>;
