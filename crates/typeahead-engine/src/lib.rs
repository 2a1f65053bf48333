//! typeahead_engine - Keystroke classification, response normalization and
//! list navigation for typeahead inputs.
//!
//! Everything here is pure: no timers, no I/O, no view. The stateful engine
//! that drives these pieces lives in `typeahead-core`.

pub mod error;
pub mod keys;
pub mod mapping;
pub mod navigation;
pub mod normalize;

pub use error::{EngineError, Result};
pub use keys::{ConditionKind, KeyCondition, KeyEvent, NAVIGATION_KEYS, codes, evaluate, parse_key_code};
pub use mapping::{MappingRule, MappingSet, Operator, dispatch};
pub use navigation::{Direction, NavigationState, Rendering};
pub use normalize::{Candidate, Normalized, Structured, normalize, try_parse};
