//! Response normalization.
//!
//! Turns a raw response body into an ordered candidate list. JSON arrays map
//! each element to `(element, element)`, JSON objects map each key to
//! `(key, value)`. Anything that does not parse as a JSON collection is
//! handed back verbatim as markup for the view to render as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One selectable suggestion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub value: String,
    pub label: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Candidate {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Outcome of normalizing a response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    Candidates(Vec<Candidate>),
    /// Not structured data; render verbatim.
    Raw(String),
    /// Structured but empty; render the empty message.
    Empty,
}

/// Result of attempting a structured parse.
#[derive(Clone, Debug, PartialEq)]
pub enum Structured {
    Parsed(Value),
    NotStructured,
}

/// Attempt to parse `raw` as JSON without treating failure as an error.
pub fn try_parse(raw: &str) -> Structured {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Structured::Parsed(value),
        Err(_) => Structured::NotStructured,
    }
}

/// Normalize a response body into candidates.
///
/// `limit == 0` keeps everything, `limit > 0` keeps the first `limit`
/// candidates, `limit < 0` reverses first and then keeps `|limit|`, which
/// selects the last `|limit|` items rendered in reverse.
pub fn normalize(raw: &str, limit: i64) -> Normalized {
    if raw.trim().is_empty() {
        return Normalized::Empty;
    }
    let value = match try_parse(raw) {
        Structured::Parsed(value) => value,
        Structured::NotStructured => return Normalized::Raw(raw.to_string()),
    };

    let candidates: Vec<Candidate> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let text = stringify(item);
                Candidate::new(text.clone(), text)
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| Candidate::new(key.clone(), stringify(value)))
            .collect(),
        // Scalars are not collections; show them as they came.
        _ => return Normalized::Raw(raw.to_string()),
    };

    if candidates.is_empty() {
        return Normalized::Empty;
    }
    Normalized::Candidates(apply_limit(candidates, limit))
}

/// Apply the count/order limit to an already ordered candidate list.
pub fn apply_limit(mut candidates: Vec<Candidate>, limit: i64) -> Vec<Candidate> {
    if limit < 0 {
        candidates.reverse();
    }
    let keep = usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX);
    if keep > 0 {
        candidates.truncate(keep);
    }
    candidates
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
