//! Capabilities a host environment supplies to the engine.
//!
//! The engine never touches a real view, network or clock. A host (a browser
//! binding, a terminal UI, a test double) implements these traits and feeds
//! the resulting events back through [`crate::Autocomplete::handle`].

use std::time::Duration;

use typeahead_engine::Rendering;

use crate::config::Attributes;

/// Position and size of the bound input, in host units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub top: i32,
    pub left: i32,
    /// Client (inner) width.
    pub width: u32,
    /// Outer height.
    pub height: u32,
}

/// Where the results view goes: directly under the input, as wide as it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub top: i32,
    pub left: i32,
    pub width: u32,
}

impl Placement {
    pub fn below(input: Geometry) -> Placement {
        Placement {
            top: input.top.saturating_add_unsigned(input.height),
            left: input.left,
            width: input.width,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Identifies one request epoch. Allocated by the engine, monotonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Debounce before sending a query.
    Query,
    /// Deferred close after the input loses focus.
    BlurClose,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        HttpResponse {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What kind of element the engine is being attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Input { input_type: String },
    Select,
    Other(String),
}

impl ElementKind {
    pub fn text() -> Self {
        ElementKind::Input {
            input_type: "text".to_string(),
        }
    }

    /// Only text and search inputs can carry a typeahead.
    pub fn is_compatible(&self) -> bool {
        match self {
            ElementKind::Input { input_type } => {
                input_type.eq_ignore_ascii_case("text") || input_type.eq_ignore_ascii_case("search")
            }
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ElementKind::Input { input_type } => format!("input[type={}]", input_type),
            ElementKind::Select => "select".to_string(),
            ElementKind::Other(tag) => tag.clone(),
        }
    }
}

/// The results view.
pub trait ViewSurface {
    fn render(&mut self, rendering: &Rendering);
    fn set_active(&mut self, index: Option<usize>);
    fn set_open(&mut self, open: bool);
    fn place(&mut self, placement: Placement);
    /// Remove the view from the host for good.
    fn detach(&mut self);

    /// Selectable entries found in rendered raw markup.
    fn entry_count(&self) -> usize {
        0
    }

    /// Text of a rendered raw markup entry.
    fn entry_text(&self, _index: usize) -> Option<String> {
        None
    }
}

/// The element the engine is bound to.
pub trait BoundInput: Attributes {
    fn element_kind(&self) -> ElementKind;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn geometry(&self) -> Geometry;

    /// Turn off the host's own suggestion UI for the input.
    fn disable_native_autocomplete(&mut self) {}

    /// Hide a bound select and bind a generated search input in its place,
    /// carrying over every `data-autocomplete*` attribute. After success the
    /// host reports the generated input from [`BoundInput::element_kind`].
    fn create_companion_input(&mut self) -> Result<(), String> {
        Err("host does not support select companions".to_string())
    }

    /// Replace the companion select's single option.
    fn replace_companion_option(&mut self, _value: &str, _label: &str) {}
}

/// Sends requests. Completions come back as [`crate::Event::Response`].
pub trait Transport {
    fn send(&mut self, id: RequestId, request: HttpRequest);
    /// Best effort. A completion for an aborted id may still arrive.
    fn abort(&mut self, id: RequestId);
}

/// One-shot timers. Expiry comes back as [`crate::Event::TimerFired`].
pub trait Scheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Everything an attached engine needs from its environment.
pub trait Host: ViewSurface + BoundInput + Transport + Scheduler {}

impl<T> Host for T where T: ViewSurface + BoundInput + Transport + Scheduler {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_sits_under_input() {
        let placement = Placement::below(Geometry {
            top: 10,
            left: 4,
            width: 30,
            height: 3,
        });
        assert_eq!(
            placement,
            Placement {
                top: 13,
                left: 4,
                width: 30
            }
        );
    }

    #[test]
    fn only_text_and_search_inputs_are_compatible() {
        assert!(ElementKind::text().is_compatible());
        assert!(
            ElementKind::Input {
                input_type: "SEARCH".to_string()
            }
            .is_compatible()
        );
        assert!(
            !ElementKind::Input {
                input_type: "checkbox".to_string()
            }
            .is_compatible()
        );
        assert!(!ElementKind::Select.is_compatible());
        assert!(!ElementKind::Other("textarea".to_string()).is_compatible());
    }

    #[test]
    fn success_is_any_2xx() {
        assert!(HttpResponse::ok("").is_success());
        assert!(HttpResponse { status: 204, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 304, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 500, body: String::new() }.is_success());
    }
}
