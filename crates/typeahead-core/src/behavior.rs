//! Behaviors bound to mapping rules.
//!
//! Each behavior is a plain function from an explicit [`EngineState`]
//! snapshot and the keystroke to a list of [`Effect`]s. The session applies
//! the effects; behaviors never mutate anything themselves.

use std::fmt;
use std::sync::Arc;

use typeahead_engine::{Direction, KeyEvent, Rendering};

/// Read-only view of one engine instance, handed to behaviors.
#[derive(Clone, Copy, Debug)]
pub struct EngineState<'a> {
    pub input_value: &'a str,
    pub last_committed: Option<&'a str>,
    pub open: bool,
    pub rendering: &'a Rendering,
    pub active: Option<usize>,
}

/// A state change requested by a behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Navigate(Direction),
    Select(usize),
    Close,
    /// Start (or restart) the debounce for this query text.
    Trigger(String),
    /// Drop the pending query and whatever is rendered.
    ClearResults,
    /// Ask the host to suppress the key's default action (e.g. form submit).
    PreventDefault,
}

type Callback = dyn Fn(&EngineState<'_>, KeyEvent) -> Vec<Effect> + Send + Sync;

/// A consumer-supplied behavior.
#[derive(Clone)]
pub struct CustomBehavior {
    name: String,
    callback: Arc<Callback>,
}

impl CustomBehavior {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&EngineState<'_>, KeyEvent) -> Vec<Effect> + Send + Sync + 'static,
    {
        CustomBehavior {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, state: &EngineState<'_>, key: KeyEvent) -> Vec<Effect> {
        (self.callback)(state, key)
    }
}

impl fmt::Debug for CustomBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomBehavior")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomBehavior {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.callback, &other.callback)
    }
}

/// What a mapping rule does when it matches.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Commit the active entry, but only while the results view is open.
    ToggleSelectOnEnter,
    /// Up/Down arrow navigation; the direction comes from the key.
    NavigateList,
    /// Navigation in a fixed direction, whatever the key.
    Navigate(Direction),
    TriggerQuery,
    Close,
    Custom(CustomBehavior),
}

impl Behavior {
    /// Config-file name of a built-in behavior.
    pub fn name(&self) -> String {
        match self {
            Behavior::ToggleSelectOnEnter => "toggle_select_on_enter".to_string(),
            Behavior::NavigateList => "navigate_list".to_string(),
            Behavior::Navigate(Direction::Next) => "navigate_next".to_string(),
            Behavior::Navigate(Direction::Previous) => "navigate_previous".to_string(),
            Behavior::TriggerQuery => "trigger_query".to_string(),
            Behavior::Close => "close".to_string(),
            Behavior::Custom(custom) => format!("custom:{}", custom.name()),
        }
    }

    /// Resolve a built-in behavior by its config-file name.
    pub fn builtin(name: &str) -> Option<Behavior> {
        match name.trim().to_ascii_lowercase().as_str() {
            "toggle_select_on_enter" | "select" => Some(Behavior::ToggleSelectOnEnter),
            "navigate_list" => Some(Behavior::NavigateList),
            "navigate_next" => Some(Behavior::Navigate(Direction::Next)),
            "navigate_previous" => Some(Behavior::Navigate(Direction::Previous)),
            "trigger_query" => Some(Behavior::TriggerQuery),
            "close" => Some(Behavior::Close),
            _ => None,
        }
    }

    pub fn apply(&self, state: &EngineState<'_>, key: KeyEvent) -> Vec<Effect> {
        match self {
            Behavior::ToggleSelectOnEnter => toggle_select_on_enter(state, key),
            Behavior::NavigateList => navigate_list(state, key),
            Behavior::Navigate(direction) => navigate(state, *direction),
            Behavior::TriggerQuery => trigger_query(state, key),
            Behavior::Close => close(state, key),
            Behavior::Custom(custom) => custom.call(state, key),
        }
    }
}

pub fn toggle_select_on_enter(state: &EngineState<'_>, _key: KeyEvent) -> Vec<Effect> {
    if !state.open {
        return Vec::new();
    }
    let mut effects = Vec::new();
    if let Some(index) = state.active {
        effects.push(Effect::Select(index));
    }
    effects.push(Effect::PreventDefault);
    effects
}

pub fn navigate_list(state: &EngineState<'_>, key: KeyEvent) -> Vec<Effect> {
    match Direction::from_key_code(key.code) {
        Some(direction) => navigate(state, direction),
        None => Vec::new(),
    }
}

pub fn navigate(state: &EngineState<'_>, direction: Direction) -> Vec<Effect> {
    if state.rendering.is_empty() {
        return Vec::new();
    }
    vec![Effect::Navigate(direction)]
}

pub fn trigger_query(state: &EngineState<'_>, _key: KeyEvent) -> Vec<Effect> {
    if state.input_value.is_empty() {
        vec![Effect::ClearResults]
    } else {
        vec![Effect::Trigger(state.input_value.to_string())]
    }
}

pub fn close(state: &EngineState<'_>, _key: KeyEvent) -> Vec<Effect> {
    if state.open {
        vec![Effect::Close]
    } else {
        Vec::new()
    }
}
