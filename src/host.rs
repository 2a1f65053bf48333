//! Host implementation shared by the terminal UI and headless mode.
//!
//! The bound "element" is a single-line text buffer. Command-line options
//! play the role of its attributes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use typeahead_core::{
    Attributes, BoundInput, ElementKind, Geometry, HttpRequest, Placement, RequestId, Scheduler, TimerId, TimerKind,
    Transport, ViewSurface,
};
use typeahead_engine::Rendering;

use crate::markup;
use crate::timers::Timers;
use crate::transport::Outbox;

/// Editable single-line buffer with a cursor (in chars).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// Results view state as last pushed by the engine.
#[derive(Debug, Default)]
pub struct View {
    pub rendering: Rendering,
    /// Entry texts for raw markup renderings.
    pub raw_entries: Vec<String>,
    pub active: Option<usize>,
    pub open: bool,
    pub placement: Placement,
}

impl View {
    /// Display lines for the current rendering, one per entry.
    pub fn lines(&self) -> Vec<String> {
        match &self.rendering {
            Rendering::Nothing => Vec::new(),
            Rendering::Candidates(list) => list.iter().map(|c| c.label.clone()).collect(),
            Rendering::Raw { markup, .. } if self.raw_entries.is_empty() => {
                markup.lines().map(str::to_string).collect()
            }
            Rendering::Raw { .. } => self.raw_entries.clone(),
            Rendering::Empty { message } => vec![message.clone()],
        }
    }
}

pub struct TerminalHost {
    pub input: LineInput,
    pub view: View,
    pub timers: Timers,
    pub outbox: Outbox,
    attributes: HashMap<String, String>,
    geometry: Geometry,
}

impl TerminalHost {
    pub fn new(attributes: HashMap<String, String>, outbox: Outbox) -> Self {
        TerminalHost {
            input: LineInput::default(),
            view: View::default(),
            timers: Timers::new(),
            outbox,
            attributes,
            geometry: Geometry::default(),
        }
    }

    /// Returns whether the geometry changed.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        let changed = self.geometry != geometry;
        self.geometry = geometry;
        changed
    }
}

impl Attributes for TerminalHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

impl BoundInput for TerminalHost {
    fn element_kind(&self) -> ElementKind {
        ElementKind::text()
    }

    fn value(&self) -> String {
        self.input.text().to_string()
    }

    fn set_value(&mut self, value: &str) {
        self.input.set(value);
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }
}

impl ViewSurface for TerminalHost {
    fn render(&mut self, rendering: &Rendering) {
        self.view.raw_entries = match rendering {
            Rendering::Raw { markup, .. } => markup::entries(markup),
            _ => Vec::new(),
        };
        self.view.rendering = rendering.clone();
    }

    fn set_active(&mut self, index: Option<usize>) {
        self.view.active = index;
    }

    fn set_open(&mut self, open: bool) {
        self.view.open = open;
    }

    fn place(&mut self, placement: Placement) {
        self.view.placement = placement;
    }

    fn detach(&mut self) {
        self.view = View::default();
    }

    fn entry_count(&self) -> usize {
        self.view.raw_entries.len()
    }

    fn entry_text(&self, index: usize) -> Option<String> {
        self.view.raw_entries.get(index).cloned()
    }
}

impl Transport for TerminalHost {
    fn send(&mut self, id: RequestId, request: HttpRequest) {
        self.outbox.send(id, request);
    }

    fn abort(&mut self, id: RequestId) {
        self.outbox.abort(id);
    }
}

impl Scheduler for TerminalHost {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.timers.schedule_at(kind, Instant::now(), delay)
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }
}
