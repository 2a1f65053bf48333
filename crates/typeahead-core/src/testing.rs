//! In-memory host used by the unit tests.

use std::collections::HashMap;
use std::time::Duration;

use typeahead_engine::Rendering;

use crate::config::Attributes;
use crate::host::{
    BoundInput, ElementKind, Geometry, HttpRequest, Placement, RequestId, Scheduler, TimerId, TimerKind, Transport,
    ViewSurface,
};

pub struct MockHost {
    pub kind: ElementKind,
    pub value: String,
    pub attributes: HashMap<String, String>,
    pub companion_supported: bool,
    pub companion_created: bool,
    pub companion_option: Option<(String, String)>,
    pub native_autocomplete: bool,
    pub next_timer: u64,
    /// Live timers with the delay they were scheduled for.
    pub timers: Vec<(TimerId, TimerKind, Duration)>,
    pub sent: Vec<(RequestId, HttpRequest)>,
    pub aborted: Vec<RequestId>,
    pub rendered: Vec<Rendering>,
    pub active: Option<usize>,
    pub open: bool,
    pub placements: Vec<Placement>,
    pub raw_entries: Vec<String>,
    pub detached: bool,
}

impl Default for MockHost {
    fn default() -> Self {
        MockHost {
            kind: ElementKind::text(),
            value: String::new(),
            attributes: HashMap::new(),
            companion_supported: false,
            companion_created: false,
            companion_option: None,
            native_autocomplete: true,
            next_timer: 0,
            timers: Vec::new(),
            sent: Vec::new(),
            aborted: Vec::new(),
            rendered: Vec::new(),
            active: None,
            open: false,
            placements: Vec::new(),
            raw_entries: Vec::new(),
            detached: false,
        }
    }
}

impl MockHost {
    pub fn with_url(url: &str) -> Self {
        let mut host = MockHost::default();
        host.attributes.insert(crate::config::ATTR_URL.to_string(), url.to_string());
        host
    }

    /// Latest live timer of `kind`.
    pub fn timer(&self, kind: TimerKind) -> Option<TimerId> {
        self.timers.iter().rev().find(|(_, k, _)| *k == kind).map(|(id, _, _)| *id)
    }

    /// Delay the latest live timer of `kind` was scheduled with.
    pub fn delay_of(&self, kind: TimerKind) -> Option<Duration> {
        self.timers.iter().rev().find(|(_, k, _)| *k == kind).map(|(_, _, delay)| *delay)
    }

    /// Take the latest live timer of `kind` off the schedule, as a real
    /// scheduler does when a one-shot timer fires.
    pub fn expire(&mut self, kind: TimerKind) -> Option<TimerId> {
        let id = self.timer(kind)?;
        self.timers.retain(|(t, _, _)| *t != id);
        Some(id)
    }
}

impl Attributes for MockHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

impl BoundInput for MockHost {
    fn element_kind(&self) -> ElementKind {
        self.kind.clone()
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            top: 2,
            left: 5,
            width: 40,
            height: 3,
        }
    }

    fn disable_native_autocomplete(&mut self) {
        self.native_autocomplete = false;
    }

    fn create_companion_input(&mut self) -> Result<(), String> {
        if !self.companion_supported {
            return Err("no room for a companion input".to_string());
        }
        self.companion_created = true;
        self.kind = ElementKind::Input {
            input_type: "search".to_string(),
        };
        Ok(())
    }

    fn replace_companion_option(&mut self, value: &str, label: &str) {
        self.companion_option = Some((value.to_string(), label.to_string()));
    }
}

impl ViewSurface for MockHost {
    fn render(&mut self, rendering: &Rendering) {
        self.rendered.push(rendering.clone());
    }

    fn set_active(&mut self, index: Option<usize>) {
        self.active = index;
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    fn place(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    fn detach(&mut self) {
        self.detached = true;
    }

    fn entry_count(&self) -> usize {
        self.raw_entries.len()
    }

    fn entry_text(&self, index: usize) -> Option<String> {
        self.raw_entries.get(index).cloned()
    }
}

impl Transport for MockHost {
    fn send(&mut self, id: RequestId, request: HttpRequest) {
        self.sent.push((id, request));
    }

    fn abort(&mut self, id: RequestId) {
        self.aborted.push(id);
    }
}

impl Scheduler for MockHost {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.timers.push((id, kind, delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|(t, _, _)| *t != id);
    }
}
