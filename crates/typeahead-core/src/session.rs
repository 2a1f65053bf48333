//! One attached input: the event-driven interaction engine.
//!
//! The host turns its native events into [`Event`]s and passes them to
//! [`Autocomplete::handle`], one at a time. Keystrokes go through the
//! mapping dispatcher, matched behaviors produce effects, and the effects
//! drive the request pipeline, the navigation state and the view.
//!
//! Whether the results view is open is derived, never set directly: it is
//! open while the input has focus, its text differs from the last committed
//! value, something is rendered, and the user has not dismissed it.

use tracing::{debug, info};
use typeahead_engine::{Direction, KeyEvent, NavigationState, Rendering, normalize};

use crate::behavior::{Behavior, Effect, EngineState};
use crate::config::EngineConfig;
use crate::error::TransportError;
use crate::host::{Host, HttpResponse, Placement, RequestId, TimerId, TimerKind};
use crate::pipeline::{Completion, RequestPipeline};

/// Everything that can happen to an attached input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Focus,
    Blur,
    Key(KeyEvent),
    /// A rendered entry was clicked.
    Click(usize),
    /// Input geometry may have changed (resize, scroll).
    Reposition,
    TimerFired(TimerId),
    Response {
        id: RequestId,
        result: Result<HttpResponse, TransportError>,
    },
    Destroy,
}

/// What the host should do with the native event after handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Disposition {
    pub prevent_default: bool,
}

/// An engine instance bound to one input.
pub struct Autocomplete<H: Host> {
    host: H,
    config: EngineConfig,
    pipeline: RequestPipeline,
    navigation: NavigationState,
    rendering: Rendering,
    last_committed: Option<String>,
    companion: bool,
    focused: bool,
    dismissed: bool,
    open: bool,
    blur_timer: Option<TimerId>,
    destroyed: bool,
}

impl<H: Host> Autocomplete<H> {
    /// Wrap an already validated host and config. See [`crate::attach`].
    pub(crate) fn new(host: H, config: EngineConfig, companion: bool) -> Self {
        Autocomplete {
            host,
            config,
            pipeline: RequestPipeline::new(),
            navigation: NavigationState::new(),
            rendering: Rendering::Nothing,
            last_committed: None,
            companion,
            focused: false,
            dismissed: false,
            open: false,
            blur_timer: None,
            destroyed: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rendering(&self) -> &Rendering {
        &self.rendering
    }

    pub fn active(&self) -> Option<usize> {
        self.navigation.active()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn last_committed(&self) -> Option<&str> {
        self.last_committed.as_deref()
    }

    pub fn has_companion(&self) -> bool {
        self.companion
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Handle one event. Never fails: transport and parse problems are
    /// absorbed here.
    pub fn handle(&mut self, event: Event) -> Disposition {
        if self.destroyed {
            debug!(?event, "ignoring event after destroy");
            return Disposition::default();
        }
        let mut disposition = Disposition::default();
        match event {
            Event::Focus => self.on_focus(),
            Event::Blur => self.on_blur(),
            Event::Key(key) => self.on_key(key, &mut disposition),
            Event::Click(index) => {
                self.select(index);
            }
            Event::Reposition => self.reposition(),
            Event::TimerFired(timer) => self.on_timer(timer),
            Event::Response { id, result } => self.on_response(id, result),
            Event::Destroy => self.destroy(),
        }
        disposition
    }

    /// Recompute the results view placement from the input geometry.
    pub fn reposition(&mut self) {
        let placement = Placement::below(self.host.geometry());
        self.host.place(placement);
    }

    fn on_focus(&mut self) {
        if let Some(timer) = self.blur_timer.take() {
            self.host.cancel(timer);
        }
        self.focused = true;
        self.dismissed = false;
        self.refresh_open();
    }

    fn on_blur(&mut self) {
        // Closing is deferred so a click on an entry, which blurs the input
        // first, still lands on an open list.
        if let Some(timer) = self.blur_timer.take() {
            self.host.cancel(timer);
        }
        let timer = self.host.schedule(TimerKind::BlurClose, self.config.blur_delay());
        self.blur_timer = Some(timer);
    }

    fn on_key(&mut self, key: KeyEvent, disposition: &mut Disposition) {
        self.focused = true;
        let matched: Vec<Behavior> = self
            .config
            .mappings()
            .dispatch(key)
            .map(|rule| {
                debug!(rule = %rule.name, code = key.code, "mapping matched");
                rule.behavior.clone()
            })
            .collect();

        for behavior in matched {
            let input_value = self.host.value();
            let effects = {
                let state = EngineState {
                    input_value: &input_value,
                    last_committed: self.last_committed.as_deref(),
                    open: self.open,
                    rendering: &self.rendering,
                    active: self.navigation.active(),
                };
                behavior.apply(&state, key)
            };
            for effect in effects {
                self.apply(effect, disposition);
            }
        }
    }

    fn apply(&mut self, effect: Effect, disposition: &mut Disposition) {
        match effect {
            Effect::Navigate(direction) => self.navigate(direction),
            Effect::Select(index) => {
                self.select(index);
            }
            Effect::Close => {
                self.dismissed = true;
                self.refresh_open();
            }
            Effect::Trigger(query) => {
                self.dismissed = false;
                self.pipeline.trigger(&mut self.host, query, self.config.delay());
                self.refresh_open();
            }
            Effect::ClearResults => {
                self.pipeline.cancel(&mut self.host);
                self.set_rendering(Rendering::Nothing);
            }
            Effect::PreventDefault => disposition.prevent_default = true,
        }
    }

    /// Move the highlight one step.
    pub fn navigate(&mut self, direction: Direction) {
        let active = self.navigation.navigate(&self.rendering, direction);
        self.host.set_active(active);
    }

    /// Commit entry `index` into the input. Locked and missing entries are
    /// ignored. Returns whether a value was committed.
    pub fn select(&mut self, index: usize) -> bool {
        if self.rendering.is_locked(index) {
            return false;
        }
        let (value, label) = match &self.rendering {
            Rendering::Candidates(list) => match list.get(index) {
                Some(candidate) => (candidate.value.clone(), candidate.label.clone()),
                None => return false,
            },
            Rendering::Raw { .. } => match self.host.entry_text(index) {
                Some(text) => (text.clone(), text),
                None => return false,
            },
            Rendering::Nothing | Rendering::Empty { .. } => return false,
        };

        info!(value = %value, "candidate committed");
        self.host.set_value(&value);
        if self.companion {
            self.host.replace_companion_option(&value, &label);
        }
        self.last_committed = Some(value);
        self.dismissed = true;
        self.refresh_open();
        true
    }

    fn on_timer(&mut self, timer: TimerId) {
        if self.blur_timer == Some(timer) {
            self.blur_timer = None;
            self.focused = false;
            self.refresh_open();
            return;
        }
        if self.pipeline.owns_timer(timer) {
            self.pipeline.fire(timer, &mut self.host, &self.config);
            return;
        }
        debug!(?timer, "ignoring unknown timer");
    }

    fn on_response(&mut self, id: RequestId, result: Result<HttpResponse, TransportError>) {
        match self.pipeline.complete(id, result) {
            Completion::Delivered(body) => {
                let normalized = normalize(&body, self.config.limit());
                debug!(?id, shape = shape_name(&normalized), "response normalized");
                let rendering = Rendering::from_normalized(normalized, self.config.empty_message());
                self.set_rendering(rendering);
            }
            Completion::Failed(err) => {
                debug!(?id, error = %err, "query failed; keeping current results");
            }
            Completion::Stale => {}
        }
    }

    fn set_rendering(&mut self, rendering: Rendering) {
        self.rendering = rendering;
        self.host.render(&self.rendering);
        if let Rendering::Raw { entries, .. } = &mut self.rendering {
            *entries = self.host.entry_count();
        }
        self.navigation.reset();
        self.host.set_active(None);
        self.refresh_open();
    }

    fn refresh_open(&mut self) {
        let value = self.host.value();
        let should_open = !self.destroyed
            && self.focused
            && !self.dismissed
            && self.rendering.is_showable()
            && self.last_committed.as_deref() != Some(value.as_str());
        if should_open != self.open {
            self.open = should_open;
            self.host.set_open(should_open);
        }
    }

    fn destroy(&mut self) {
        info!("destroying typeahead instance");
        self.pipeline.cancel(&mut self.host);
        if let Some(timer) = self.blur_timer.take() {
            self.host.cancel(timer);
        }
        self.open = false;
        self.host.detach();
        self.destroyed = true;
    }
}

fn shape_name(normalized: &typeahead_engine::Normalized) -> &'static str {
    match normalized {
        typeahead_engine::Normalized::Candidates(_) => "candidates",
        typeahead_engine::Normalized::Raw(_) => "raw",
        typeahead_engine::Normalized::Empty => "empty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ATTR_URL, InstanceConfig};
    use crate::testing::MockHost;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use typeahead_engine::{Candidate, codes};

    fn engine() -> Autocomplete<MockHost> {
        let mut host = MockHost::default();
        host.attributes.insert(ATTR_URL.to_string(), "/search".to_string());
        let config = EngineConfig::resolve(&InstanceConfig::new(), &host).expect("config");
        Autocomplete::new(host, config, false)
    }

    fn type_text(engine: &mut Autocomplete<MockHost>, text: &str) {
        engine.host_mut().value = text.to_string();
        let code = text.chars().last().and_then(typeahead_engine::keys::char_code).unwrap_or(65);
        engine.handle(Event::Key(KeyEvent::new(code)));
    }

    fn fire(engine: &mut Autocomplete<MockHost>, kind: TimerKind) -> TimerId {
        let timer = engine.host_mut().expire(kind).expect("live timer");
        engine.handle(Event::TimerFired(timer));
        timer
    }

    fn fire_query(engine: &mut Autocomplete<MockHost>) -> RequestId {
        fire(engine, TimerKind::Query);
        engine.host().sent.last().expect("request sent").0
    }

    fn respond(engine: &mut Autocomplete<MockHost>, id: RequestId, body: &str) {
        engine.handle(Event::Response {
            id,
            result: Ok(HttpResponse::ok(body)),
        });
    }

    const FRUITS: &str = r#"{"a":"Apple","b":"Banana","c":"Cherry"}"#;

    #[test]
    fn typing_debounces_into_one_request() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        type_text(&mut engine, "ap");
        type_text(&mut engine, "app");

        let query_timers: Vec<_> = engine
            .host()
            .timers
            .iter()
            .filter(|(_, k, _)| *k == TimerKind::Query)
            .collect();
        assert_eq!(query_timers.len(), 1);
        assert_eq!(engine.host().delay_of(TimerKind::Query), Some(engine.config().delay()));
        assert_eq!(engine.config().delay(), Duration::from_millis(150));

        let id = fire_query(&mut engine);
        assert_eq!(engine.host().sent.len(), 1);
        assert_eq!(engine.host().sent[0].1.url, "/search?q=app");
        assert_eq!(id, RequestId(1));
    }

    #[test]
    fn response_renders_and_opens_view() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);

        assert_eq!(
            engine.rendering(),
            &Rendering::Candidates(vec![
                Candidate::new("a", "Apple"),
                Candidate::new("b", "Banana"),
                Candidate::new("c", "Cherry"),
            ])
        );
        assert!(engine.is_open());
        assert!(engine.host().open);
        assert_eq!(engine.active(), None);
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let first = fire_query(&mut engine);
        type_text(&mut engine, "ab");
        let second = fire_query(&mut engine);

        assert_eq!(engine.host().aborted, vec![first]);

        respond(&mut engine, first, r#"["stale"]"#);
        assert_eq!(engine.rendering(), &Rendering::Nothing);
        assert!(engine.host().rendered.is_empty());

        respond(&mut engine, second, r#"["fresh"]"#);
        assert_eq!(
            engine.rendering(),
            &Rendering::Candidates(vec![Candidate::new("fresh", "fresh")])
        );
    }

    #[test]
    fn failed_response_keeps_previous_results() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);

        type_text(&mut engine, "ap");
        let id = fire_query(&mut engine);
        engine.handle(Event::Response {
            id,
            result: Ok(HttpResponse {
                status: 500,
                body: "boom".to_string(),
            }),
        });
        assert_eq!(engine.rendering().len(), 3);
        assert_eq!(engine.host().rendered.len(), 1);
    }

    #[test]
    fn arrows_navigate_and_enter_commits() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);

        engine.handle(Event::Key(KeyEvent::new(codes::DOWN)));
        engine.handle(Event::Key(KeyEvent::new(codes::DOWN)));
        assert_eq!(engine.active(), Some(1));
        engine.handle(Event::Key(KeyEvent::new(codes::UP)));
        engine.handle(Event::Key(KeyEvent::new(codes::UP)));
        assert_eq!(engine.active(), Some(2));
        assert_eq!(engine.host().active, Some(2));

        let disposition = engine.handle(Event::Key(KeyEvent::new(codes::ENTER)));
        assert!(disposition.prevent_default);
        assert_eq!(engine.host().value, "c");
        assert_eq!(engine.last_committed(), Some("c"));
        assert!(!engine.is_open());
        // Arrow keys never start a query.
        assert_eq!(engine.host().sent.len(), 1);
    }

    #[test]
    fn enter_with_closed_view_is_left_alone() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        let disposition = engine.handle(Event::Key(KeyEvent::new(codes::ENTER)));
        assert_eq!(disposition, Disposition::default());
        assert!(engine.host().timers.is_empty());
    }

    #[test]
    fn empty_message_is_shown_but_never_selectable() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "zz");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, "[]");

        assert_eq!(
            engine.rendering(),
            &Rendering::Empty {
                message: "No result here".to_string()
            }
        );
        assert!(engine.is_open());
        engine.handle(Event::Key(KeyEvent::new(codes::DOWN)));
        assert_eq!(engine.active(), None);
        assert!(!engine.select(0));
        engine.handle(Event::Click(0));
        assert_eq!(engine.host().value, "zz");
    }

    #[test]
    fn raw_markup_entries_come_from_the_view() {
        let mut engine = engine();
        engine.host_mut().raw_entries = vec!["one".to_string(), "two".to_string()];
        engine.handle(Event::Focus);
        type_text(&mut engine, "o");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, "<li>one</li><li>two</li>");

        assert_eq!(engine.rendering().len(), 2);
        engine.handle(Event::Click(1));
        assert_eq!(engine.host().value, "two");
    }

    #[test]
    fn blur_closes_after_delay_and_focus_cancels() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);
        assert!(engine.is_open());

        engine.handle(Event::Blur);
        assert!(engine.is_open());
        assert_eq!(engine.host().delay_of(TimerKind::BlurClose), Some(engine.config().blur_delay()));

        // A click between blur and the deferred close still lands.
        engine.handle(Event::Click(0));
        assert_eq!(engine.host().value, "a");

        fire(&mut engine, TimerKind::BlurClose);
        assert!(!engine.is_open());
        assert_eq!(engine.host().timer(TimerKind::BlurClose), None);

        engine.host_mut().value = "b".to_string();
        engine.handle(Event::Blur);
        engine.handle(Event::Focus);
        assert_eq!(engine.host().timer(TimerKind::BlurClose), None);
        assert!(engine.is_open());
    }

    #[test]
    fn configured_delays_reach_the_scheduler() {
        let instance = InstanceConfig {
            blur_delay_ms: Some(75),
            ..InstanceConfig::new().with_url("/s").with_delay_ms(400)
        };
        let host = MockHost::default();
        let config = EngineConfig::resolve(&instance, &host).expect("config");
        assert_eq!(config.delay(), Duration::from_millis(400));
        let mut engine = Autocomplete::new(host, config, false);

        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        type_text(&mut engine, "ab");
        assert_eq!(engine.host().delay_of(TimerKind::Query), Some(Duration::from_millis(400)));

        engine.handle(Event::Blur);
        assert_eq!(engine.host().delay_of(TimerKind::BlurClose), Some(Duration::from_millis(75)));
    }

    #[test]
    fn refocus_cancels_pending_blur_close() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);

        engine.handle(Event::Blur);
        let blur = engine.host().timer(TimerKind::BlurClose).expect("blur timer");
        engine.handle(Event::Focus);
        assert_eq!(engine.host().timer(TimerKind::BlurClose), None);

        // A host that delivers the cancelled timer anyway changes nothing.
        engine.handle(Event::TimerFired(blur));
        assert!(engine.is_open());
    }

    #[test]
    fn escape_closes_when_bound() {
        use crate::config::{ConditionSpec, MappingSpec};

        let instance = InstanceConfig::new().with_url("/s").with_mappings(vec![
            MappingSpec {
                name: "Letters".to_string(),
                operator: None,
                behavior: "trigger_query".to_string(),
                conditions: vec![ConditionSpec::range(48, 90)],
            },
            MappingSpec {
                name: "Escape".to_string(),
                operator: None,
                behavior: "close".to_string(),
                conditions: vec![ConditionSpec::is(codes::ESCAPE)],
            },
        ]);
        let host = MockHost::default();
        let config = EngineConfig::resolve(&instance, &host).expect("config");
        let mut engine = Autocomplete::new(host, config, false);

        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);
        assert!(engine.is_open());

        engine.handle(Event::Key(KeyEvent::new(codes::ESCAPE)));
        assert!(!engine.is_open());
    }

    #[test]
    fn clearing_input_cancels_and_clears() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);

        type_text(&mut engine, "ab");
        let in_flight = fire_query(&mut engine);
        engine.host_mut().value.clear();
        engine.handle(Event::Key(KeyEvent::new(codes::BACKSPACE)));

        assert_eq!(engine.host().aborted, vec![in_flight]);
        assert_eq!(engine.rendering(), &Rendering::Nothing);
        assert!(!engine.is_open());
        respond(&mut engine, in_flight, FRUITS);
        assert_eq!(engine.rendering(), &Rendering::Nothing);
    }

    #[test]
    fn committed_value_does_not_reopen_on_focus() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);
        engine.handle(Event::Click(1));
        assert_eq!(engine.host().value, "b");

        engine.handle(Event::Blur);
        fire(&mut engine, TimerKind::BlurClose);
        engine.handle(Event::Focus);
        assert!(!engine.is_open());
    }

    #[test]
    fn companion_option_follows_selection() {
        let mut host = MockHost::default();
        host.attributes.insert(ATTR_URL.to_string(), "/s".to_string());
        let config = EngineConfig::resolve(&InstanceConfig::new(), &host).expect("config");
        let mut engine = Autocomplete::new(host, config, true);

        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        respond(&mut engine, id, FRUITS);
        engine.handle(Event::Click(0));
        assert_eq!(
            engine.host().companion_option,
            Some(("a".to_string(), "Apple".to_string()))
        );
    }

    #[test]
    fn reposition_places_view_below_input() {
        let mut engine = engine();
        engine.handle(Event::Reposition);
        assert_eq!(
            engine.host().placements,
            vec![Placement {
                top: 5,
                left: 5,
                width: 40
            }]
        );
    }

    #[test]
    fn destroy_cancels_everything_and_ignores_later_events() {
        let mut engine = engine();
        engine.handle(Event::Focus);
        type_text(&mut engine, "a");
        let id = fire_query(&mut engine);
        type_text(&mut engine, "ab");
        engine.handle(Event::Blur);

        engine.handle(Event::Destroy);
        assert!(engine.host().detached);
        assert!(engine.host().timers.is_empty());
        assert_eq!(engine.host().aborted, vec![id]);
        assert!(engine.is_destroyed());

        respond(&mut engine, id, FRUITS);
        engine.handle(Event::Key(KeyEvent::new(65)));
        assert_eq!(engine.rendering(), &Rendering::Nothing);
        assert!(engine.host().timers.is_empty());
    }
}
