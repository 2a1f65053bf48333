//! Application state.
//!
//! [`App`] owns the attached engine (and through it the terminal host) plus
//! the little bit of UI state the engine does not care about: the status
//! line and whether the user asked to quit.

use typeahead_core::{Disposition, Event, Geometry};
use typeahead_engine::KeyEvent;

use crate::driver::{self, Engine};

pub struct App {
    pub engine: Engine,
    pub status: String,
    pub should_quit: bool,
    submitted: Option<String>,
}

impl App {
    pub fn new(mut engine: Engine) -> Self {
        engine.handle(Event::Focus);
        let status = match engine.config().url() {
            Some(url) => format!("{} {}", engine.config().http_method(), url),
            None => "No endpoint configured; queries are not sent".to_string(),
        };
        App {
            engine,
            status,
            should_quit: false,
            submitted: None,
        }
    }

    pub fn input_text(&self) -> &str {
        self.engine.host().input.text()
    }

    pub fn cursor(&self) -> usize {
        self.engine.host().input.cursor()
    }

    /// Send a keystroke through the mapping dispatcher.
    pub fn key(&mut self, code: u32) -> Disposition {
        self.engine.handle(Event::Key(KeyEvent::new(code)))
    }

    /// Enter that no behavior claimed: the form "submits".
    pub fn submit(&mut self) {
        let value = self.input_text().to_string();
        self.status = format!("Submitted: {}", value);
        self.submitted = Some(value);
    }

    pub fn submitted(&self) -> Option<&str> {
        self.submitted.as_deref()
    }

    pub fn click(&mut self, index: usize) {
        self.engine.handle(Event::Click(index));
    }

    pub fn focus(&mut self, focused: bool) {
        self.engine.handle(if focused { Event::Focus } else { Event::Blur });
    }

    /// Record where the input box was drawn; repositions the view on change.
    pub fn set_input_geometry(&mut self, geometry: Geometry) {
        if self.engine.host_mut().set_geometry(geometry) {
            self.engine.handle(Event::Reposition);
        }
    }

    /// Deliver due timers and finished requests.
    pub fn tick(&mut self) -> bool {
        driver::pump(&mut self.engine)
    }

    pub fn shutdown(&mut self) {
        self.engine.handle(Event::Destroy);
    }
}
