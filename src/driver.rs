//! Feeding timer expiries and transport completions back into the engine.

use std::time::{Duration, Instant};

use typeahead_core::{Autocomplete, Event};

use crate::host::TerminalHost;

pub type Engine = Autocomplete<TerminalHost>;

/// Deliver every due timer and every completion received so far.
/// Returns whether anything was delivered.
pub fn pump(engine: &mut Engine) -> bool {
    let mut delivered = false;
    let due = engine.host_mut().timers.take_due(Instant::now());
    for timer in due {
        engine.handle(Event::TimerFired(timer));
        delivered = true;
    }
    let completions = engine.host_mut().outbox.drain();
    for (id, result) in completions {
        engine.handle(Event::Response { id, result });
        delivered = true;
    }
    delivered
}

/// Block until the next completion or timer, at most `cap`.
pub fn wait(engine: &mut Engine, cap: Duration) {
    let timeout = engine.host().timers.poll_timeout(Instant::now(), cap);
    if let Some((id, result)) = engine.host_mut().outbox.wait(timeout) {
        engine.handle(Event::Response { id, result });
    }
}

/// No query is waiting for its debounce or its response.
pub fn is_settled(engine: &Engine) -> bool {
    let pipeline = engine.pipeline();
    !pipeline.has_pending() && pipeline.in_flight().is_none()
}
