//! Headless mode: run one query through the full pipeline and print what
//! the results view would show.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::info;
use typeahead_core::Event;
use typeahead_engine::keys::char_code;
use typeahead_engine::{KeyEvent, Rendering, codes};

use crate::driver::{self, Engine};
use crate::error::AppError;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_CAP: Duration = Duration::from_millis(50);

/// Type `query` into the input and wait for its results.
///
/// Returns `Ok(false)` when nothing was rendered (no endpoint, failed
/// request).
pub fn run(engine: &mut Engine, query: &str, out: &mut impl Write) -> anyhow::Result<bool> {
    engine.handle(Event::Focus);
    if query.is_empty() {
        engine.handle(Event::Key(KeyEvent::new(codes::BACKSPACE)));
    }
    for ch in query.chars() {
        engine.host_mut().input.insert(ch);
        engine.handle(Event::Key(KeyEvent::new(char_code(ch).unwrap_or(0))));
    }

    let deadline = Instant::now() + SETTLE_TIMEOUT;
    loop {
        driver::pump(engine);
        if driver::is_settled(engine) {
            break;
        }
        if Instant::now() >= deadline {
            return Err(AppError::Timeout(SETTLE_TIMEOUT).into());
        }
        driver::wait(engine, POLL_CAP);
    }

    let printed = print_rendering(engine, out).context("failed to write results")?;
    info!(query, printed, "headless query finished");
    engine.handle(Event::Destroy);
    Ok(printed)
}

fn print_rendering(engine: &Engine, out: &mut impl Write) -> std::io::Result<bool> {
    match engine.rendering() {
        Rendering::Nothing => return Ok(false),
        Rendering::Candidates(list) => {
            for candidate in list {
                writeln!(out, "{}\t{}", candidate.value, candidate.label)?;
            }
        }
        Rendering::Raw { markup, .. } => writeln!(out, "{}", markup)?,
        Rendering::Empty { message } => writeln!(out, "{}", message)?,
    }
    Ok(true)
}
