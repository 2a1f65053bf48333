use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::prelude::*;
use std::io;
use std::time::{Duration, Instant};

use typeahead_engine::codes;
use typeahead_engine::keys::char_code;

use super::app::App;
use super::ui;

/// Longest the loop sleeps without checking for finished requests.
const POLL_CAP: Duration = Duration::from_millis(100);

/// Key code a browser would report for `code`.
pub(crate) fn dom_code(code: KeyCode) -> Option<u32> {
    match code {
        KeyCode::Char(c) => Some(char_code(c).unwrap_or(0)),
        KeyCode::Backspace => Some(codes::BACKSPACE),
        KeyCode::Tab | KeyCode::BackTab => Some(codes::TAB),
        KeyCode::Enter => Some(codes::ENTER),
        KeyCode::Esc => Some(codes::ESCAPE),
        KeyCode::PageUp => Some(codes::PAGE_UP),
        KeyCode::PageDown => Some(codes::PAGE_DOWN),
        KeyCode::End => Some(codes::END),
        KeyCode::Home => Some(codes::HOME),
        KeyCode::Left => Some(codes::LEFT),
        KeyCode::Up => Some(codes::UP),
        KeyCode::Right => Some(codes::RIGHT),
        KeyCode::Down => Some(codes::DOWN),
        KeyCode::Delete => Some(codes::DELETE),
        KeyCode::F(n @ 1..=12) => Some(111 + u32::from(n)),
        _ => None,
    }
}

/// Apply the key's native effect on the input buffer.
fn edit_buffer(app: &mut App, code: KeyCode) {
    let input = &mut app.engine.host_mut().input;
    match code {
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}

pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    // Esc goes to the engine first; it quits unless a mapping used it to
    // close the results view.
    if key.code == KeyCode::Esc && key.modifiers.is_empty() {
        let was_open = app.engine.is_open();
        app.key(codes::ESCAPE);
        if !was_open || app.engine.is_open() {
            app.should_quit = true;
        }
        return;
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return;
    }

    edit_buffer(app, key.code);
    let Some(code) = dom_code(key.code) else {
        return;
    };
    let disposition = app.key(code);
    if key.code == KeyCode::Enter && !disposition.prevent_default {
        app.submit();
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let mut last = None;
    for ch in text.chars().filter(|c| !c.is_control()) {
        app.engine.host_mut().input.insert(ch);
        last = Some(ch);
    }
    if let Some(ch) = last {
        app.key(char_code(ch).unwrap_or(0));
    }
}

pub(crate) fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let view = &app.engine.host().view;
    if let Some(index) = ui::entry_at(view, terminal_area, mouse.column, mouse.row) {
        app.click(index);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;
        if app.should_quit {
            return Ok(());
        }

        let timeout = app.engine.host().timers.poll_timeout(Instant::now(), POLL_CAP);
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(app, key);
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let terminal_area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(app, terminal_area, mouse);
            }
            Event::Paste(text) => handle_paste(app, &text),
            Event::FocusGained => app.focus(true),
            Event::FocusLost => app.focus(false),
            Event::Resize(_, _) => {}
        }
    }
}
