//! UI rendering

use super::app::App;
use crate::host::View;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use typeahead_core::{Geometry, Placement};
use typeahead_engine::Rendering;

pub(crate) const HEADER_HEIGHT: u16 = 1;
pub(crate) const INPUT_HEIGHT: u16 = 3;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const MAX_VISIBLE_ENTRIES: usize = 8;

/// Header, input box, free space, status bar.
pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

pub(crate) fn input_geometry(input_area: Rect) -> Geometry {
    Geometry {
        top: i32::from(input_area.y),
        left: i32::from(input_area.x),
        width: u32::from(input_area.width),
        height: u32::from(input_area.height),
    }
}

/// First entry shown so the active one stays visible.
pub(crate) fn scroll_offset(active: Option<usize>, count: usize) -> usize {
    let visible = count.min(MAX_VISIBLE_ENTRIES);
    match active {
        Some(index) if index >= visible => (index + 1 - visible).min(count - visible),
        _ => 0,
    }
}

/// Where the dropdown goes for `count` entries, clipped to the screen.
pub(crate) fn dropdown_area(placement: Placement, count: usize, screen: Rect) -> Option<Rect> {
    if count == 0 {
        return None;
    }
    let x = u16::try_from(placement.left.max(0)).unwrap_or(u16::MAX);
    let y = u16::try_from(placement.top.max(0)).unwrap_or(u16::MAX);
    let bottom = screen.y.saturating_add(screen.height);
    let right = screen.x.saturating_add(screen.width);
    if y >= bottom || x >= right {
        return None;
    }
    let wanted = u16::try_from(count.min(MAX_VISIBLE_ENTRIES)).unwrap_or(u16::MAX) + 2;
    let height = wanted.min(bottom - y);
    let width = u16::try_from(placement.width).unwrap_or(u16::MAX).min(right - x);
    if height < 3 || width < 3 {
        return None;
    }
    Some(Rect::new(x, y, width, height))
}

/// Index of the entry under a mouse click, if any.
pub(crate) fn entry_at(view: &View, screen: Rect, mouse_col: u16, mouse_row: u16) -> Option<usize> {
    if !view.open {
        return None;
    }
    let count = view.lines().len();
    let area = dropdown_area(view.placement, count, screen)?;
    let inner_x = area.x + 1;
    let inner_y = area.y + 1;
    let inner_right = area.x + area.width - 1;
    let inner_bottom = area.y + area.height - 1;
    if mouse_col < inner_x || mouse_col >= inner_right || mouse_row < inner_y || mouse_row >= inner_bottom {
        return None;
    }
    let index = scroll_offset(view.active, count) + usize::from(mouse_row - inner_y);
    (index < count).then_some(index)
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [header, input, _body, status] = split_main_chunks(f.area());
    app.set_input_geometry(input_geometry(input));

    draw_header(f, header);
    draw_input(f, app, input);
    draw_status_bar(f, app, status);
    draw_dropdown(f, &app.engine.host().view);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled("typeahead", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "  ↑/↓ navigate · Enter select · click select · Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Search ");
    let paragraph = Paragraph::new(app.input_text()).block(block);
    f.render_widget(paragraph, area);

    let cursor = u16::try_from(app.cursor()).unwrap_or(u16::MAX);
    let max_x = area.x + area.width.saturating_sub(2);
    let x = (area.x + 1).saturating_add(cursor).min(max_x);
    f.set_cursor_position((x, area.y + 1));
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(app.status.as_str()).style(Style::default().fg(Color::Black).bg(Color::Gray));
    f.render_widget(paragraph, area);
}

fn draw_dropdown(f: &mut Frame, view: &View) {
    if !view.open {
        return;
    }
    let entries = view.lines();
    let Some(area) = dropdown_area(view.placement, entries.len(), f.area()) else {
        return;
    };

    let offset = scroll_offset(view.active, entries.len());
    let visible = usize::from(area.height.saturating_sub(2));
    let locked = matches!(view.rendering, Rendering::Empty { .. });
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, text)| {
            let style = if locked {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
            } else if view.active == Some(index) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text.clone(), style))
        })
        .collect();

    let title = if entries.len() > visible {
        format!(" {}/{} ", view.active.map_or(0, |i| i + 1), entries.len())
    } else {
        String::new()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}
