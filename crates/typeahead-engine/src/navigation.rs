//! Rendered result list and active-entry navigation.

use crate::keys::codes;
use crate::normalize::{Candidate, Normalized};

/// Direction of a list navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Up moves to the previous entry, Down to the next one.
    pub fn from_key_code(code: u32) -> Option<Direction> {
        match code {
            codes::UP => Some(Direction::Previous),
            codes::DOWN => Some(Direction::Next),
            _ => None,
        }
    }

    fn step(self) -> isize {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// What the results view currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Rendering {
    #[default]
    Nothing,
    Candidates(Vec<Candidate>),
    /// Opaque markup. `entries` is the number of selectable items the view
    /// found in it after rendering.
    Raw { markup: String, entries: usize },
    /// A single locked entry carrying the empty message.
    Empty { message: String },
}

impl Rendering {
    pub fn from_normalized(normalized: Normalized, empty_message: &str) -> Rendering {
        match normalized {
            Normalized::Candidates(list) => Rendering::Candidates(list),
            Normalized::Raw(markup) => Rendering::Raw { markup, entries: 0 },
            Normalized::Empty => Rendering::Empty {
                message: empty_message.to_string(),
            },
        }
    }

    /// Number of entries present in the view, locked ones included.
    pub fn len(&self) -> usize {
        match self {
            Rendering::Nothing => 0,
            Rendering::Candidates(list) => list.len(),
            Rendering::Raw { entries, .. } => *entries,
            Rendering::Empty { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locked entries are shown but can never become active or be selected.
    pub fn is_locked(&self, index: usize) -> bool {
        matches!(self, Rendering::Empty { .. }) || index >= self.len()
    }

    /// Whether there is anything for an open view to show.
    pub fn is_showable(&self) -> bool {
        !matches!(self, Rendering::Nothing)
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        match self {
            Rendering::Candidates(list) => list.get(index),
            _ => None,
        }
    }
}

/// Tracks which rendered entry is highlighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    active: Option<usize>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Called whenever the list is re-rendered: nothing is highlighted.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Move the highlight one step, wrapping at both ends and skipping
    /// locked entries. With nothing active, the first selectable entry is
    /// activated whatever the direction.
    pub fn navigate(&mut self, rendering: &Rendering, direction: Direction) -> Option<usize> {
        let len = rendering.len();
        let current = self.active.filter(|&index| index < len);
        self.active = match current {
            None => (0..len).find(|&index| !rendering.is_locked(index)),
            Some(current) => {
                let len = len as isize;
                let mut index = current as isize;
                let mut next = Some(current);
                for _ in 0..len {
                    index = (index + direction.step()).rem_euclid(len);
                    if !rendering.is_locked(index as usize) {
                        next = Some(index as usize);
                        break;
                    }
                }
                next
            }
        };
        self.active
    }

    /// Highlight a specific entry (e.g. on hover). Locked entries are refused.
    pub fn set_active(&mut self, rendering: &Rendering, index: usize) -> bool {
        if rendering.is_locked(index) {
            return false;
        }
        self.active = Some(index);
        true
    }
}
