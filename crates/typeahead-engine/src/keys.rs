//! Keystroke codes and the condition evaluator.
//!
//! Key codes use the browser `keyCode` numbering (Enter = 13, Up = 38, ...)
//! so mapping rules written for a web page can be reused unchanged by any
//! host that translates its native key events into these codes.

use crate::error::{EngineError, Result};

/// Well-known key codes.
pub mod codes {
    pub const BACKSPACE: u32 = 8;
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const PAGE_UP: u32 = 33;
    pub const PAGE_DOWN: u32 = 34;
    pub const END: u32 = 35;
    pub const HOME: u32 = 36;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const DELETE: u32 = 46;
}

/// A single keystroke as seen by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: u32,
}

impl KeyEvent {
    pub fn new(code: u32) -> Self {
        KeyEvent { code }
    }
}

/// What a condition compares the key code against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionKind {
    Exact(u32),
    /// Inclusive on both ends. `from <= to` is enforced by [`KeyCondition::range`].
    Range { from: u32, to: u32 },
}

/// A declarative test against a key code, optionally negated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCondition {
    kind: ConditionKind,
    negate: bool,
}

/// End, Home and the four arrow keys.
pub const NAVIGATION_KEYS: KeyCondition = KeyCondition::fixed_range(codes::END, codes::DOWN);

impl KeyCondition {
    pub const fn exact(code: u32) -> Self {
        KeyCondition {
            kind: ConditionKind::Exact(code),
            negate: false,
        }
    }

    /// Range for built-in constants; an inverted pair fails const evaluation.
    const fn fixed_range(from: u32, to: u32) -> Self {
        assert!(from <= to, "inverted key range");
        KeyCondition {
            kind: ConditionKind::Range { from, to },
            negate: false,
        }
    }

    /// Build an inclusive range condition.
    ///
    /// An inverted range could never match, so it is rejected here instead of
    /// being carried into a mapping set.
    pub fn range(from: u32, to: u32) -> Result<Self> {
        if from > to {
            return Err(EngineError::InvertedRange { from, to });
        }
        Ok(KeyCondition {
            kind: ConditionKind::Range { from, to },
            negate: false,
        })
    }

    /// Return the same condition with its result inverted.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn with_negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Test the condition against a key code.
    pub fn evaluate(&self, code: u32) -> bool {
        evaluate(self, code)
    }

    pub fn display(&self) -> String {
        let body = match self.kind {
            ConditionKind::Exact(code) => key_name(code),
            ConditionKind::Range { from, to } => format!("{}..={}", key_name(from), key_name(to)),
        };
        if self.negate {
            format!("!{}", body)
        } else {
            body
        }
    }
}

/// Evaluate `condition` against `code`. Pure.
pub fn evaluate(condition: &KeyCondition, code: u32) -> bool {
    let matched = match condition.kind {
        ConditionKind::Exact(expected) => code == expected,
        ConditionKind::Range { from, to } => from <= code && code <= to,
    };
    matched != condition.negate
}

/// Resolve a key name (as written in config files) to its key code.
pub fn parse_key_code(input: &str) -> std::result::Result<u32, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty key".to_string());
    }
    if let Some(ch) = parse_single_char(trimmed) {
        return char_code(ch).ok_or_else(|| format!("no key code for '{}'", ch));
    }
    let norm = trimmed.to_ascii_lowercase();
    let code = match norm.as_str() {
        "backspace" => codes::BACKSPACE,
        "tab" => codes::TAB,
        "enter" | "return" => codes::ENTER,
        "esc" | "escape" => codes::ESCAPE,
        "space" | "spc" => codes::SPACE,
        "pageup" => codes::PAGE_UP,
        "pagedown" => codes::PAGE_DOWN,
        "end" => codes::END,
        "home" => codes::HOME,
        "left" => codes::LEFT,
        "up" => codes::UP,
        "right" => codes::RIGHT,
        "down" => codes::DOWN,
        "delete" => codes::DELETE,
        "semicolon" => 186,
        "equal" => 187,
        "comma" => 188,
        "dash" | "minus" => 189,
        "period" | "dot" => 190,
        "slash" => 191,
        "backtick" | "grave" => 192,
        "lbracket" | "leftbracket" => 219,
        "backslash" => 220,
        "rbracket" | "rightbracket" => 221,
        "quote" | "apostrophe" => 222,
        _ => {
            if let Some(n) = norm.strip_prefix('f')
                && let Ok(n) = n.parse::<u32>()
                && (1..=12).contains(&n)
            {
                return Ok(111 + n);
            }
            return Err(format!("unknown key '{}'", input));
        }
    };
    Ok(code)
}

/// Key code produced by a printable character, if it has one.
///
/// Letters map to their upper-case code regardless of case, as a keyboard
/// reports the physical key rather than the character.
pub fn char_code(ch: char) -> Option<u32> {
    match ch {
        'a'..='z' => Some(ch.to_ascii_uppercase() as u32),
        'A'..='Z' | '0'..='9' => Some(ch as u32),
        ' ' => Some(codes::SPACE),
        ';' | ':' => Some(186),
        '=' | '+' => Some(187),
        ',' | '<' => Some(188),
        '-' | '_' => Some(189),
        '.' | '>' => Some(190),
        '/' | '?' => Some(191),
        '`' | '~' => Some(192),
        '[' | '{' => Some(219),
        '\\' | '|' => Some(220),
        ']' | '}' => Some(221),
        '\'' | '"' => Some(222),
        _ => None,
    }
}

/// Human-readable name for a key code.
pub fn key_name(code: u32) -> String {
    let name = match code {
        codes::BACKSPACE => "Backspace",
        codes::TAB => "Tab",
        codes::ENTER => "Enter",
        codes::ESCAPE => "Esc",
        codes::SPACE => "Space",
        codes::PAGE_UP => "PageUp",
        codes::PAGE_DOWN => "PageDown",
        codes::END => "End",
        codes::HOME => "Home",
        codes::LEFT => "Left",
        codes::UP => "Up",
        codes::RIGHT => "Right",
        codes::DOWN => "Down",
        codes::DELETE => "Delete",
        48..=57 | 65..=90 => return char::from_u32(code).map(String::from).unwrap_or_default(),
        112..=123 => return format!("F{}", code - 111),
        _ => return code.to_string(),
    };
    name.to_string()
}

fn parse_single_char(input: &str) -> Option<char> {
    let mut chars = input.chars();
    let ch = chars.next()?;
    if chars.next().is_none() {
        Some(ch)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_only_its_code() {
        let enter = KeyCondition::exact(codes::ENTER);
        assert!(enter.evaluate(13));
        assert!(!enter.evaluate(14));
    }

    #[test]
    fn navigation_keys_cover_end_home_and_arrows() {
        assert_eq!(NAVIGATION_KEYS.kind(), ConditionKind::Range { from: 35, to: 40 });
        assert!(!NAVIGATION_KEYS.is_negated());
        assert!(!NAVIGATION_KEYS.evaluate(codes::PAGE_DOWN));
        assert!(NAVIGATION_KEYS.evaluate(codes::HOME));
        assert!(!NAVIGATION_KEYS.evaluate(codes::DELETE));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let arrows = KeyCondition::range(35, 40).expect("range");
        for code in 30..45 {
            assert_eq!(arrows.evaluate(code), (35..=40).contains(&code), "code {}", code);
        }
    }

    #[test]
    fn negation_inverts_every_result() {
        let plain = KeyCondition::range(10, 20).expect("range");
        let negated = plain.negated();
        for code in 0..40 {
            assert_eq!(negated.evaluate(code), !plain.evaluate(code));
        }
        assert_eq!(negated.negated(), plain);
    }

    #[test]
    fn single_point_range_is_allowed() {
        let only = KeyCondition::range(7, 7).expect("range");
        assert!(only.evaluate(7));
        assert!(!only.evaluate(6));
        assert!(!only.evaluate(8));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = KeyCondition::range(40, 35).unwrap_err();
        assert_eq!(err, EngineError::InvertedRange { from: 40, to: 35 });
    }

    #[test]
    fn parse_key_code_names_and_chars() {
        assert_eq!(parse_key_code("Enter"), Ok(codes::ENTER));
        assert_eq!(parse_key_code(" up "), Ok(codes::UP));
        assert_eq!(parse_key_code("a"), Ok(65));
        assert_eq!(parse_key_code("Z"), Ok(90));
        assert_eq!(parse_key_code("7"), Ok(55));
        assert_eq!(parse_key_code("F5"), Ok(116));
        assert_eq!(parse_key_code("comma"), Ok(188));
    }

    #[test]
    fn parse_key_code_rejects_unknown() {
        let err = parse_key_code("NotAKey").unwrap_err();
        assert!(err.contains("unknown key"));
        assert!(parse_key_code("F13").is_err());
        assert!(parse_key_code("").is_err());
    }

    #[test]
    fn display_shows_negation_and_names() {
        let cond = KeyCondition::range(codes::END, codes::DOWN)
            .expect("range")
            .negated();
        assert_eq!(cond.display(), "!End..=Down");
        assert_eq!(KeyCondition::exact(65).display(), "A");
    }
}
