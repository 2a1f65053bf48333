//! Selectable entries in raw markup responses.
//!
//! Servers that answer with ready-made markup usually send a list of `<li>`
//! items. Each item is one entry; its text (tags stripped, common entities
//! decoded) is what gets committed on selection. Markup without list items
//! falls back to one entry per non-empty line.

use std::sync::OnceLock;

use regex::Regex;

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li\s*>").expect("list item regex must compile"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex must compile"))
}

/// Text of every entry in `markup`, in document order.
pub fn entries(markup: &str) -> Vec<String> {
    let items: Vec<String> = item_re()
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| text_of(m.as_str()))
        .collect();
    if !items.is_empty() {
        return items;
    }
    markup
        .lines()
        .map(text_of)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strip tags, decode the basic entities and collapse whitespace.
pub fn text_of(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, "");
    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
