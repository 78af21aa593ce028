use std::sync::OnceLock;

use regex::Regex;

const PICTOGRAPHIC: &str = concat!(
    r"[\p{Extended_Pictographic}",
    r"\x{1F3FB}-\x{1F3FF}\x{1F1E6}-\x{1F1FF}",
    r"\x{FE0F}\x{200D}\x{20E3}",
    r"\x{E0020}-\x{E007F}]",
);

fn pictographic() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PICTOGRAPHIC).expect("pictographic regex"))
}

/// Remove emoji and pictographic symbols, collapsing the whitespace they leave behind.
///
/// Idempotent: stripping an already stripped string returns it unchanged.
pub fn strip(text: &str) -> String {
    let cleaned = pictographic().replace_all(text, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Apply [`strip`] only when `enabled`, otherwise return the text untouched.
pub fn maybe_strip(text: &str, enabled: bool) -> String {
    if enabled {
        strip(text)
    } else {
        text.to_string()
    }
}
