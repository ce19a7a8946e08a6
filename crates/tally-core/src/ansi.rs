//! Terminal escape stripping and size capping for captured logs.

use lazy_static::lazy_static;
use regex::Regex;

/// Characters of log text kept per section in the rendered report.
pub const DEFAULT_LOG_CAP_CHARS: usize = 50_000;

lazy_static! {
    /// CSI sequences (colors, bold, cursor movement): ESC [ params intermediates final.
    static ref CSI: Regex = Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").unwrap();
}

pub fn strip_ansi(text: &str) -> String {
    CSI.replace_all(text, "").into_owned()
}

/// Keeps the first `cap` characters. A truncated log ends with a marker giving the
/// original length.
pub fn cap_log(text: String, cap: usize) -> String {
    let total = text.chars().count();
    if total <= cap {
        return text;
    }
    let cut = text
        .char_indices()
        .nth(cap)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let mut out = String::with_capacity(cut + 64);
    out.push_str(&text[..cut]);
    out.push_str(&format!(
        "\n\n--- LOG TRUNCATED (original: {} chars) ---\n",
        group_thousands(total)
    ));
    out
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
