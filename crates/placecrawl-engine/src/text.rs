//! HTML-to-text reduction for LLM prompts.

use std::sync::LazyLock;

use regex::Regex;

/// Generous upper bound for the text handed to the LLM; pages past this point
/// rarely carry additional place details.
const MAX_TEXT_CHARS: usize = 48_000;

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
        .expect("valid noise regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tags regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Reduces raw page HTML to whitespace-collapsed visible text, truncated on a
/// character boundary.
pub(crate) fn page_text(html: &str) -> String {
    let stripped = NOISE_RE.replace_all(html, " ");
    let stripped = TAG_RE.replace_all(&stripped, " ");
    let collapsed = WS_RE.replace_all(&stripped, " ");
    let text = collapsed.trim();

    if text.chars().count() <= MAX_TEXT_CHARS {
        text.to_string()
    } else {
        text.chars().take(MAX_TEXT_CHARS).collect()
    }
}
