//! Inline emphasis stripping

use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.+?)`").expect("valid inline code regex"));

/// Remove `**bold**`, `*italic*` and `` `code` `` markers, keeping the inner text
///
/// Bold is stripped before italic so `**x**` never leaves stray asterisks.
pub fn strip_inline_styles(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    CODE_RE.replace_all(&text, "$1").into_owned()
}
