//! Deobfuscation of human-obscured email text
//!
//! Site owners hide addresses from harvesters with `[at]`, `(dot)` and
//! spaced punctuation. `normalize` folds those back into `@` and `.`.

use regex::Regex;
use std::sync::LazyLock;

// Bracketed tokens are rewritten before the bare-word forms, otherwise
// `[at]` would be half-consumed by the whitespace rule. Nested brackets
// such as `[(at)]` collapse in one match.
static BRACKETED_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\[\(\{]+\s*(?:at|@)\s*[\]\)\}]+\s*").unwrap());

static BRACKETED_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\[\(\{]+\s*(?:dot|\.)\s*[\]\)\}]+\s*").unwrap());

/// `name at host dot tld`: a bare `at` only counts when the domain that
/// follows is itself spelled with `dot` or a bracketed dot. Plain prose
/// like `featured at techcrunch.com` or `us at jane@site.com` is left alone.
static WORD_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s+at\s+([a-z0-9._%+-]+(?:(?:\s+dot\s+|\s*[\[\(\{]+\s*(?:dot|\.)\s*[\]\)\}]+\s*)[a-z0-9-]+)+)",
    )
    .unwrap()
});

static WORD_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+dot\s+").unwrap());

static SPACED_AT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*@\s*").unwrap());

/// A dot with whitespace on both sides, between two word characters.
static SPACED_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\s+\.\s+\b").unwrap());

/// Lowercase `text` and collapse obfuscated `at`/`dot` forms.
///
/// Canonical addresses pass through untouched. Rewrites repeat until the
/// text stops changing, so the transform is idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_lowercase();
    loop {
        let next = rewrite_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

// Every effective rewrite shortens the text, which bounds the loop above.
fn rewrite_once(text: &str) -> String {
    let text = BRACKETED_AT.replace_all(text, "@");
    let text = WORD_AT.replace_all(&text, "@$1");
    let text = BRACKETED_DOT.replace_all(&text, ".");
    let text = WORD_DOT.replace_all(&text, ".");
    let text = SPACED_AT.replace_all(&text, "@");
    SPACED_DOT.replace_all(&text, ".").into_owned()
}
