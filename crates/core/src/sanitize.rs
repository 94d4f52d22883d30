//! Article body cleanup and plain-text excerpts.
//!
//! [`sanitize`] rewrites body markup before it is stored in an article
//! document. [`excerpt`] produces the short plain-text view used for
//! substitute titles. The two pipelines strip different things and must not
//! be fed each other's output.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum excerpt length in characters before it gets shortened.
pub const EXCERPT_LIMIT: usize = 40;

/// Appended to shortened excerpts.
pub const ELLIPSIS: char = '…';

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<a\b[^>]*?)\s+target=(?:"[^"]*"|'[^']*')"#).unwrap());

static BARE_BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*>").unwrap());

static LEADING_LOCATION_MARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(\s*<p\b[^>]*>)\s*<b\s+class="ortsmarke">\s*(.*?)\s*</b>\s*(.*?)(</p>)"#).unwrap()
});

static FIRST_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<(\w+)\b[^>]*>").unwrap());

static AFTER_FIRST_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)</p>.*$").unwrap());

static LOCATION_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^\s*<b\s+class="ortsmarke">.*?</b>\s*"#).unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// A single regex rewrite step.
struct Rewrite {
    pattern: &'static LazyLock<Regex>,
    replacement: &'static str,
    /// Number of replacements, `0` for all.
    limit: usize,
}

impl Rewrite {
    fn apply(&self, text: &str) -> String {
        self.pattern.replacen(text, self.limit, self.replacement).into_owned()
    }
}

/// Body rewrites in application order. Later steps expect the shape left by
/// earlier ones.
static BODY_REWRITES: [Rewrite; 3] = [
    Rewrite { pattern: &LINK_TARGET, replacement: "${1}", limit: 0 },
    Rewrite { pattern: &BARE_BR, replacement: "<br />", limit: 0 },
    Rewrite { pattern: &LEADING_LOCATION_MARK, replacement: r#"${1}${3} <b class="ortsmarke">(${2})</b>${4}"#, limit: 1 },
];

/// Excerpt strip steps in application order.
static EXCERPT_STRIPS: [Rewrite; 4] = [
    Rewrite { pattern: &FIRST_TAG, replacement: "", limit: 1 },
    Rewrite { pattern: &AFTER_FIRST_PARAGRAPH, replacement: "", limit: 1 },
    Rewrite { pattern: &LOCATION_MARK, replacement: "", limit: 1 },
    Rewrite { pattern: &ANY_TAG, replacement: "", limit: 0 },
];

/// Cleans raw article body markup.
///
/// 1. Drops `target` attributes from links.
/// 2. Turns `<br>` into `<br />`.
/// 3. Moves a leading location mark to the end of the first paragraph and
///    puts it in parentheses.
pub fn sanitize(body: &str) -> String {
    BODY_REWRITES.iter().fold(body.to_string(), |text, rewrite| rewrite.apply(&text))
}

/// Plain-text view of the first paragraph of `markup`, shortened to
/// [`EXCERPT_LIMIT`] characters.
pub fn excerpt(markup: &str) -> String {
    let stripped = EXCERPT_STRIPS.iter().fold(markup.to_string(), |text, strip| strip.apply(&text));
    shorten(stripped.trim())
}

/// Cuts `text` at the last complete word within [`EXCERPT_LIMIT`] characters
/// and appends [`ELLIPSIS`]. Shorter text is returned unchanged.
///
/// A single word longer than the limit is cut hard.
pub fn shorten(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= EXCERPT_LIMIT {
        return text.to_string();
    }

    let cut = if chars[EXCERPT_LIMIT].is_whitespace() {
        EXCERPT_LIMIT
    } else {
        chars[..EXCERPT_LIMIT]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&pos| pos > 0)
            .unwrap_or(EXCERPT_LIMIT)
    };

    let head: String = chars[..cut].iter().collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
