//! Text helpers: excerpts, lexical relevance scoring, HTML reduction and URL detection.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<head\b.*?</head>",
    )
    .unwrap_or_else(|_| unreachable!("static regex"))
});

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(p|div|br|li|h[1-6]|tr|section|article)\b[^>]*>")
        .unwrap_or_else(|_| unreachable!("static regex"))
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap_or_else(|_| unreachable!("static regex")));

static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f]+").unwrap_or_else(|_| unreachable!("static regex")));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap_or_else(|_| unreachable!("static regex")));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"'\)\]]+"#).unwrap_or_else(|_| unreachable!("static regex"))
});

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap_or_else(|_| unreachable!("static regex"))
});

const STOPWORDS: [&str; 32] = [
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "her", "was", "one",
    "our", "out", "has", "have", "what", "when", "where", "which", "who", "how", "why", "this",
    "that", "with", "from", "about", "into", "does", "tell",
];

/// First `max_chars` characters of `text`, with `...` appended when cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", trimmed.get(..idx).unwrap_or(trimmed)),
        None => trimmed.to_owned(),
    }
}

/// Truncate to at most `max_chars` characters, adding `...` within the budget when cut.
#[must_use]
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{cut}...")
}

/// Lowercased content words of at least three characters.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Share of distinct query terms that appear in `candidate`, in `0.0..=1.0`.
#[must_use]
pub fn relevance(query_terms: &HashSet<String>, candidate: &str) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let words: HashSet<String> = tokenize(candidate).into_iter().collect();
    let hits = query_terms.iter().filter(|t| words.contains(*t)).count();
    #[expect(clippy::cast_precision_loss, reason = "term counts are small")]
    let score = hits as f64 / query_terms.len() as f64;
    score
}

/// Reduce an HTML page to its visible text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(html, " ");
    let with_breaks = BLOCK_TAG.replace_all(&without_scripts, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, " ");
    let decoded = decode_entities(&stripped);
    let collapsed = INLINE_SPACE.replace_all(&decoded, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    BLANK_LINES.replace_all(lines.join("\n").trim(), "\n\n").into_owned()
}

/// Contents of the `<title>` element, if any.
#[must_use]
pub fn html_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_owned())
        .filter(|t| !t.is_empty())
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// URLs mentioned in free text, trailing punctuation removed, duplicates dropped.
#[must_use]
pub fn find_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in URL.find_iter(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_owned());
        }
    }
    urls
}
