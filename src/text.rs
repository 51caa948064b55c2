use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("static regex"));

/// Bodies platforms leave behind for moderated or withdrawn content.
const DELETED_SENTINELS: &[&str] = &["[deleted]", "[removed]", "[unavailable]", "[comment removed by moderator]"];

pub fn normalize(s: &str) -> String {
    s.nfc().collect::<String>().trim().to_string()
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub fn is_deleted_sentinel(s: &str) -> bool {
    let t = s.trim().to_lowercase();
    DELETED_SENTINELS.iter().any(|d| t == *d)
}

/// Platform markup that carries no sentiment: links and basic HTML entities.
pub fn strip_markup(s: &str) -> String {
    let no_urls = URL_RE.replace_all(s, " ");
    no_urls
        .replace("<br>", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// One whitespace token with surrounding punctuation trimmed and
/// lowercased. Apostrophes survive so contractions stay whole.
pub fn trim_token(raw: &str) -> String {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_lowercase()
}
