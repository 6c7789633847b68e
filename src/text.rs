//! Text normalization and boilerplate filtering.
//!
//! Everything here is pure string-to-string work: stripping markup remnants,
//! collapsing whitespace, and rejecting the recurring non-article text
//! (ads, legal notices, navigation, social actions) that selector-based
//! extraction drags in from real-world pages.
//!
//! Length thresholds throughout the crate count `char`s, not bytes, so CJK
//! text is measured the way an editor would count it.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

// Allow-list: word characters, whitespace, CJK ideographs, and native
// punctuation. Everything else is dropped.
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s\u{4e00}-\u{9fff}，。、；：“”‘’！？（）【】《》\-]").unwrap()
});

static SEPARATOR_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-|]{2,}").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Titles matching any of these are boilerplate, not headlines.
static INVALID_TITLE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"更多$",
        r"^更多",
        r"^\s*$",
        r"广告",
        r"版权",
        r"免责",
        r"登录",
        r"注册",
        r"客服",
        r"联系我们",
        r"关于我们",
        r"^[\d\s\-\|]+$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Paragraphs matching any of these are ads, legal text, or social chrome.
static INVALID_PARAGRAPH_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"广告",
        r"免责声明",
        r"版权所有",
        r"联系我们",
        r"关于我们",
        r"客服电话",
        r"投诉建议",
        r"意见反馈",
        r"^\d+$",
        r"^[\s\-\|]+$",
        r"分享到",
        r"收藏",
        r"点赞",
        r"评论",
        r"转发",
        r"举报",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Known site-name suffixes stripped from `<title>` fallbacks.
const SITE_TITLE_SUFFIXES: &[&str] = &["_网易财经", "_新浪财经", "_腾讯财经", "_央视网", "_人民网"];

/// Normalize raw extracted text.
///
/// Strips tag-like substrings, drops characters outside the allow-list,
/// removes `--`/`||` separator runs, collapses whitespace runs to a single
/// space, and trims. Idempotent: normalizing normalized text is a no-op.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = TAG_RE.replace_all(raw, "");
    let text = DISALLOWED_RE.replace_all(&text, "");
    let text = SEPARATOR_RUN_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Char-boundary-safe prefix of at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// True if `title` is long enough and matches no boilerplate pattern.
pub fn is_valid_title(title: &str, min_len: usize) -> bool {
    if title.chars().count() < min_len {
        return false;
    }
    !INVALID_TITLE_RES.iter().any(|re| re.is_match(title))
}

/// True if `text` looks like article body text rather than page chrome.
pub fn is_valid_paragraph(text: &str) -> bool {
    if text.chars().count() < 10 {
        return false;
    }
    !INVALID_PARAGRAPH_RES.iter().any(|re| re.is_match(text))
}

/// Strip the first matching known site-name suffix from a page title.
pub fn strip_site_suffix(title: &str) -> String {
    for suffix in SITE_TITLE_SUFFIXES {
        if let Some(stripped) = title.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    title.to_string()
}
