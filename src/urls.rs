//! URL normalization and article-shape classification.
//!
//! Listing pages link to far more than articles: navigation, login forms,
//! static assets, RSS feeds. [`is_likely_article`] is the heuristic gate
//! that keeps only URLs shaped like news articles — exclusions first, then
//! date/path/suffix patterns. It is a pure function of the URL and the
//! fixed pattern lists.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// URL shapes that are never articles.
static EXCLUDE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)javascript:",
        r"(?i)mailto:",
        r"^#",
        r"(?i)\.(jpg|jpeg|png|gif|pdf|doc|docx|zip|rar|exe)$",
        r"(?i)/search/",
        r"(?i)/login",
        r"(?i)/register",
        r"(?i)/about",
        r"(?i)/contact",
        r"(?i)/privacy",
        r"(?i)/terms",
        r"(?i)/sitemap",
        r"(?i)/rss",
        r"(?i)/feed",
        r"(?i)#comment",
        r"(?i)#reply",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// URL shapes characteristic of news articles.
static ARTICLE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/\d{4}/\d{2}/\d{2}/",
        r"/\d{4}-\d{2}-\d{2}/",
        r"/\d{8}/",
        r"\.html$",
        r"\.shtml$",
        r"/article/",
        r"/news/",
        r"/finance/",
        r"/money/",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// True iff the URL parses with both a scheme and a host.
pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).map(|u| u.has_host()).unwrap_or(false)
}

/// Resolve an `href` to an absolute URL against the site's base.
///
/// Protocol-relative `//` links expand to `https:`; relative paths join the
/// base. Returns `None` when the result is not a valid absolute URL.
pub fn normalize_url(href: &str, base: &Url) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        base.join(href).ok()?.to_string()
    };
    is_valid_url(&absolute).then_some(absolute)
}

/// Heuristic: does this URL point at a news article?
///
/// Exclusions win over inclusions; a URL matching neither list is rejected.
pub fn is_likely_article(url: &str) -> bool {
    if !is_valid_url(url) {
        return false;
    }
    if EXCLUDE_RES.iter().any(|re| re.is_match(url)) {
        return false;
    }
    ARTICLE_RES.iter().any(|re| re.is_match(url))
}
