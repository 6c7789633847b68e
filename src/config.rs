//! Crawler tuning knobs and per-site selector configuration.
//!
//! A [`SiteConfig`] describes one news site declaratively: its base URL, its
//! declared text encoding, and three ordered CSS selector lists (title,
//! content, links). Selector lists are tried front to back; earlier entries
//! are the more specific ones. The built-in table covers five Chinese
//! finance portals; a YAML file with the same shape can replace it at
//! runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SpiderError;

/// Ordered CSS selector lists for one site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorSet {
    /// Candidate selectors for the article headline, most specific first.
    pub title: Vec<String>,
    /// Candidate selectors for article body paragraphs.
    pub content: Vec<String>,
    /// Candidate selectors for article links on the listing page.
    pub links: Vec<String>,
}

/// Declarative description of one news site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Unique display name, also stamped on every extracted record.
    pub name: String,
    /// Listing page URL; relative article links resolve against it.
    pub url: String,
    /// Declared text encoding of the site's pages.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// The selector lists driving extraction.
    pub selectors: SelectorSet,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// Runtime tuning parameters for fetching and extraction.
#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Per-request timeout for article and listing fetches.
    pub request_timeout: Duration,
    /// Shorter timeout used by the detector's connectivity probe.
    pub connect_test_timeout: Duration,
    /// Additional attempts after the first failed fetch.
    pub max_retries: usize,
    /// Uniform random inter-request delay bounds, in milliseconds.
    pub delay_range_ms: (u64, u64),
    /// Fixed pause between detector probes of different sites, in milliseconds.
    pub probe_delay_ms: u64,
    /// Upper bound on harvested links and extracted articles per run.
    pub max_news_count: usize,
    /// Summary cap, in characters.
    pub summary_max_length: usize,
    /// Titles shorter than this are rejected.
    pub min_title_length: usize,
    /// Summaries shorter than this reject the record (sentinel excepted).
    pub min_summary_length: usize,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_test_timeout: Duration::from_secs(5),
            max_retries: 3,
            delay_range_ms: (1000, 3000),
            probe_delay_ms: 1000,
            max_news_count: 20,
            summary_max_length: 200,
            min_title_length: 10,
            min_summary_length: 20,
        }
    }
}

#[cfg(test)]
impl SpiderConfig {
    /// Config without pacing delays, for tests against local mock servers.
    pub(crate) fn immediate() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            connect_test_timeout: Duration::from_secs(2),
            delay_range_ms: (0, 0),
            probe_delay_ms: 0,
            ..Self::default()
        }
    }
}

/// Look up a site by name.
pub fn find_site<'a>(sites: &'a [SiteConfig], name: &str) -> Option<&'a SiteConfig> {
    sites.iter().find(|s| s.name == name)
}

/// Reject site lists with duplicate names.
pub fn validate_sites(sites: &[SiteConfig]) -> Result<(), SpiderError> {
    for (i, site) in sites.iter().enumerate() {
        if sites[..i].iter().any(|s| s.name == site.name) {
            return Err(SpiderError::DuplicateSite(site.name.clone()));
        }
    }
    Ok(())
}

/// Load site definitions from a YAML file (a sequence of [`SiteConfig`]s).
pub fn load_sites_file(path: &str) -> Result<Vec<SiteConfig>, SpiderError> {
    let raw = std::fs::read_to_string(path)?;
    let sites: Vec<SiteConfig> = serde_yaml::from_str(&raw)?;
    validate_sites(&sites)?;
    Ok(sites)
}

fn site(name: &str, url: &str, title: &[&str], content: &[&str], links: &[&str]) -> SiteConfig {
    let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
    SiteConfig {
        name: name.to_string(),
        url: url.to_string(),
        encoding: default_encoding(),
        selectors: SelectorSet {
            title: owned(title),
            content: owned(content),
            links: owned(links),
        },
    }
}

/// The built-in site table: five Chinese finance portals.
pub fn builtin_sites() -> Vec<SiteConfig> {
    vec![
        site(
            "网易财经",
            "https://money.163.com/",
            &[
                "h1",
                "h2",
                "h3",
                ".news_title",
                ".post_title",
                ".titleBar",
                ".cm_news_title",
                ".article-title",
                ".title",
            ],
            &[
                ".post_content_main",
                ".post_body",
                ".article_body",
                ".content",
                ".news_content",
                ".endText",
                ".article p",
                "p",
            ],
            &[
                "a[href*='money.163.com/'][href*='.html']",
                "a[href*='/finance/'][href*='.html']",
                ".news_title a",
                ".titleBar a",
                ".cm_news_main a",
                ".article-title a",
            ],
        ),
        site(
            "新浪财经",
            "https://finance.sina.com.cn/",
            &[
                "h1",
                "h2",
                "h3",
                ".news-item-title",
                ".news-title",
                ".blk_A h3 a",
                ".news_txt h2 a",
            ],
            &[".article-content", ".content", ".news_content", ".article p"],
            &[
                "a[href*='finance.sina.com.cn']",
                ".news-item-title a",
                ".blk_A h3 a",
            ],
        ),
        site(
            "腾讯财经",
            "https://finance.qq.com/",
            &[
                "h1",
                "h2",
                "h3",
                ".title",
                ".news-title",
                ".article-title",
                ".item-title",
                ".main-title",
                ".txt-title",
            ],
            &[
                ".content",
                ".article-content",
                ".news-content",
                ".text p",
                ".main-content",
            ],
            &[
                "a[href*='finance.qq.com']",
                "a[href*='new.qq.com']",
                ".title a",
                ".item-title a",
                ".txt-title a",
            ],
        ),
        site(
            "央视网财经",
            "http://finance.cctv.com/",
            &["h1", "h2", "h3", ".title", ".news_title", ".article_tit", ".tit"],
            &[".content", ".article_content", ".news_content", ".cnt_bd p"],
            &["a[href*='finance.cctv.com']", ".title a", ".tit a"],
        ),
        site(
            "人民网财经",
            "http://finance.people.com.cn/",
            &["h1", "h2", "h3", ".title", ".news_title", ".p2j_title", ".fl a"],
            &[".content", ".article_content", ".news_content", ".show_text p"],
            &["a[href*='finance.people.com.cn']", ".title a", ".p2j_title a"],
        ),
    ]
}
