//! Universal, selector-driven article extraction.
//!
//! One [`UniversalSpider`] runs against a single [`SiteConfig`]: fetch the
//! listing page, harvest candidate article links, then fetch each article
//! and extract a title and summary through the site's ordered selector
//! lists. Selector lists are first-match-wins — as soon as one selector
//! yields a valid result, the rest of its list is never tried.
//!
//! Individual article failures are logged and skipped; only a listing-page
//! fetch failure ends the run (with an empty result, not an error).

use chrono::Local;
use itertools::Itertools;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{self, SiteConfig, SpiderConfig};
use crate::detector::SiteDetector;
use crate::error::SpiderError;
use crate::fetch::Fetcher;
use crate::models::{CandidateLink, NO_SUMMARY, NewsRecord};
use crate::text;
use crate::urls;

/// Paragraphs shorter than this never make it into a summary.
const MIN_PARAGRAPH_CHARS: usize = 10;
/// A summary concatenates at most this many paragraphs.
const SUMMARY_PARAGRAPHS: usize = 3;

/// Extraction pipeline bound to one site.
#[derive(Debug)]
pub struct UniversalSpider {
    site: SiteConfig,
    base_url: Url,
    fetcher: Fetcher,
    config: SpiderConfig,
}

impl UniversalSpider {
    /// Build a spider for an explicitly named site.
    pub fn for_site(
        sites: &[SiteConfig],
        config: SpiderConfig,
        name: &str,
    ) -> Result<Self, SpiderError> {
        let site = config::find_site(sites, name)
            .cloned()
            .ok_or_else(|| SpiderError::UnknownSite(name.to_string()))?;
        Self::with_site(site, config)
    }

    /// Build a spider for the detector's recommended site.
    pub async fn auto(sites: &[SiteConfig], config: SpiderConfig) -> Result<Self, SpiderError> {
        let detector = SiteDetector::new(config.clone())?;
        let site = detector.recommend_best_site(sites).await?;
        info!(site = %site.name, "auto-selected site");
        Self::with_site(site, config)
    }

    pub fn with_site(site: SiteConfig, config: SpiderConfig) -> Result<Self, SpiderError> {
        let base_url = Url::parse(&site.url).map_err(|e| SpiderError::InvalidSiteUrl {
            site: site.name.clone(),
            url: site.url.clone(),
            message: e.to_string(),
        })?;
        let fetcher = Fetcher::new(config.clone())?;
        Ok(Self {
            site,
            base_url,
            fetcher,
            config,
        })
    }

    /// Name of the site this spider is bound to.
    pub fn site_name(&self) -> &str {
        &self.site.name
    }

    /// Run the full pipeline: listing fetch, link harvest, per-article
    /// extraction. Returns the validated records; never errors for
    /// individual articles.
    #[instrument(level = "info", skip(self), fields(site = %self.site.name))]
    pub async fn crawl_news(&self) -> Vec<NewsRecord> {
        info!(url = %self.site.url, "fetching listing page");
        let links = {
            let doc = match self.fetcher.fetch(&self.site.url, &self.site.encoding).await {
                Ok(doc) => doc,
                Err(e) => {
                    error!(error = %e, "could not fetch the listing page");
                    return Vec::new();
                }
            };
            self.harvest_links(&doc)
        };

        if links.is_empty() {
            error!("no article links discovered on the listing page");
            return Vec::new();
        }
        let total = links.len().min(self.config.max_news_count);
        info!(count = links.len(), "discovered candidate article links");

        let mut records = Vec::new();
        let mut failed = 0usize;
        for (i, link) in links
            .into_iter()
            .take(self.config.max_news_count)
            .enumerate()
        {
            debug!(index = i + 1, total, url = %link.url, "processing article");
            let record = match self.fetcher.fetch(&link.url, &self.site.encoding).await {
                Ok(doc) => self.extract_record(&doc, &link.url),
                Err(e) => {
                    warn!(url = %link.url, error = %e, "article fetch failed");
                    failed += 1;
                    continue;
                }
            };
            match record {
                Some(r) => {
                    info!(title = %text::truncate_chars(&r.title, 50), "extracted article");
                    records.push(r);
                }
                None => {
                    debug!(url = %link.url, "article rejected by validity filters");
                    failed += 1;
                }
            }
        }

        info!(
            succeeded = records.len(),
            failed,
            total,
            "crawl complete"
        );
        records
    }

    /// Harvest article links from the listing page.
    ///
    /// Link selectors are tried in order; the first selector producing at
    /// least one accepted link wins and the rest are skipped. Links are
    /// deduplicated by URL and capped at the configured maximum.
    fn harvest_links(&self, doc: &Html) -> Vec<CandidateLink> {
        for raw in &self.site.selectors.links {
            let selector = match Selector::parse(raw) {
                Ok(s) => s,
                Err(e) => {
                    warn!(selector = %raw, error = %e, "unparseable link selector");
                    continue;
                }
            };
            let links: Vec<CandidateLink> = doc
                .select(&selector)
                .filter_map(|el| {
                    let href = el.value().attr("href")?;
                    let url = urls::normalize_url(href, &self.base_url)?;
                    urls::is_likely_article(&url).then(|| CandidateLink {
                        url,
                        text: text::clean_text(&el.text().collect::<Vec<_>>().join(" ")),
                    })
                })
                .unique_by(|link| link.url.clone())
                .take(self.config.max_news_count)
                .collect();

            if !links.is_empty() {
                info!(selector = %raw, count = links.len(), "link selector matched");
                return links;
            }
        }
        Vec::new()
    }

    /// Assemble a record from one article page, or reject it.
    fn extract_record(&self, doc: &Html, url: &str) -> Option<NewsRecord> {
        let title = self.extract_title(doc)?;
        let summary = self.extract_summary(doc);
        // the sentinel deliberately passes; a short real summary does not
        if summary != NO_SUMMARY
            && summary.chars().count() < self.config.min_summary_length
        {
            debug!(%url, "summary below minimum length");
            return None;
        }
        Some(NewsRecord {
            title,
            url: url.to_string(),
            summary,
            crawl_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: self.site.name.clone(),
        })
    }

    /// First valid title across the ordered selector list, falling back to
    /// the document `<title>` with known site suffixes stripped.
    fn extract_title(&self, doc: &Html) -> Option<String> {
        for raw in &self.site.selectors.title {
            let selector = match Selector::parse(raw) {
                Ok(s) => s,
                Err(e) => {
                    warn!(selector = %raw, error = %e, "unparseable title selector");
                    continue;
                }
            };
            for el in doc.select(&selector) {
                let candidate = text::clean_text(&el.text().collect::<Vec<_>>().join(" "));
                if text::is_valid_title(&candidate, self.config.min_title_length) {
                    return Some(candidate);
                }
            }
        }

        let title_selector = Selector::parse("title").expect("static selector");
        let el = doc.select(&title_selector).next()?;
        let fallback = text::strip_site_suffix(&text::clean_text(
            &el.text().collect::<Vec<_>>().join(" "),
        ));
        text::is_valid_title(&fallback, self.config.min_title_length).then_some(fallback)
    }

    /// First content selector yielding any valid paragraph wins; up to three
    /// paragraphs are joined and capped at the configured summary length.
    fn extract_summary(&self, doc: &Html) -> String {
        for raw in &self.site.selectors.content {
            let selector = match Selector::parse(raw) {
                Ok(s) => s,
                Err(e) => {
                    warn!(selector = %raw, error = %e, "unparseable content selector");
                    continue;
                }
            };
            let paragraphs: Vec<String> = doc
                .select(&selector)
                .map(|el| text::clean_text(&el.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS && text::is_valid_paragraph(t))
                .take(SUMMARY_PARAGRAPHS)
                .collect();

            if !paragraphs.is_empty() {
                return text::truncate_chars(
                    &paragraphs.join(" "),
                    self.config.summary_max_length,
                );
            }
        }
        NO_SUMMARY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorSet;
    use httpmock::prelude::*;

    fn site_for(url: String, links: &[&str]) -> SiteConfig {
        SiteConfig {
            name: "测试财经".to_string(),
            url,
            encoding: "utf-8".to_string(),
            selectors: SelectorSet {
                title: vec!["h1".to_string(), ".news_title".to_string()],
                content: vec![".content p".to_string(), "p".to_string()],
                links: links.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn spider(site: SiteConfig) -> UniversalSpider {
        UniversalSpider::with_site(site, SpiderConfig::immediate()).unwrap()
    }

    const ARTICLE_BODY: &str = concat!(
        "<html><head><title>央行宣布全面降准支持实体经济_网易财经</title></head><body>",
        "<h1>央行宣布全面降准支持实体经济发展</h1>",
        "<div class=\"content\">",
        "<p>中国人民银行今日宣布，下调金融机构存款准备金率0.5个百分点。</p>",
        "<p>分析人士认为，此次降准将释放长期资金约一万亿元人民币。</p>",
        "<p>广告：点击这里了解更多理财产品优惠活动。</p>",
        "<p>市场普遍预期，流动性宽松将利好股市和债市表现。</p>",
        "</div></body></html>"
    );

    #[tokio::test]
    async fn harvests_resolves_and_dedupes_listing_links() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(concat!(
                "<html><body>",
                "<a class=\"x\" href=\"/2024/01/01/foo.html\">第一条新闻标题</a>",
                "<a class=\"x\" href=\"/2024/01/01/bar.html\">第二条新闻标题</a>",
                "<a class=\"x\" href=\"/2024/01/01/foo.html\">重复的第一条</a>",
                "<a class=\"x\" href=\"/login\">登录</a>",
                "</body></html>"
            ));
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let spider = spider(site);
        let doc = spider
            .fetcher
            .fetch(&spider.site.url, "utf-8")
            .await
            .unwrap();
        let links = spider.harvest_links(&doc);

        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                format!("{}2024/01/01/foo.html", server.url("/")),
                format!("{}2024/01/01/bar.html", server.url("/")),
            ]
        );
        assert_eq!(links[0].text, "第一条新闻标题");
    }

    #[tokio::test]
    async fn first_link_selector_with_hits_wins() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(concat!(
                "<html><body>",
                "<a class=\"primary\" href=\"/2024/01/01/a.html\">甲</a>",
                "<a class=\"secondary\" href=\"/2024/01/01/b.html\">乙</a>",
                "</body></html>"
            ));
        });

        // both selectors would match; only the first list entry is used
        let site = site_for(server.url("/"), &["a.primary", "a.secondary"]);
        let spider = spider(site);
        let doc = spider
            .fetcher
            .fetch(&spider.site.url, "utf-8")
            .await
            .unwrap();
        let links = spider.harvest_links(&doc);

        assert_eq!(links.len(), 1);
        assert!(links[0].url.ends_with("/2024/01/01/a.html"));
    }

    #[tokio::test]
    async fn crawl_extracts_validated_records() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                "<html><body><a class=\"x\" href=\"/2024/01/01/foo.html\">新闻</a></body></html>",
            );
        });
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/foo.html");
            then.status(200).body(ARTICLE_BODY);
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "央行宣布全面降准支持实体经济发展");
        assert_eq!(record.source, "测试财经");
        assert!(record.url.ends_with("/2024/01/01/foo.html"));
        // ad paragraph filtered, valid paragraphs joined in order
        assert!(record.summary.starts_with("中国人民银行今日宣布"));
        assert!(record.summary.contains("一万亿元"));
        assert!(!record.summary.contains("广告"));
        assert!(record.summary.chars().count() <= 200);
    }

    #[tokio::test]
    async fn no_link_selector_match_yields_empty_run() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .body("<html><body><p>没有任何链接的页面内容</p></body></html>");
        });

        let site = site_for(server.url("/"), &["a.missing"]);
        let records = spider(site).crawl_news().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unreachable_listing_page_yields_empty_run() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn failed_article_fetch_skips_only_that_article() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(concat!(
                "<html><body>",
                "<a class=\"x\" href=\"/2024/01/01/dead.html\">打不开的文章链接</a>",
                "<a class=\"x\" href=\"/2024/01/01/live.html\">能打开的文章链接</a>",
                "</body></html>"
            ));
        });
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/dead.html");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/live.html");
            then.status(200).body(ARTICLE_BODY);
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;

        assert_eq!(records.len(), 1);
        assert!(records[0].url.ends_with("/live.html"));
    }

    #[tokio::test]
    async fn boilerplate_only_titles_reject_the_article() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                "<html><body><a class=\"x\" href=\"/2024/01/01/more.html\">更多</a></body></html>",
            );
        });
        // h1 is exactly the "more" phrase; <title> is boilerplate too
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/more.html");
            then.status(200).body(concat!(
                "<html><head><title>更多财经资讯尽在本站首页栏目</title></head><body>",
                "<h1>更多</h1>",
                "<p>中国人民银行今日宣布下调存款准备金率。</p>",
                "</body></html>"
            ));
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn sentinel_summary_survives_length_gate() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                "<html><body><a class=\"x\" href=\"/2024/01/01/bare.html\">新闻</a></body></html>",
            );
        });
        // valid title, but no content selector yields a usable paragraph
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/bare.html");
            then.status(200).body(concat!(
                "<html><body>",
                "<h1>国务院发布新一轮稳增长政策措施</h1>",
                "</body></html>"
            ));
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn summary_is_capped_at_configured_length() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                "<html><body><a class=\"x\" href=\"/2024/01/01/long.html\">新闻</a></body></html>",
            );
        });
        let long_paragraph = "有关部门负责人表示将持续推进改革，".repeat(30);
        server.mock(|when, then| {
            when.method(GET).path("/2024/01/01/long.html");
            then.status(200).body(format!(
                "<html><body><h1>很长正文的新闻标题示例文章</h1>\
                 <div class=\"content\"><p>{long_paragraph}</p></div></body></html>"
            ));
        });

        let site = site_for(server.url("/"), &["a.x"]);
        let records = spider(site).crawl_news().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary.chars().count(), 200);
    }

    #[test]
    fn unknown_site_name_is_a_config_failure() {
        let sites = crate::config::builtin_sites();
        let err = UniversalSpider::for_site(&sites, SpiderConfig::immediate(), "不存在")
            .unwrap_err();
        assert!(matches!(err, SpiderError::UnknownSite(_)));
    }
}
