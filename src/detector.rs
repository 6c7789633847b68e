//! Tiered site availability and structure detection.
//!
//! For each configured site, three tiers run in sequence and short-circuit
//! downward:
//!
//! 1. **Connectivity**: a single GET under the shorter probe timeout;
//!    anything but HTTP 200 fails the site outright.
//! 2. **Structure**: do any title selectors yield non-empty text, and any
//!    link selectors yield a non-empty `href`?
//! 3. **Site info**: page `<title>`, resolved encoding, byte length, and
//!    status — descriptive metadata, not a pass/fail signal.
//!
//! Sites are probed serially with a fixed pause in between; one site's
//! failure never blocks another's probe.

use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::{SiteConfig, SpiderConfig};
use crate::error::SpiderError;
use crate::fetch::{Fetcher, decode_body};
use crate::models::{DetectionResult, SiteInfo, SiteStatus};

/// Probes configured sites and ranks the usable ones.
pub struct SiteDetector {
    fetcher: Fetcher,
    config: SpiderConfig,
}

impl SiteDetector {
    pub fn new(config: SpiderConfig) -> Result<Self, SpiderError> {
        let fetcher = Fetcher::new(config.clone())?;
        Ok(Self { fetcher, config })
    }

    /// Run all three tiers against one site.
    #[instrument(level = "info", skip(self, site), fields(site = %site.name, url = %site.url))]
    pub async fn detect_site(&self, site: &SiteConfig) -> DetectionResult {
        // Tier 1: connectivity
        let resp = match self.fetcher.probe(&site.url).await {
            Ok(resp) if resp.status == 200 => resp,
            Ok(resp) => {
                warn!(status = resp.status, "site unreachable");
                return failed(site, format!("unreachable (status {})", resp.status));
            }
            Err(e) => {
                warn!(error = %e, "site unreachable");
                return failed(site, "unreachable".to_string());
            }
        };

        let body = decode_body(&resp.bytes, &site.encoding);
        let doc = Html::parse_document(&body);

        // Tier 2: selector validity
        let title_found = any_selector_with_text(&doc, &site.selectors.title);
        let links_found = any_selector_with_href(&doc, &site.selectors.links);
        let (status, message, selectors_valid) = match (title_found, links_found) {
            (true, true) => (SiteStatus::Success, "site structure OK", true),
            (true, false) => (SiteStatus::Partial, "link selectors need tuning", false),
            (false, true) => (SiteStatus::Partial, "title selectors need tuning", false),
            (false, false) => (SiteStatus::Partial, "no valid selectors", false),
        };

        // Tier 3: descriptive page metadata
        let info = SiteInfo {
            title: page_title(&doc),
            encoding: resp.charset,
            content_length: resp.bytes.len(),
            status_code: resp.status,
        };

        match status {
            SiteStatus::Success => info!(outcome = message, "site detected"),
            _ => warn!(outcome = message, "site partially usable"),
        }

        DetectionResult {
            site: site.name.clone(),
            url: site.url.clone(),
            status,
            message: message.to_string(),
            info: Some(info),
            selectors_valid,
        }
    }

    /// Probe every site serially, pausing between probes.
    #[instrument(level = "info", skip_all, fields(sites = sites.len()))]
    pub async fn detect_all(&self, sites: &[SiteConfig]) -> Vec<DetectionResult> {
        let mut results = Vec::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            if i > 0 && self.config.probe_delay_ms > 0 {
                sleep(std::time::Duration::from_millis(self.config.probe_delay_ms)).await;
            }
            results.push(self.detect_site(site).await);
        }
        let available = results
            .iter()
            .filter(|r| r.status == SiteStatus::Success)
            .count();
        info!(available, total = results.len(), "detection run complete");
        results
    }

    /// Fully-usable sites in configured order, plus every probe result.
    pub async fn available_sites(
        &self,
        sites: &[SiteConfig],
    ) -> (Vec<SiteConfig>, Vec<DetectionResult>) {
        let results = self.detect_all(sites).await;
        let available = results
            .iter()
            .filter(|r| r.status == SiteStatus::Success)
            .filter_map(|r| sites.iter().find(|s| s.name == r.site).cloned())
            .collect();
        (available, results)
    }

    /// First available site in configured order; unscored by design.
    pub async fn recommend_best_site(
        &self,
        sites: &[SiteConfig],
    ) -> Result<SiteConfig, SpiderError> {
        let (available, _) = self.available_sites(sites).await;
        available
            .into_iter()
            .next()
            .ok_or(SpiderError::NoAvailableSite)
    }
}

fn failed(site: &SiteConfig, message: String) -> DetectionResult {
    DetectionResult {
        site: site.name.clone(),
        url: site.url.clone(),
        status: SiteStatus::Failed,
        message,
        info: None,
        selectors_valid: false,
    }
}

/// First selector in the list yielding an element with non-empty text wins.
fn any_selector_with_text(doc: &Html, selectors: &[String]) -> bool {
    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %raw, error = %e, "unparseable title selector");
                continue;
            }
        };
        let hits = doc
            .select(&selector)
            .filter(|el| !el.text().collect::<String>().trim().is_empty())
            .count();
        if hits > 0 {
            info!(selector = %raw, hits, "title selector matched");
            return true;
        }
    }
    false
}

/// First selector in the list yielding an element with a non-empty href wins.
fn any_selector_with_href(doc: &Html, selectors: &[String]) -> bool {
    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %raw, error = %e, "unparseable link selector");
                continue;
            }
        };
        let hits = doc
            .select(&selector)
            .filter(|el| el.value().attr("href").is_some_and(|h| !h.is_empty()))
            .count();
        if hits > 0 {
            info!(selector = %raw, hits, "link selector matched");
            return true;
        }
    }
    false
}

fn page_title(doc: &Html) -> String {
    let selector = Selector::parse("title").expect("static selector");
    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
