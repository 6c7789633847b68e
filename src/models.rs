//! Data models shared across the detector, extractor, and output writers.
//!
//! - [`NewsRecord`]: the terminal artifact of one extraction run
//! - [`CandidateLink`]: an article URL harvested from a listing page
//! - [`DetectionResult`] / [`SiteInfo`] / [`SiteStatus`]: per-site probe
//!   outcomes produced by the detector
//!
//! Field names on [`NewsRecord`] (`title`, `url`, `summary`, `crawl_time`,
//! `source`) are a stable contract with the persistence collaborators.

use serde::{Deserialize, Serialize};

/// Placeholder summary when no content selector yields a valid paragraph.
///
/// A record carrying this value passed title validation but not summary
/// extraction; it is kept deliberately to signal incomplete extraction.
pub const NO_SUMMARY: &str = "暂无摘要";

/// One validated news article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsRecord {
    /// Normalized headline; always at least the configured minimum length.
    pub title: String,
    /// Canonical absolute URL of the article.
    pub url: String,
    /// Up to three body paragraphs, capped at the configured maximum length,
    /// or [`NO_SUMMARY`].
    pub summary: String,
    /// Capture timestamp, `%Y-%m-%d %H:%M:%S` local time.
    pub crawl_time: String,
    /// Name of the site the record came from.
    pub source: String,
}

/// A candidate article link discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Normalized absolute URL.
    pub url: String,
    /// Anchor text observed at discovery time (may be empty).
    pub text: String,
}

/// Aggregate verdict for one probed site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Reachable and both title and link selectors hit.
    Success,
    /// Reachable but at least one selector list needs tuning.
    Partial,
    /// Connectivity probe failed.
    Failed,
}

/// Descriptive page metadata gathered by the detector's third tier.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    /// Text of the page's `<title>` element.
    pub title: String,
    /// Encoding resolved from the response headers.
    pub encoding: String,
    /// Body size in bytes.
    pub content_length: usize,
    /// HTTP status of the probe response.
    pub status_code: u16,
}

/// Per-site outcome of one detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    /// Site name, matching the configuration entry.
    pub site: String,
    /// The probed listing URL.
    pub url: String,
    /// Aggregate status.
    pub status: SiteStatus,
    /// Human-readable explanation of the status.
    pub message: String,
    /// Page metadata; absent when the connectivity probe failed.
    pub info: Option<SiteInfo>,
    /// True iff both selector families produced hits.
    pub selectors_valid: bool,
}
