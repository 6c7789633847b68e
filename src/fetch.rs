//! HTTP fetching with pacing, identity rotation, and bounded retry.
//!
//! Every request sleeps a random interval first (human-pace simulation),
//! carries a rotated browser User-Agent over a fixed header set, and runs
//! under a per-request timeout. [`Fetcher::fetch`] retries failed attempts
//! in an explicit loop bounded by `max_retries`; the body is decoded with
//! the site's declared encoding before parsing.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT,
};
use reqwest::redirect::Policy;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::config::SpiderConfig;
use crate::error::SpiderError;

/// Browser-plausible identities, one picked at random per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.2420.81",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// Raw connectivity-probe response for the detector.
#[derive(Debug)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded body bytes.
    pub bytes: Vec<u8>,
    /// Charset label from the `Content-Type` header, `utf-8` if absent.
    pub charset: String,
}

/// Paced, retrying HTTP client over one [`SpiderConfig`].
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    config: SpiderConfig,
}

impl Fetcher {
    pub fn new(config: SpiderConfig) -> Result<Self, SpiderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| SpiderError::Network {
                url: String::new(),
                message: format!("client build failed: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn random_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// Sleep a uniform random duration from the configured interval.
    async fn pacing_delay(&self) {
        let (lo, hi) = self.config.delay_range_ms;
        if hi == 0 {
            return;
        }
        let ms = rand::rng().random_range(lo..=hi);
        sleep(Duration::from_millis(ms)).await;
    }

    /// One GET, no retry. Transport errors map onto the error taxonomy.
    async fn try_get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, SpiderError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, Self::random_user_agent())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SpiderError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let charset = charset_from_content_type(response.headers())
            .unwrap_or_else(|| "utf-8".to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpiderError::from_reqwest(url, e))?
            .to_vec();

        Ok(ProbeResponse {
            status,
            bytes,
            charset,
        })
    }

    /// Fetch a page, decode it with the site's declared encoding, and parse it.
    ///
    /// Non-200 statuses and transport errors are retried; after
    /// `max_retries` extra attempts the call returns
    /// [`SpiderError::RetriesExhausted`]. Total attempts = `max_retries + 1`.
    #[instrument(level = "debug", skip(self, encoding))]
    pub async fn fetch(&self, url: &str, encoding: &str) -> Result<Html, SpiderError> {
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            self.pacing_delay().await;

            match self.try_get(url, self.config.request_timeout).await {
                Ok(resp) if resp.status == 200 => {
                    let body = decode_body(&resp.bytes, encoding);
                    debug!(%url, bytes = resp.bytes.len(), attempts, "fetched page");
                    return Ok(Html::parse_document(&body));
                }
                Ok(resp) => {
                    let e = SpiderError::HttpStatus {
                        url: url.to_string(),
                        status: resp.status,
                    };
                    warn!(%url, error = %e, attempt = attempts, "unexpected page status");
                }
                Err(e) => {
                    warn!(%url, error = %e, attempt = attempts, "request failed");
                }
            }

            if attempts > self.config.max_retries {
                error!(%url, attempts, "retry budget exhausted");
                return Err(SpiderError::RetriesExhausted {
                    url: url.to_string(),
                    attempts,
                });
            }
        }
    }

    /// Single connectivity-test GET with the shorter probe timeout, no retry.
    #[instrument(level = "debug", skip(self))]
    pub async fn probe(&self, url: &str) -> Result<ProbeResponse, SpiderError> {
        self.try_get(url, self.config.connect_test_timeout).await
    }
}

/// Decode bytes with a labelled encoding, falling back to UTF-8.
pub fn decode_body(bytes: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').find_map(|part| {
        let part = part.trim().to_ascii_lowercase();
        part.strip_prefix("charset=")
            .map(|c| c.trim_matches('"').to_string())
    })
}
