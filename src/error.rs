//! Error taxonomy for the crawler.
//!
//! Transport failures are retried by the fetcher and degrade to "no data for
//! this URL"; structural failures (no selector match, invalid text) are
//! absorbed where they occur and never surface here. Only configuration
//! problems and exhausted retry budgets become explicit error values.

use thiserror::Error;

/// Crawler-wide error types.
#[derive(Error, Debug)]
pub enum SpiderError {
    /// A page answered with a non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// A request exceeded its timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The retry budget for a single URL is spent.
    #[error("giving up on {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },

    /// A site was requested by name but is not configured.
    #[error("no site named '{0}' is configured")]
    UnknownSite(String),

    /// Two configured sites share the same name.
    #[error("duplicate site name '{0}' in configuration")]
    DuplicateSite(String),

    /// A site's base URL does not parse.
    #[error("invalid base URL '{url}' for site '{site}': {message}")]
    InvalidSiteUrl {
        site: String,
        url: String,
        message: String,
    },

    /// The detector found no site whose structure checks out.
    #[error("no usable news site was found")]
    NoAvailableSite,

    /// Filesystem failure while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The site definitions file could not be parsed.
    #[error("site file error: {0}")]
    SiteFile(#[from] serde_yaml::Error),
}

impl SpiderError {
    /// Classify a `reqwest` failure into the transport taxonomy.
    pub fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpiderError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            SpiderError::Network {
                url: url.to_string(),
                message: format!("connection failed: {e}"),
            }
        } else {
            SpiderError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }

    /// True for failures the fetcher considers worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SpiderError::HttpStatus { .. }
                | SpiderError::Timeout { .. }
                | SpiderError::Network { .. }
                | SpiderError::RetriesExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(
            SpiderError::Timeout {
                url: "http://example.com".into()
            }
            .is_transport()
        );
        assert!(
            SpiderError::HttpStatus {
                url: "http://example.com".into(),
                status: 500
            }
            .is_transport()
        );
        assert!(!SpiderError::UnknownSite("网易财经".into()).is_transport());
        assert!(!SpiderError::NoAvailableSite.is_transport());
    }

    #[test]
    fn display_includes_context() {
        let e = SpiderError::RetriesExhausted {
            url: "http://money.163.com/".into(),
            attempts: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("money.163.com"));
        assert!(msg.contains('4'));
    }
}
