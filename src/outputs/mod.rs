//! Persistence collaborators for extracted records.
//!
//! The core hands off owned [`NewsRecord`](crate::models::NewsRecord) lists;
//! these modules serialize them to timestamped files:
//!
//! - [`json`]: pretty-printed JSON array
//! - [`csv`]: flat CSV with the contract field names as the header
//!
//! File names follow `news_%Y%m%d_%H%M%S.{json,csv}`.

use std::collections::BTreeMap;

use crate::models::NewsRecord;

pub mod csv;
pub mod json;

/// Quick statistics over one crawl's records, for console display.
#[derive(Debug)]
pub struct CrawlStats {
    /// Total record count.
    pub total: usize,
    /// Records per source site.
    pub by_source: BTreeMap<String, usize>,
    /// Mean summary length in characters (0 when empty).
    pub avg_summary_chars: usize,
}

/// Summarize a record list.
pub fn summarize(records: &[NewsRecord]) -> CrawlStats {
    let mut by_source = BTreeMap::new();
    let mut summary_chars = 0usize;
    for record in records {
        *by_source.entry(record.source.clone()).or_insert(0) += 1;
        summary_chars += record.summary.chars().count();
    }
    CrawlStats {
        total: records.len(),
        by_source,
        avg_summary_chars: if records.is_empty() {
            0
        } else {
            summary_chars / records.len()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, summary: &str) -> NewsRecord {
        NewsRecord {
            title: "测试标题".to_string(),
            url: "https://example.com/news/1.html".to_string(),
            summary: summary.to_string(),
            crawl_time: "2025-07-08 12:00:00".to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn summarize_counts_by_source() {
        let records = vec![
            record("网易财经", "四个字的"),
            record("网易财经", "八个字符长度的"),
            record("新浪财经", "四个字的"),
        ];
        let stats = summarize(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_source["网易财经"], 2);
        assert_eq!(stats.by_source["新浪财经"], 1);
        assert_eq!(stats.avg_summary_chars, 5);
    }

    #[test]
    fn summarize_empty_is_zeroed() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_summary_chars, 0);
        assert!(stats.by_source.is_empty());
    }
}
