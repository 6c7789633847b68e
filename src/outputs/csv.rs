//! CSV export of extracted records.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::SpiderError;
use crate::models::NewsRecord;

/// Write the record list as CSV with a header row.
///
/// Creates `dir` if needed and returns the path of the timestamped file.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_records(records: &[NewsRecord], dir: &str) -> Result<PathBuf, SpiderError> {
    fs::create_dir_all(dir).await?;
    let filename = format!("news_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    let path = Path::new(dir).join(filename);

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| SpiderError::Io(std::io::Error::other(e)))?;
    fs::write(&path, data).await?;

    info!(path = %path.display(), "wrote CSV records");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_header_and_rows() {
        let dir = std::env::temp_dir().join("uns_csv_test");
        let records = vec![NewsRecord {
            title: "测试新闻标题示例".to_string(),
            url: "https://example.com/news/1.html".to_string(),
            summary: "一段足够长的摘要文字用于测试".to_string(),
            crawl_time: "2025-07-08 12:00:00".to_string(),
            source: "网易财经".to_string(),
        }];

        let path = write_records(&records, dir.to_str().unwrap()).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let mut lines = raw.lines();

        assert_eq!(lines.next(), Some("title,url,summary,crawl_time,source"));
        assert!(lines.next().unwrap().contains("测试新闻标题示例"));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
