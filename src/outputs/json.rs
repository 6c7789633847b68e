//! JSON export of extracted records.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::SpiderError;
use crate::models::NewsRecord;

/// Write the record list as a pretty-printed JSON array.
///
/// Creates `dir` if needed and returns the path of the timestamped file.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_records(records: &[NewsRecord], dir: &str) -> Result<PathBuf, SpiderError> {
    fs::create_dir_all(dir).await?;
    let filename = format!("news_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = Path::new(dir).join(filename);

    let json = serde_json::to_string_pretty(records)?;
    fs::write(&path, json).await?;

    info!(path = %path.display(), "wrote JSON records");
    Ok(path)
}
