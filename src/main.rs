//! # Universal News Spider
//!
//! A config-driven news crawler. Each supported site is described
//! declaratively — base URL, text encoding, and ordered CSS selector lists
//! for titles, content, and article links — and the same two-stage pipeline
//! runs against any of them:
//!
//! 1. **Detection**: tiered probes (connectivity → selector validity →
//!    page metadata) rank the configured sites by usability.
//! 2. **Extraction**: the listing page is fetched, article links are
//!    harvested through pattern filtering, and each article's title and
//!    summary are extracted via selector fallback with boilerplate
//!    rejection.
//!
//! ## Usage
//!
//! ```sh
//! universal_news_spider detect
//! universal_news_spider crawl --site 网易财经 --max-count 10
//! ```

use clap::Parser;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod detector;
mod error;
mod extractor;
mod fetch;
mod models;
mod outputs;
mod text;
mod urls;

use cli::{Cli, Command};
use config::SpiderConfig;
use detector::SiteDetector;
use error::SpiderError;
use extractor::UniversalSpider;
use models::SiteStatus;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), SpiderError> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "parsed CLI arguments");

    let sites = match &args.sites_file {
        Some(path) => {
            info!(%path, "loading site definitions");
            config::load_sites_file(path)?
        }
        None => config::builtin_sites(),
    };
    let spider_config = SpiderConfig::default();

    match args.command {
        Command::Sites => {
            for site in &sites {
                println!("{}  {}", site.name, site.url);
            }
        }

        Command::Detect => {
            let detector = SiteDetector::new(spider_config)?;
            let results = detector.detect_all(&sites).await;

            for result in &results {
                let icon = match result.status {
                    SiteStatus::Success => "[OK]  ",
                    SiteStatus::Partial => "[WARN]",
                    SiteStatus::Failed => "[FAIL]",
                };
                println!("{icon} {} - {}", result.site, result.message);
                if let Some(info) = &result.info {
                    println!(
                        "       title: {}  encoding: {}  bytes: {}",
                        text::truncate_chars(&info.title, 40),
                        info.encoding,
                        info.content_length
                    );
                }
            }
            let available = results
                .iter()
                .filter(|r| r.status == SiteStatus::Success)
                .count();
            println!("\n{available}/{} sites available", results.len());
        }

        Command::Crawl {
            site,
            max_count,
            output_dir,
            no_csv,
        } => {
            let mut crawl_config = spider_config;
            crawl_config.max_news_count = max_count;

            let spider = match site {
                Some(name) => UniversalSpider::for_site(&sites, crawl_config, &name)?,
                None => UniversalSpider::auto(&sites, crawl_config).await?,
            };
            println!("crawling {} ...", spider.site_name());

            let records = spider.crawl_news().await;
            if records.is_empty() {
                warn!("no articles were extracted");
                return Ok(());
            }

            let stats = outputs::summarize(&records);
            println!(
                "extracted {} articles (avg summary {} chars)",
                stats.total, stats.avg_summary_chars
            );
            for (source, count) in &stats.by_source {
                println!("  {source}: {count}");
            }

            let json_path = outputs::json::write_records(&records, &output_dir).await?;
            println!("saved JSON: {}", json_path.display());
            if !no_csv {
                let csv_path = outputs::csv::write_records(&records, &output_dir).await?;
                println!("saved CSV:  {}", csv_path.display());
            }

            // short preview of the first few records
            for (i, record) in records.iter().take(3).enumerate() {
                println!("\n{}. {}", i + 1, record.title);
                println!("   {}", text::truncate_chars(&record.summary, 100));
                println!("   {} ({})", record.url, record.crawl_time);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "execution complete");
    Ok(())
}
