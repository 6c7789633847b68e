//! Command-line interface definitions.
//!
//! Three subcommands: `detect` probes every configured site, `crawl` runs
//! the extraction pipeline against one site, and `sites` lists the
//! configured names. Site definitions default to the built-in table and can
//! be replaced with a YAML file.

use clap::{Parser, Subcommand};

/// Command-line arguments for the universal news spider.
///
/// # Examples
///
/// ```sh
/// # Probe all configured sites
/// universal_news_spider detect
///
/// # Crawl the detector's recommended site
/// universal_news_spider crawl
///
/// # Crawl one site explicitly, capping at 10 articles
/// universal_news_spider crawl --site 网易财经 --max-count 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML file with site definitions (defaults to the built-in table)
    #[arg(short = 'f', long, env = "NEWS_SITES_FILE")]
    pub sites_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe every configured site and report availability
    Detect,

    /// List the configured site names and URLs
    Sites,

    /// Crawl one site and save the extracted articles
    Crawl {
        /// Site name to crawl; omitted = detector recommendation
        #[arg(short, long)]
        site: Option<String>,

        /// Maximum number of articles to extract
        #[arg(long, default_value_t = 20)]
        max_count: usize,

        /// Output directory for JSON/CSV files
        #[arg(short, long, default_value = "data")]
        output_dir: String,

        /// Skip writing the CSV file
        #[arg(long)]
        no_csv: bool,
    },
}
