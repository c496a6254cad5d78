//! wp_harvest library: WordPress content-URL harvesting.
//!
//! Given a list of site base URLs, this library discovers article links by
//! probing well-known sitemap and RSS/Atom feed endpoints with configurable
//! fallback between the two strategies, optionally validates link liveness,
//! optionally scrapes AdSense publisher IDs from each homepage, and
//! optionally screenshots each site with a headless browser to detect
//! bot-challenge walls.
//!
//! # Example
//!
//! ```no_run
//! use wp_harvest::{run_harvest, Config, HarvestOutput};
//! use clap::Parser;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::parse_from(["wp_harvest", "sites.txt", "--limit", "10"]);
//! match run_harvest(config).await? {
//!     HarvestOutput::Batch(report) => {
//!         println!("{} sites succeeded, {} failed",
//!                  report.successful_sites, report.failed_sites);
//!     }
//!     HarvestOutput::UrlCheck { results } => {
//!         println!("{} URLs checked", results.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions from an async context. Bot-wall
//! checking additionally requires a Chromium installation.

pub mod adsense;
pub mod app;
pub mod batch;
pub mod botwall;
pub mod config;
pub mod error_handling;
pub mod extract;
pub mod feed;
pub mod initialization;
pub mod sitemap;
pub mod transport;
pub mod validity;
pub mod xml;

// Re-export public API
pub use batch::{BatchOptions, BatchReport, SiteOutcome};
pub use config::{Config, LogFormat, LogLevel};
pub use extract::{ExtractionResult, SourceKind, SourcePriority};
pub use run::{run_harvest, HarvestOutput};

// Internal run module (wires config, input reading, and the batch loop)
mod run {
    use std::time::Duration;

    use anyhow::{bail, Context, Result};
    use log::info;
    use serde::Serialize;
    use tokio::io::{AsyncBufReadExt, BufReader};

    use crate::app::print_error_statistics;
    use crate::batch::{run_batch, BatchOptions, BatchReport};
    use crate::config::Config;
    use crate::error_handling::ProcessingStats;
    use crate::extract::SourcePriority;
    use crate::initialization::init_client;
    use crate::validity::{self, ValidityVerdict};

    /// What a harvest run produced, ready for JSON serialization.
    #[derive(Debug, Serialize)]
    #[serde(untagged)]
    pub enum HarvestOutput {
        /// The full batch report (the default mode).
        Batch(BatchReport),
        /// Per-URL liveness verdicts (`--validate-only` mode).
        UrlCheck {
            /// One verdict per input line, in input order.
            results: Vec<ValidityVerdict>,
        },
    }

    /// Reads non-empty, non-comment lines from the input file ("-" = stdin).
    async fn read_input_lines(config: &Config) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        if config.file.as_os_str() == "-" {
            info!("Reading sites from stdin");
            let mut reader = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = reader.next_line().await? {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    lines.push(trimmed.to_string());
                }
            }
        } else {
            let file = tokio::fs::File::open(&config.file)
                .await
                .context("Failed to open input file")?;
            let mut reader = BufReader::new(file).lines();
            while let Some(line) = reader.next_line().await? {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    lines.push(trimmed.to_string());
                }
            }
        }

        Ok(lines)
    }

    /// Runs a harvest with the provided configuration.
    ///
    /// This is the main entry point for the library. It reads site URLs from
    /// the input file (or stdin), runs the batch controller under the
    /// configured flags, and returns the aggregate result for the caller to
    /// serialize.
    ///
    /// # Errors
    ///
    /// Returns an error only for malformed top-level input: an unreadable
    /// input file, an empty site list, or an HTTP client that fails to
    /// build. Per-site failures never propagate; they are recorded inside
    /// the returned report.
    pub async fn run_harvest(config: Config) -> Result<HarvestOutput> {
        let sites = read_input_lines(&config).await?;
        if sites.is_empty() {
            bail!("No sites found in input");
        }
        info!("Total sites in input: {}", sites.len());

        let client = init_client(&config).context("Failed to build HTTP client")?;
        let stats = ProcessingStats::new();

        if config.validate_only {
            // Input lines are article URLs, not site roots; probe them as-is.
            let results = validity::check_urls(&client, &stats, &sites).await;
            print_error_statistics(&stats);
            return Ok(HarvestOutput::UrlCheck { results });
        }

        let options = BatchOptions {
            limit: config.limit,
            check_validity: config.check_validity,
            check_adsense: config.check_adsense,
            check_captcha: config.check_captcha,
            priority: if config.feed_first {
                SourcePriority::FeedFirst
            } else {
                SourcePriority::SitemapFirst
            },
            deadline: (config.batch_deadline_seconds > 0)
                .then(|| Duration::from_secs(config.batch_deadline_seconds)),
            user_agent: config.user_agent.clone(),
        };

        let report: BatchReport = run_batch(&client, &stats, &sites, &options).await;
        print_error_statistics(&stats);

        Ok(HarvestOutput::Batch(report))
    }
}
