//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `wp_harvest` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - JSON report output (stdout or `--output` file)
//! - User-facing summary formatting
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use wp_harvest::initialization::init_logger_with;
use wp_harvest::{run_harvest, Config, HarvestOutput};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let output_path = config.output.clone();
    let started = Instant::now();

    match run_harvest(config).await {
        Ok(output) => {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
            match output_path {
                Some(path) => {
                    tokio::fs::write(&path, &json)
                        .await
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    eprintln!("Report written to {}", path.display());
                }
                None => println!("{json}"),
            }

            // Summary goes to stderr so piped stdout stays valid JSON
            match &output {
                HarvestOutput::Batch(report) => {
                    eprintln!(
                        "✅ Processed {} site{} ({} succeeded, {} failed), {} URLs in {:.1}s",
                        report.processed_sites,
                        if report.processed_sites == 1 { "" } else { "s" },
                        report.successful_sites,
                        report.failed_sites,
                        report.total_urls,
                        started.elapsed().as_secs_f64()
                    );
                }
                HarvestOutput::UrlCheck { results } => {
                    let valid = results.iter().filter(|verdict| verdict.valid).count();
                    eprintln!(
                        "✅ Checked {} URL{} ({} valid, {} invalid) in {:.1}s",
                        results.len(),
                        if results.len() == 1 { "" } else { "s" },
                        valid,
                        results.len() - valid,
                        started.elapsed().as_secs_f64()
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("wp_harvest error: {e:#}");
            process::exit(1);
        }
    }
}
