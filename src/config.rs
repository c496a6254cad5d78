use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

// constants (used as defaults)
pub const DEFAULT_LIMIT: usize = 5;

/// Per-request timeout for all plain HTTP operations (GET and HEAD).
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Browser navigation timeout for bot-wall checks.
pub const BROWSER_NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed settle delay after navigation, giving client-side challenges
/// (Cloudflare, Turnstile, etc.) time to render before classification.
pub const CHALLENGE_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Default User-Agent string for HTTP requests.
///
/// Uses a generic Chrome-like string without a specific version number to avoid
/// becoming outdated. Many WordPress hosts serve different sitemap/feed
/// responses to obvious bot agents, so a browser-like UA is the default.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Well-known sitemap index locations, tried in order when the direct
/// `wp-sitemap-posts-post-1.xml` probe fails.
pub const SITEMAP_INDEX_CANDIDATES: &[&str] =
    &["/sitemap.xml", "/sitemap_index.xml", "/wp-sitemap.xml"];

/// Well-known feed paths, tried in order. The query-string variants cover
/// WordPress installs with permalinks disabled.
pub const FEED_CANDIDATES: &[&str] = &[
    "/feed/",
    "/feed",
    "/rss/",
    "/rss",
    "/atom.xml",
    "/rss.xml",
    "/feed.xml",
    "/?feed=rss2",
    "/?feed=rss",
    "/?feed=atom",
];

/// How many index children to walk when none of them look like post sitemaps.
pub const INDEX_FALLBACK_CHILD_COUNT: usize = 3;

/// Maximum length for error messages recorded in site results.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// This struct is automatically generated by `clap` from the field attributes.
///
/// # Examples
///
/// ```bash
/// # Harvest article URLs for each site in sites.txt (5 per site)
/// wp_harvest sites.txt
///
/// # Unlimited URLs, liveness-checked, with AdSense tag scraping
/// wp_harvest sites.txt --limit 0 --check-validity --check-adsense
///
/// # Bot-wall check only (skips extraction entirely)
/// wp_harvest sites.txt --check-captcha
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "wp_harvest",
    about = "Harvests article URLs from WordPress sites via sitemaps and feeds."
)]
pub struct Config {
    /// File with one site URL per line ("-" for stdin)
    #[arg(value_parser)]
    pub file: PathBuf,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum URLs to collect per site (0 = unbounded)
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Probe each discovered URL with a HEAD request and keep only live ones
    #[arg(long)]
    pub check_validity: bool,

    /// Scrape each site's homepage for AdSense publisher IDs
    #[arg(long)]
    pub check_adsense: bool,

    /// Check each site for a bot-challenge wall instead of extracting URLs
    ///
    /// Mutually exclusive with extraction: when set, no sitemap or feed
    /// walking happens for any site.
    #[arg(long)]
    pub check_captcha: bool,

    /// Try feeds before sitemaps (default is sitemap-first)
    #[arg(long)]
    pub feed_first: bool,

    /// Treat input lines as article URLs and only check their liveness
    #[arg(long)]
    pub validate_only: bool,

    /// Overall batch deadline in seconds (0 = no deadline)
    ///
    /// Sites not yet processed when the deadline passes are recorded as
    /// failures; the partial report is still produced.
    #[arg(long, default_value_t = 0)]
    pub batch_deadline_seconds: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Write the JSON report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
