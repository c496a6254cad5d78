//! Application-level helpers shared by the CLI and the harvest runner.

pub mod statistics;
pub mod url;

pub use statistics::print_error_statistics;
pub use url::sanitize_site_url;
