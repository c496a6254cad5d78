//! Site URL sanitization.

use url::Url;

/// Sanitizes a raw site string into a canonical absolute URL.
///
/// Trims whitespace, strips one trailing slash, prepends `https://` when no
/// scheme is present, and validates the result parses as an http(s) URL with
/// a host. Pure function, no network access.
///
/// # Returns
///
/// `Some(canonical_url)` when the input is usable, `None` otherwise. Callers
/// must treat `None` as a terminal per-site failure ("Invalid URL format").
pub fn sanitize_site_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let stripped = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let normalized = if !stripped.starts_with("http://") && !stripped.starts_with("https://") {
        format!("https://{stripped}")
    } else {
        stripped.to_string()
    };

    match Url::parse(&normalized) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {
            Some(normalized)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_site_url;

    #[test]
    fn test_sanitize_adds_https_and_strips_trailing_slash() {
        assert_eq!(
            sanitize_site_url("example.com/"),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_sanitize_preserves_existing_scheme() {
        assert_eq!(
            sanitize_site_url("http://example.com"),
            Some("http://example.com".to_string())
        );
        assert_eq!(
            sanitize_site_url("https://example.com/blog"),
            Some("https://example.com/blog".to_string())
        );
    }

    #[test]
    fn test_sanitize_strips_only_one_trailing_slash() {
        assert_eq!(
            sanitize_site_url("https://example.com//"),
            Some("https://example.com/".to_string())
        );
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(
            sanitize_site_url("  example.com  "),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_sanitize_rejects_malformed_input() {
        assert_eq!(sanitize_site_url("not a url at all!!!"), None);
        assert_eq!(sanitize_site_url(""), None);
        assert_eq!(sanitize_site_url("   "), None);
        assert_eq!(sanitize_site_url("://example.com"), None);
    }

    #[test]
    fn test_sanitize_keeps_port_and_path() {
        assert_eq!(
            sanitize_site_url("example.com:8080/blog"),
            Some("https://example.com:8080/blog".to_string())
        );
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_sanitize_idempotent(site in "[a-z]{3,20}\\.[a-z]{2,5}") {
            if let Some(first) = sanitize_site_url(&site) {
                prop_assert_eq!(Some(first.clone()), sanitize_site_url(&first));
            }
        }

        #[test]
        fn test_sanitize_output_always_has_scheme(site in "[a-z]{3,20}\\.[a-z]{2,5}(/[a-z]{0,10})?") {
            if let Some(sanitized) = sanitize_site_url(&site) {
                prop_assert!(sanitized.starts_with("http://") || sanitized.starts_with("https://"));
            }
        }

        #[test]
        fn test_sanitize_no_panic(input in ".{0,200}") {
            let _ = sanitize_site_url(&input);
        }
    }
}
