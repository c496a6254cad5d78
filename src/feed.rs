//! RSS/Atom feed walking.
//!
//! Probes the well-known WordPress feed paths in a fixed order and stops at
//! the first one that yields article links. When none of the fixed paths
//! works, the site homepage is fetched and scraped for
//! `<link rel="alternate" type="application/rss+xml|atom+xml">` declarations,
//! which are then probed the same way.
//!
//! A fetched body is tried as RSS 2.0 first, then as Atom; the shape that
//! produces links wins. Feeds routinely serve fewer items than a sitemap
//! page, so the walker never paginates.

use log::{debug, info};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::config::FEED_CANDIDATES;
use crate::error_handling::{update_error_stats, ProcessingStats};
use crate::transport::fetch_text;
use crate::xml::{self, AtomDocument, RssDocument};

static FEED_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"link[rel="alternate"][type="application/rss+xml"], link[rel="alternate"][type="application/atom+xml"]"#,
    )
    .expect("Failed to parse feed link selector - this is a bug")
});

/// Extracts article links from a feed body, trying RSS then Atom.
///
/// Returns an empty list when the body is not a feed or carries no usable
/// links (entries without links are skipped, not errors).
fn parse_feed_links(body: &str) -> Vec<String> {
    if let Ok(doc) = xml::decode::<RssDocument>(body) {
        let links: Vec<String> = doc
            .channel
            .map(|channel| xml::normalize(channel.items))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.link)
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty())
            .collect();
        if !links.is_empty() {
            return links;
        }
    }

    if let Ok(doc) = xml::decode::<AtomDocument>(body) {
        return xml::normalize(doc.entries)
            .into_iter()
            .filter_map(|entry| {
                xml::normalize(entry.links)
                    .iter()
                    .filter_map(|link| link.href())
                    .next()
                    .map(str::to_string)
            })
            .collect();
    }

    Vec::new()
}

/// Scrapes a homepage for declared feed URLs, resolved against the base URL.
fn discover_feed_urls(body: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    document
        .select(&FEED_LINK_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| {
            if href.starts_with("http") {
                Some(href.to_string())
            } else {
                Url::parse(base_url)
                    .and_then(|base| base.join(href))
                    .map(|joined| joined.to_string())
                    .ok()
            }
        })
        .collect()
}

/// Probes one candidate feed URL; failures are recorded and swallowed.
async fn probe_feed(client: &Client, stats: &ProcessingStats, feed_url: &str) -> Vec<String> {
    match fetch_text(client, feed_url).await {
        Ok(body) => {
            let links = parse_feed_links(&body);
            if !links.is_empty() {
                info!("Found {} article links in feed {}", links.len(), feed_url);
            }
            links
        }
        Err(e) => {
            debug!("Feed probe failed for {feed_url}: {e}");
            update_error_stats(stats, &e);
            Vec::new()
        }
    }
}

/// Walks a site's feeds, returning article URLs in feed order.
///
/// An empty list means no candidate path and no homepage-declared feed
/// yielded anything; like the sitemap walker, the result is uncapped and the
/// orchestrator applies the limit.
pub async fn walk(client: &Client, stats: &ProcessingStats, base_url: &str) -> Vec<String> {
    for feed_path in FEED_CANDIDATES {
        let feed_url = format!("{base_url}{feed_path}");
        debug!("Checking for feed at: {feed_url}");
        let links = probe_feed(client, stats, &feed_url).await;
        if !links.is_empty() {
            return links;
        }
    }

    // No fixed path worked; ask the homepage what it declares.
    debug!("No well-known feed path for {base_url}; scraping homepage for feed links");
    let homepage = match fetch_text(client, base_url).await {
        Ok(body) => body,
        Err(e) => {
            debug!("Homepage fetch failed for {base_url}: {e}");
            update_error_stats(stats, &e);
            return Vec::new();
        }
    };

    let declared = discover_feed_urls(&homepage, base_url);
    info!("Found {} declared feed links on homepage", declared.len());
    for feed_url in declared {
        let links = probe_feed(client, stats, &feed_url).await;
        if !links.is_empty() {
            return links;
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::{discover_feed_urls, parse_feed_links};

    #[test]
    fn test_parse_rss_links() {
        let body = r#"<rss version="2.0"><channel>
            <title>Blog</title>
            <item><link>https://example.com/a</link></item>
            <item><link> https://example.com/b </link></item>
        </channel></rss>"#;
        assert_eq!(
            parse_feed_links(body),
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_rss_skips_linkless_items() {
        let body = r#"<rss><channel>
            <item><title>No link here</title></item>
            <item><link>https://example.com/only</link></item>
        </channel></rss>"#;
        assert_eq!(parse_feed_links(body), vec!["https://example.com/only".to_string()]);
    }

    #[test]
    fn test_parse_atom_attribute_links() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry><link href="https://example.com/1" rel="alternate"/></entry>
            <entry><link href="https://example.com/2"/></entry>
        </feed>"#;
        assert_eq!(
            parse_feed_links(body),
            vec![
                "https://example.com/1".to_string(),
                "https://example.com/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_atom_bare_string_links() {
        let body = r#"<feed><entry><link>https://example.com/3</link></entry></feed>"#;
        assert_eq!(parse_feed_links(body), vec!["https://example.com/3".to_string()]);
    }

    #[test]
    fn test_parse_feed_rejects_html() {
        assert!(parse_feed_links("<html><body><p>not a feed</p></body></html>").is_empty());
    }

    #[test]
    fn test_discover_feed_urls_resolves_relative() {
        let html = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/custom-feed"/>
            <link rel="alternate" type="application/atom+xml" href="https://example.com/atom"/>
            <link rel="stylesheet" href="/style.css"/>
        </head></html>"#;
        assert_eq!(
            discover_feed_urls(html, "https://example.com"),
            vec![
                "https://example.com/custom-feed".to_string(),
                "https://example.com/atom".to_string(),
            ]
        );
    }

    #[test]
    fn test_discover_feed_urls_empty_page() {
        assert!(discover_feed_urls("<html></html>", "https://example.com").is_empty());
    }
}
