//! XML document decoding for sitemaps and feeds.
//!
//! WordPress XML output is schema-sloppy: a repeated element appears as a
//! list when there are many siblings but as a bare object when there is one.
//! `OneOrMany<T>` models that ambiguity at the decode boundary and is
//! normalized to a `Vec<T>` immediately, so no downstream consumer ever sees
//! the single-vs-list distinction.
//!
//! Decoding is typed per document kind (url set, sitemap index, RSS, Atom).
//! `quick_xml::de` ignores the root element name, so decoding a body as the
//! "wrong" kind yields empty entry fields rather than an error; callers use
//! that as the shape check ("this is not the format I expected") and move on
//! to the next candidate.

use serde::{Deserialize, Deserializer};

use crate::error_handling::{clip_message, HarvestError};

/// A value that may appear as a single element or a list of elements.
#[derive(Debug, Clone)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // quick-xml presents both a lone element and repeated siblings as a
        // sequence when hinted with one; One covers values built in code.
        Vec::<T>::deserialize(deserializer).map(OneOrMany::Many)
    }
}

impl<T> OneOrMany<T> {
    /// Normalizes into a uniform list ("if not already a list, wrap it").
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Normalizes an optional one-or-many field into a plain list.
pub fn normalize<T>(field: Option<OneOrMany<T>>) -> Vec<T> {
    field.map(OneOrMany::into_vec).unwrap_or_default()
}

/// A leaf sitemap: `<urlset><url><loc>…</loc></url>…</urlset>`.
#[derive(Debug, Deserialize)]
pub struct UrlSet {
    #[serde(default, rename = "url")]
    pub urls: Option<OneOrMany<UrlEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntry {
    pub loc: String,
}

/// A sitemap index: `<sitemapindex><sitemap><loc>…</loc></sitemap>…`.
#[derive(Debug, Deserialize)]
pub struct SitemapIndex {
    #[serde(default, rename = "sitemap")]
    pub sitemaps: Option<OneOrMany<SitemapRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitemapRef {
    pub loc: String,
}

/// An RSS 2.0 document: `<rss><channel><item><link>…`.
#[derive(Debug, Deserialize)]
pub struct RssDocument {
    pub channel: Option<RssChannel>,
}

#[derive(Debug, Deserialize)]
pub struct RssChannel {
    #[serde(default, rename = "item")]
    pub items: Option<OneOrMany<RssItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssItem {
    pub link: Option<String>,
}

/// An Atom document: `<feed><entry><link …/>…`.
#[derive(Debug, Deserialize)]
pub struct AtomDocument {
    #[serde(default, rename = "entry")]
    pub entries: Option<OneOrMany<AtomEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtomEntry {
    #[serde(default, rename = "link")]
    pub links: Option<OneOrMany<AtomLink>>,
}

/// An Atom `<link>` in any of the shapes seen in the wild: an element with
/// an `href` attribute, an element with an `href` child, or a bare string.
/// All fields are optional so one shape never rejects another.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtomLink {
    #[serde(default, rename = "@href")]
    attr_href: Option<String>,
    #[serde(default, rename = "href")]
    child_href: Option<String>,
    #[serde(default, rename = "$text")]
    text: Option<String>,
}

impl AtomLink {
    /// The link target, whichever representation carried it.
    pub fn href(&self) -> Option<&str> {
        self.attr_href
            .as_deref()
            .or(self.child_href.as_deref())
            .or(self.text.as_deref())
            .map(str::trim)
            .filter(|href| !href.is_empty())
    }

    #[cfg(test)]
    pub fn from_attr(href: &str) -> Self {
        AtomLink {
            attr_href: Some(href.to_string()),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn from_text(href: &str) -> Self {
        AtomLink {
            text: Some(href.to_string()),
            ..Default::default()
        }
    }
}

/// Decodes a body into one of the typed document shapes.
///
/// # Errors
///
/// Returns `HarvestError::Decode` with a truncated reason when the body is
/// not well-formed XML. Callers treat this as "wrong format, next candidate",
/// never as a fatal site failure.
pub fn decode<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, HarvestError> {
    quick_xml::de::from_str(body).map_err(|e| {
        // Parse errors echo tag names from the body, which may be multibyte.
        let mut reason = e.to_string();
        clip_message(&mut reason, 200);
        HarvestError::Decode(reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlset_many_entries() {
        let body = r#"<?xml version="1.0"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>https://example.com/post-1</loc></url>
                <url><loc>https://example.com/post-2</loc></url>
            </urlset>"#;
        let doc: UrlSet = decode(body).unwrap();
        let urls = normalize(doc.urls);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].loc, "https://example.com/post-1");
    }

    #[test]
    fn test_urlset_single_entry_normalizes_to_one_element_list() {
        let body = r#"<urlset><url><loc>https://example.com/only</loc></url></urlset>"#;
        let doc: UrlSet = decode(body).unwrap();
        let urls = normalize(doc.urls);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].loc, "https://example.com/only");
    }

    #[test]
    fn test_one_or_many_wraps_single_value() {
        let one = OneOrMany::One(UrlEntry {
            loc: "https://example.com/a".to_string(),
        });
        assert_eq!(one.into_vec().len(), 1);
    }

    #[test]
    fn test_urlset_shape_mismatch_yields_empty() {
        // A sitemap index decoded as a url set has no <url> children.
        let body = r#"<sitemapindex><sitemap><loc>https://example.com/a.xml</loc></sitemap></sitemapindex>"#;
        let doc: UrlSet = decode(body).unwrap();
        assert!(normalize(doc.urls).is_empty());
    }

    #[test]
    fn test_sitemap_index_entries() {
        let body = r#"<sitemapindex>
            <sitemap><loc>https://example.com/wp-sitemap-posts-post-1.xml</loc></sitemap>
            <sitemap><loc>https://example.com/wp-sitemap-pages-1.xml</loc></sitemap>
        </sitemapindex>"#;
        let doc: SitemapIndex = decode(body).unwrap();
        assert_eq!(normalize(doc.sitemaps).len(), 2);
    }

    #[test]
    fn test_rss_items() {
        let body = r#"<rss version="2.0"><channel>
            <title>Blog</title>
            <item><title>A</title><link>https://example.com/a</link></item>
            <item><title>B</title><link>https://example.com/b</link></item>
        </channel></rss>"#;
        let doc: RssDocument = decode(body).unwrap();
        let items = normalize(doc.channel.unwrap().items);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].link.as_deref(), Some("https://example.com/b"));
    }

    #[test]
    fn test_atom_link_attribute_shape() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry><link href="https://x/1" rel="alternate"/></entry>
        </feed>"#;
        let doc: AtomDocument = decode(body).unwrap();
        let entries = normalize(doc.entries);
        let links = normalize(entries[0].clone().links);
        assert_eq!(links[0].href(), Some("https://x/1"));
    }

    #[test]
    fn test_atom_link_bare_string_shape() {
        let body = r#"<feed><entry><link>https://x/2</link></entry></feed>"#;
        let doc: AtomDocument = decode(body).unwrap();
        let entries = normalize(doc.entries);
        let links = normalize(entries[0].clone().links);
        assert_eq!(links[0].href(), Some("https://x/2"));
    }

    #[test]
    fn test_atom_link_shapes_extract_identically() {
        assert_eq!(AtomLink::from_attr("https://x/1").href(), Some("https://x/1"));
        assert_eq!(AtomLink::from_text("https://x/2").href(), Some("https://x/2"));
    }

    #[test]
    fn test_decode_error_is_truncated() {
        let not_xml = "<html><body>definitely not closed";
        let err = decode::<UrlSet>(not_xml).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse XML:"));
        assert!(message.len() < 250);
    }

    #[test]
    fn test_decode_error_with_multibyte_tag_names_does_not_panic() {
        // Mismatched-tag errors echo the tag name; sweep the name length so
        // the truncation point lands at every offset within a character.
        for name_len in 1..=130 {
            let body = format!("<urlset><a></{}>", "日".repeat(name_len));
            let err = decode::<UrlSet>(&body).unwrap_err();
            let message = err.to_string();
            assert!(message.starts_with("Failed to parse XML:"));
            assert!(message.is_char_boundary(message.len()));
        }
    }
}
