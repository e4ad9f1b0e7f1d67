//! Sitemap generation.
//!
//! One entry for the site root and one per secondary page.

use chrono::{NaiveDate, Utc};
use reposite_core::{GeneratedPage, text::escape_xml};
use tracing::debug;

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    /// Absolute URL.
    pub loc: String,

    /// Last modification date.
    pub lastmod: NaiveDate,

    /// Priority (0.0 to 1.0).
    pub priority: f32,
}

/// Sitemap generator.
#[derive(Debug, Clone)]
pub struct SitemapGenerator {
    base_url: String,
}

impl SitemapGenerator {
    /// Create a generator for an absolute base URL; a trailing slash is
    /// ignored.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Entries for the root and each page, dated `lastmod`.
    pub fn urls(&self, pages: &[GeneratedPage], lastmod: NaiveDate) -> Vec<SitemapUrl> {
        let root = SitemapUrl {
            loc: format!("{}/", self.base_url),
            lastmod,
            priority: 1.0,
        };

        std::iter::once(root)
            .chain(pages.iter().map(|page| SitemapUrl {
                loc: format!("{}/{}", self.base_url, page.path.trim_start_matches('/')),
                lastmod,
                priority: 0.8,
            }))
            .collect()
    }

    /// Generate sitemap XML dated today (UTC).
    pub fn generate(&self, pages: &[GeneratedPage]) -> String {
        self.generate_on(pages, Utc::now().date_naive())
    }

    /// Generate sitemap XML with an explicit date.
    pub fn generate_on(&self, pages: &[GeneratedPage], lastmod: NaiveDate) -> String {
        debug!(count = pages.len() + 1, "generating sitemap");

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for url in self.urls(pages, lastmod) {
            xml.push_str(&url_to_xml(&url));
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

fn url_to_xml(url: &SitemapUrl) -> String {
    let mut xml = String::from("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url.loc)));
    xml.push_str(&format!(
        "    <lastmod>{}</lastmod>\n",
        url.lastmod.format("%Y-%m-%d")
    ));
    xml.push_str(&format!("    <priority>{:.1}</priority>\n", url.priority));
    xml.push_str("  </url>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> GeneratedPage {
        GeneratedPage {
            path: path.to_string(),
            html: String::new(),
            title: String::new(),
            description: String::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn test_sitemap_entries() {
        let generator = SitemapGenerator::new("https://acme.reposite.dev/");
        let xml = generator.generate_on(&[page("/guide.html"), page("/api.html")], date());

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(xml.matches("<url>").count(), 3);
        assert!(xml.contains("<loc>https://acme.reposite.dev/</loc>"));
        assert!(xml.contains("<loc>https://acme.reposite.dev/guide.html</loc>"));
        assert!(xml.contains("<loc>https://acme.reposite.dev/api.html</loc>"));
        assert_eq!(xml.matches("<lastmod>2026-03-01</lastmod>").count(), 3);
        assert_eq!(xml.matches("<priority>1.0</priority>").count(), 1);
        assert_eq!(xml.matches("<priority>0.8</priority>").count(), 2);
    }

    #[test]
    fn test_sitemap_without_pages() {
        let generator = SitemapGenerator::new("https://example.com");
        let urls = generator.urls(&[], date());
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].loc, "https://example.com/");
    }

    #[test]
    fn test_sitemap_escapes_locations() {
        let generator = SitemapGenerator::new("https://example.com/?a=1&b=2");
        let xml = generator.generate_on(&[], date());
        assert!(xml.contains("a=1&amp;b=2"));
    }
}
