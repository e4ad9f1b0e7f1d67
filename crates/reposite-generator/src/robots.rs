//! Robots.txt generation.

use std::fmt::Write;

/// Robots.txt generator.
#[derive(Debug, Clone)]
pub struct RobotsGenerator {
    base_url: String,
}

impl RobotsGenerator {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Allow-all rules, plus the sitemap location when one is generated.
    pub fn generate(&self, with_sitemap: bool) -> String {
        let mut out = String::from("User-agent: *\nAllow: /\n");
        if with_sitemap {
            let _ = write!(out, "\nSitemap: {}/sitemap.xml\n", self.base_url);
        }
        out
    }
}
