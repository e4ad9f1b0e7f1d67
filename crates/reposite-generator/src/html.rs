//! Full HTML document assembly for the main page.
//!
//! Wraps the rendered body fragment in the `document` shell together with
//! meta tags, Open Graph, Twitter Card and JSON-LD.

use reposite_core::{Config, GeneratedSiteData, SiteMetadata, text::escape_html};
use thiserror::Error;
use tracing::debug;

use crate::shell::{ShellError, ShellKind, Slots};

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Shell error.
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),

    /// JSON-LD could not be serialized.
    #[error("JSON-LD serialization failed: {0}")]
    JsonLd(#[from] serde_json::Error),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// Serialize a value for embedding inside a `<script>` element.
///
/// `</` is escaped so the payload cannot close the element early.
pub fn script_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Builds the main page document.
#[derive(Debug)]
pub struct DocumentBuilder<'a> {
    settings: &'a Config,
}

impl<'a> DocumentBuilder<'a> {
    #[must_use]
    pub fn new(settings: &'a Config) -> Self {
        Self { settings }
    }

    /// Render `index.html` for generated site data.
    pub fn document(&self, site: &GeneratedSiteData) -> Result<String> {
        debug!(site_id = %site.site_id, "building document");

        let slots = self
            .metadata_slots(&site.metadata)?
            .set("lang", escape_html(&self.settings.site.lang))
            .set("content", site.html.as_str())
            .set_opt("analytics_bootstrap", self.analytics_bootstrap()?);

        Ok(ShellKind::Document.fill(&slots)?)
    }

    fn metadata_slots(&self, meta: &SiteMetadata) -> Result<Slots> {
        let og = &meta.open_graph;
        let tw = &meta.twitter;

        Ok(Slots::new()
            .set("viewport", escape_html(&meta.viewport))
            .set("title", escape_html(&meta.title))
            .set("description", escape_html(&meta.description))
            .set("keywords", escape_html(&meta.keywords.join(", ")))
            .set("author", escape_html(&meta.author))
            .set("generator", escape_html(&meta.generator))
            .set_opt(
                "canonical_link",
                meta.canonical
                    .as_deref()
                    .map(|url| format!(r#"<link rel="canonical" href="{}">"#, escape_html(url))),
            )
            .set("og_title", escape_html(&og.title))
            .set("og_description", escape_html(&og.description))
            .set("og_type", escape_html(&og.kind))
            .set("og_site_name", escape_html(&og.site_name))
            .set_opt("og_url", og.url.as_deref().map(|v| meta_property("og:url", v)))
            .set_opt("og_image", og.image.as_deref().map(|v| meta_property("og:image", v)))
            .set("twitter_card", escape_html(&tw.card))
            .set("twitter_title", escape_html(&tw.title))
            .set("twitter_description", escape_html(&tw.description))
            .set_opt(
                "twitter_creator",
                tw.creator.as_deref().map(|v| meta_name("twitter:creator", v)),
            )
            .set_opt(
                "twitter_image",
                tw.image.as_deref().map(|v| meta_name("twitter:image", v)),
            )
            .set("json_ld", script_json(&meta.json_ld)?))
    }

    /// Inline gtag configuration, present only with a measurement id.
    fn analytics_bootstrap(&self) -> Result<Option<String>> {
        let Some(id) = self.settings.site.measurement_id.as_deref() else {
            return Ok(None);
        };
        let id = script_json(&serde_json::Value::from(id))?;

        Ok(Some(format!(
            "<script>\n        if (typeof gtag !== 'undefined') {{\n            gtag('config', {id});\n        }}\n    </script>"
        )))
    }
}

fn meta_property(property: &str, content: &str) -> String {
    format!(
        r#"<meta property="{property}" content="{}">"#,
        escape_html(content)
    )
}

fn meta_name(name: &str, content: &str) -> String {
    format!(r#"<meta name="{name}" content="{}">"#, escape_html(content))
}

#[cfg(test)]
mod tests {
    use reposite_core::{OpenGraph, TwitterCard};
    use serde_json::json;

    use super::*;

    fn site() -> GeneratedSiteData {
        GeneratedSiteData {
            site_id: "s1".to_string(),
            template: "modern-web".to_string(),
            html: "<div class=\"site\">Body</div>".to_string(),
            css: String::new(),
            js: String::new(),
            assets: Vec::new(),
            metadata: SiteMetadata {
                title: "Acme <Tools>".to_string(),
                description: "Widgets & more".to_string(),
                keywords: vec!["acme".to_string(), "rust".to_string()],
                author: "Reposite".to_string(),
                generator: "Reposite".to_string(),
                viewport: "width=device-width, initial-scale=1".to_string(),
                canonical: Some("https://acme.reposite.dev".to_string()),
                open_graph: OpenGraph {
                    title: "Acme <Tools>".to_string(),
                    description: "Widgets & more".to_string(),
                    kind: "website".to_string(),
                    url: Some("https://acme.reposite.dev".to_string()),
                    image: None,
                    site_name: "Acme".to_string(),
                },
                twitter: TwitterCard {
                    card: "summary_large_image".to_string(),
                    title: "Acme".to_string(),
                    description: "Widgets".to_string(),
                    creator: None,
                    image: Some("https://acme.reposite.dev/twitter-image.png".to_string()),
                },
                json_ld: json!({"@type": "SoftwareApplication", "name": "</script><b>"}),
            },
            pages: Vec::new(),
        }
    }

    #[test]
    fn test_document_escapes_metadata() {
        let config = Config::default();
        let html = DocumentBuilder::new(&config)
            .document(&site())
            .unwrap();

        assert!(html.contains("<title>Acme &lt;Tools&gt;</title>"));
        assert!(html.contains(r#"content="Widgets &amp; more""#));
        assert!(html.contains(r#"content="acme, rust""#));
        assert!(html.contains(r#"<link rel="canonical" href="https://acme.reposite.dev">"#));
        assert!(html.contains(r#"<meta property="og:url""#));
        assert!(!html.contains("og:image"));
        assert!(html.contains("twitter:image"));
        assert!(html.contains("<div class=\"site\">Body</div>"));
        assert!(html.contains(r#"<html lang="en">"#));
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let config = Config::default();
        let html = DocumentBuilder::new(&config)
            .document(&site())
            .unwrap();

        let start = html.find("application/ld+json\">").unwrap() + "application/ld+json\">".len();
        let end = start + html[start..].find("</script>").unwrap();
        let value: serde_json::Value = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(value["name"], "</script><b>");
    }

    #[test]
    fn test_analytics_bootstrap_requires_measurement_id() {
        let mut config = Config::default();
        let html = DocumentBuilder::new(&config)
            .document(&site())
            .unwrap();
        assert!(!html.contains("gtag("));

        config.site.measurement_id = Some("G-ABC123".to_string());
        let html = DocumentBuilder::new(&config)
            .document(&site())
            .unwrap();
        assert!(html.contains(r#"gtag('config', "G-ABC123");"#));
    }
}
