//! Document metadata: meta tags, Open Graph, Twitter Card and JSON-LD.

use reposite_core::{Config, OpenGraph, SiteGenerationConfig, SiteMetadata, TwitterCard};
use serde_json::json;

use crate::props::SeoProps;

/// Build metadata from already-prepared SEO props.
pub fn metadata_from_seo(
    seo: &SeoProps,
    config: &SiteGenerationConfig,
    settings: &Config,
) -> SiteMetadata {
    let canonical = seo.canonical_url.trim_end_matches('/').to_string();

    let json_ld = json!({
        "@context": "https://schema.org",
        "@type": "SoftwareApplication",
        "name": seo.title,
        "description": seo.description,
        "url": canonical,
        "applicationCategory": "DeveloperApplication",
        "operatingSystem": "Cross-platform",
        "programmingLanguage": config.analysis_result.tech_stack,
    });

    SiteMetadata {
        title: seo.title.clone(),
        description: seo.description.clone(),
        keywords: seo.keywords.clone(),
        author: settings.site.author.clone(),
        generator: settings.site.generator.clone(),
        viewport: "width=device-width, initial-scale=1".to_string(),
        canonical: Some(canonical.clone()),
        open_graph: OpenGraph {
            title: seo.title.clone(),
            description: seo.description.clone(),
            kind: "website".to_string(),
            url: Some(canonical.clone()),
            image: Some(format!("{canonical}/og-image.png")),
            site_name: config.site_name.clone(),
        },
        twitter: TwitterCard {
            card: "summary_large_image".to_string(),
            title: seo.title.clone(),
            description: seo.description.clone(),
            creator: None,
            image: Some(format!("{canonical}/twitter-image.png")),
        },
        json_ld,
    }
}
