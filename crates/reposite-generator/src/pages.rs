//! Secondary documentation pages.

use std::collections::HashSet;

use reposite_core::{
    AnalysisResult, ContentSection, GeneratedPage, SiteGenerationConfig, slugify,
    text::{escape_html, truncate_chars},
};
use reposite_parser::MarkdownRenderer;

use crate::shell::{self, ShellKind, Slots};

/// Length of a page description, in characters.
const PAGE_DESCRIPTION_LIMIT: usize = 160;

/// Slugs unique within one namespace; repeats get `-2`, `-3` and so on.
#[derive(Debug, Default)]
pub(crate) struct SlugSet(HashSet<String>);

impl SlugSet {
    /// A set where `taken` are already in use.
    pub(crate) fn with_taken(taken: &[&str]) -> Self {
        Self(taken.iter().map(|s| (*s).to_string()).collect())
    }

    pub(crate) fn claim(&mut self, base: &str) -> String {
        let mut slug = base.to_string();
        let mut n = 2;
        while !self.0.insert(slug.clone()) {
            slug = format!("{base}-{n}");
            n += 1;
        }
        slug
    }
}

/// Documentation and API reference sections with their page paths, in
/// source order.
///
/// Paths are `/<slug(title)>.html`. A section whose title has no slug
/// characters becomes `page-<n>`; repeated slugs get `-2`, `-3` and so on.
pub fn doc_page_paths(analysis: &AnalysisResult) -> Vec<(&ContentSection, String)> {
    let mut used = SlugSet::default();

    analysis
        .content_sections
        .iter()
        .filter(|s| s.section_type.is_secondary_page())
        .enumerate()
        .map(|(i, section)| {
            let mut base = slugify(&section.title);
            if base.is_empty() {
                base = format!("page-{}", i + 1);
            }
            (section, format!("/{}.html", used.claim(&base)))
        })
        .collect()
}

/// Renders one standalone page per documentation section.
#[derive(Debug)]
pub struct PageGenerator<'a> {
    renderer: &'a MarkdownRenderer,
    lang: &'a str,
}

impl<'a> PageGenerator<'a> {
    #[must_use]
    pub fn new(renderer: &'a MarkdownRenderer, lang: &'a str) -> Self {
        Self { renderer, lang }
    }

    /// Generate every secondary page for a request.
    pub fn generate(&self, config: &SiteGenerationConfig) -> shell::Result<Vec<GeneratedPage>> {
        doc_page_paths(&config.analysis_result)
            .into_iter()
            .map(|(section, path)| self.page(section, path, &config.site_name))
            .collect()
    }

    fn page(
        &self,
        section: &ContentSection,
        path: String,
        site_name: &str,
    ) -> shell::Result<GeneratedPage> {
        let title = format!("{} - {site_name}", section.title);
        let description = truncate_chars(&section.content, PAGE_DESCRIPTION_LIMIT).to_string();

        let slots = Slots::new()
            .set("lang", escape_html(self.lang))
            .set("title", escape_html(&title))
            .set("description", escape_html(&description))
            .set("heading", escape_html(&section.title))
            .set("site_name", escape_html(site_name))
            .set("content", self.renderer.render(&section.content));

        let html = ShellKind::DocPage.fill(&slots)?;
        tracing::debug!(path = %path, "rendered documentation page");

        Ok(GeneratedPage {
            path,
            html,
            title,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use reposite_core::SectionType;

    use super::*;

    fn analysis(titles: &[(&str, SectionType)]) -> AnalysisResult {
        AnalysisResult {
            content_sections: titles
                .iter()
                .map(|(t, ty)| ContentSection::new(*ty, *t, format!("Body of {t}."), 0))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_paths_only_for_doc_sections() {
        let a = analysis(&[
            ("Overview", SectionType::Overview),
            ("User Guide", SectionType::Documentation),
            ("API Reference", SectionType::ApiReference),
        ]);
        let paths: Vec<_> = doc_page_paths(&a).into_iter().map(|(_, p)| p).collect();
        assert_eq!(paths, vec!["/user-guide.html", "/api-reference.html"]);
    }

    #[test]
    fn test_duplicate_and_empty_slugs() {
        let a = analysis(&[
            ("Guide", SectionType::Documentation),
            ("guide!", SectionType::Documentation),
            ("???", SectionType::ApiReference),
            ("Guide", SectionType::ApiReference),
        ]);
        let paths: Vec<_> = doc_page_paths(&a).into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            paths,
            vec!["/guide.html", "/guide-2.html", "/page-3.html", "/guide-3.html"]
        );
    }

    #[test]
    fn test_generate_pages() {
        let renderer = MarkdownRenderer::new();
        let config = SiteGenerationConfig {
            site_name: "Acme".to_string(),
            analysis_result: analysis(&[("API", SectionType::ApiReference)]),
            ..Default::default()
        };

        let pages = PageGenerator::new(&renderer, "en")
            .generate(&config)
            .unwrap();

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.path, "/api.html");
        assert_eq!(page.title, "API - Acme");
        assert_eq!(page.description, "Body of API.");
        assert!(page.html.contains("<title>API - Acme</title>"));
        assert!(page.html.contains("<p>Body of API.</p>"));
        assert!(page.html.contains(r#"href="/""#));
    }

    #[test]
    fn test_description_truncated() {
        let renderer = MarkdownRenderer::new();
        let mut config = SiteGenerationConfig::default();
        config.analysis_result.content_sections = vec![ContentSection::new(
            SectionType::Documentation,
            "Long",
            "x".repeat(500),
            0,
        )];

        let pages = PageGenerator::new(&renderer, "en")
            .generate(&config)
            .unwrap();
        assert_eq!(pages[0].description.len(), 160);
    }
}
