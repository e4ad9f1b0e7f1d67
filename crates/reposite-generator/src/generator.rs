//! Site generation: template selection, rendering and asset assembly.

use reposite_core::{Config, GeneratedSiteData, SiteGenerationConfig};
use reposite_parser::MarkdownRenderer;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    assets::PlaceholderGenerator,
    catalog::Catalog,
    metadata::metadata_from_seo,
    pages::PageGenerator,
    props::PropsBuilder,
    shell::ShellError,
    styles::{StyleAssembler, assemble_js},
    template::{self, TemplateRenderError, TemplateSelection, select_template},
};

/// Site generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Main page template failed.
    #[error(transparent)]
    Render(#[from] TemplateRenderError),

    /// A secondary page shell failed.
    #[error("page rendering failed for site {site_id}: {source}")]
    Page {
        site_id: String,
        #[source]
        source: ShellError,
    },
}

/// Result type for site generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Turns a generation request into [`GeneratedSiteData`].
#[derive(Debug)]
pub struct SiteGenerator {
    settings: Config,
    catalog: Catalog,
    renderer: MarkdownRenderer,
    styles: StyleAssembler,
}

impl SiteGenerator {
    #[must_use]
    pub fn new(settings: Config) -> Self {
        let styles = StyleAssembler::new(settings.styles.dir.clone());
        Self {
            settings,
            catalog: Catalog::default(),
            renderer: MarkdownRenderer::new(),
            styles,
        }
    }

    /// Replace the lookup tables.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the Markdown renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Config {
        &self.settings
    }

    /// Resolve the template for a request: the explicit key, then the
    /// analysis recommendation, then the fallback.
    pub fn select(&self, config: &SiteGenerationConfig) -> TemplateSelection {
        let requested = Some(config.template_type.as_str())
            .filter(|k| !k.trim().is_empty())
            .or(config.analysis_result.recommended_template.as_deref());
        select_template(requested)
    }

    /// Generate the site for one request.
    pub fn generate_site(&self, config: &SiteGenerationConfig) -> Result<GeneratedSiteData> {
        let selection = self.select(config);
        let kind = selection.kind;
        info!(
            site_id = %config.site_id,
            template = %kind,
            fell_back = selection.fell_back,
            "generating site"
        );

        let props = PropsBuilder::new(&self.settings, &self.catalog, &self.renderer).prepare(config);
        let html = template::render(kind, &props)?;

        let endpoint = self.settings.site.analytics_endpoint.as_str();
        let ((css, js), assets) = rayon::join(
            || {
                rayon::join(
                    || self.styles.assemble(kind, &props.theme),
                    || assemble_js(config, endpoint),
                )
            },
            || PlaceholderGenerator::new().generate(config),
        );

        let metadata = metadata_from_seo(&props.seo, config, &self.settings);

        let pages = PageGenerator::new(&self.renderer, &self.settings.site.lang)
            .generate(config)
            .map_err(|source| GenerateError::Page {
                site_id: config.site_id.clone(),
                source,
            })?;

        debug!(
            site_id = %config.site_id,
            css_bytes = css.len(),
            js_bytes = js.len(),
            assets = assets.len(),
            pages = pages.len(),
            "site assembled"
        );

        Ok(GeneratedSiteData {
            site_id: config.site_id.clone(),
            template: kind.key().to_string(),
            html,
            css,
            js,
            assets,
            metadata,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use reposite_core::{AnalysisResult, ContentSection, SectionType, SiteFeatures};

    use super::*;
    use crate::template::TemplateKind;

    fn request(template: &str) -> SiteGenerationConfig {
        SiteGenerationConfig {
            site_id: "site-1".to_string(),
            site_name: "Acme".to_string(),
            template_type: template.to_string(),
            analysis_result: AnalysisResult {
                content_sections: vec![
                    ContentSection::new(SectionType::Overview, "Overview", "Acme does X.", 2),
                    ContentSection::new(SectionType::Documentation, "Guide", "Read me.", 1),
                ],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_site() {
        let generator = SiteGenerator::new(Config::default());
        let site = generator.generate_site(&request("developer-library")).unwrap();

        assert_eq!(site.site_id, "site-1");
        assert_eq!(site.template, "developer-library");
        assert!(site.html.contains("template-developer-library"));
        assert!(site.html.contains("Acme does X."));
        assert!(site.css.contains("--primary-color"));
        assert!(site.js.contains("\"site-1\""));
        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.pages[0].path, "/guide.html");
        assert_eq!(site.metadata.title, "Acme");
        assert!(site.assets.iter().any(|a| a.path == "/favicon.ico"));
    }

    #[test]
    fn test_unknown_template_falls_back() {
        let generator = SiteGenerator::new(Config::default());
        let config = request("unknown-key");

        assert!(generator.select(&config).fell_back);
        let site = generator.generate_site(&config).unwrap();
        assert_eq!(site.template, TemplateKind::ModernWeb.key());
    }

    #[test]
    fn test_recommended_template_used_when_unset() {
        let generator = SiteGenerator::new(Config::default());
        let mut config = request("");
        config.analysis_result.recommended_template = Some("minimal-portfolio".to_string());

        let selection = generator.select(&config);
        assert_eq!(selection.kind, TemplateKind::MinimalPortfolio);
        assert!(!selection.fell_back);
    }

    #[test]
    fn test_feature_flags_reach_script_and_assets() {
        let generator = SiteGenerator::new(Config::default());
        let mut config = request("modern-web");
        config.features = SiteFeatures {
            include_demo: true,
            enable_video: false,
            enable_slideshow: true,
        };

        let site = generator.generate_site(&config).unwrap();
        assert!(site.js.contains("// Demo interactions"));
        assert!(site.js.contains("// Slideshow"));
        assert!(!site.js.contains("// Video playback"));
        assert!(site.assets.iter().any(|a| a.path == "/assets/screenshot-1.png"));
    }
}
