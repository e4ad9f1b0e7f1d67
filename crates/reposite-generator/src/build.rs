//! Build orchestration.
//!
//! Runs normalize → generate → bundle for one request.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use reposite_core::{Config, SiteGenerationConfig};
use reposite_parser::{ContentGenerationError, ContentNormalizer, RawContent};
use thiserror::Error;
use tracing::info;

use crate::{
    bundle::{BundleError, StaticBundler},
    generator::{GenerateError, SiteGenerator},
};

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The AI output could not be normalized.
    #[error("content error: {0}")]
    Content(#[from] ContentGenerationError),

    /// Rendering failed.
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),

    /// Bundling failed.
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
}

impl PipelineError {
    /// Whether retrying the same request could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Content(err) => err.is_retryable(),
            Self::Generate(_) => false,
            Self::Bundle(_) => true,
        }
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Template that rendered the main page.
    pub template: String,

    /// Content sections after normalization.
    pub sections: usize,

    /// Secondary pages written.
    pub pages: usize,

    /// Assets generated.
    pub assets: usize,

    /// Images recompressed.
    pub images_optimized: usize,

    /// Images left untouched after a failure.
    pub images_failed: usize,

    /// Deployable archive.
    pub archive: PathBuf,

    /// Wall-clock build time.
    pub duration: Duration,
}

/// Runs the full pipeline.
#[derive(Debug)]
pub struct Builder {
    normalizer: ContentNormalizer,
    generator: SiteGenerator,
    bundler: StaticBundler,
}

impl Builder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            normalizer: ContentNormalizer::new(),
            bundler: StaticBundler::new(config.clone()),
            generator: SiteGenerator::new(config),
        }
    }

    /// Replace the site generator, e.g. to inject a custom catalog.
    #[must_use]
    pub fn with_generator(mut self, generator: SiteGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Replace the bundler, e.g. to override bundle options.
    #[must_use]
    pub fn with_bundler(mut self, bundler: StaticBundler) -> Self {
        self.bundler = bundler;
        self
    }

    /// Normalize `raw` into `request`.
    ///
    /// The normalized sections, features, tech stack and keywords replace the
    /// request's analysis; partner recommendations, the recommended template
    /// and the complexity score are kept. An empty site name or description
    /// is filled from the content.
    pub fn prepare(
        &self,
        raw: &RawContent,
        mut request: SiteGenerationConfig,
    ) -> Result<SiteGenerationConfig> {
        let content = self.normalizer.normalize(raw, &request.site_id)?;

        if request.site_name.trim().is_empty() {
            request.site_name = content.title.clone();
        }
        if request.site_description.as_deref().is_none_or(|d| d.trim().is_empty())
            && !content.description.is_empty()
        {
            request.site_description = Some(content.description.clone());
        }

        let previous = std::mem::take(&mut request.analysis_result);
        let mut analysis = content.into_analysis(previous.project_type);
        analysis.partner_recommendations = previous.partner_recommendations;
        analysis.recommended_template = previous.recommended_template;
        analysis.complexity_score = previous.complexity_score;
        request.analysis_result = analysis;

        Ok(request)
    }

    /// Execute the full build for one request.
    pub fn build(
        &self,
        raw: &RawContent,
        request: SiteGenerationConfig,
        output: &Path,
    ) -> Result<BuildStats> {
        let start = Instant::now();
        info!(
            site_id = %request.site_id,
            output = %output.display(),
            "starting build"
        );

        let request = self.prepare(raw, request)?;
        info!(
            site_id = %request.site_id,
            sections = request.analysis_result.content_sections.len(),
            "content normalized"
        );

        let site = self.generator.generate_site(&request)?;
        let report = self.bundler.bundle_with_report(&site, output)?;

        let (images_optimized, images_failed) = report
            .images
            .as_ref()
            .map_or((0, 0), |r| (r.optimized.len(), r.failed.len()));

        let stats = BuildStats {
            template: site.template.clone(),
            sections: request.analysis_result.content_sections.len(),
            pages: site.pages.len(),
            assets: site.assets.len(),
            images_optimized,
            images_failed,
            archive: report.archive,
            duration: start.elapsed(),
        };

        info!(
            site_id = %request.site_id,
            template = %stats.template,
            pages = stats.pages,
            assets = stats.assets,
            images_optimized = stats.images_optimized,
            images_failed = stats.images_failed,
            duration_ms = stats.duration.as_millis() as u64,
            "build complete"
        );

        Ok(stats)
    }
}
