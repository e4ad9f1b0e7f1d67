//! Static bundling: document graph, optional minification, sitemap,
//! robots.txt and the deployable archive.

use std::{
    fmt, fs, io,
    path::{Component, Path, PathBuf},
};

use reposite_core::{AssetPayload, Config, GeneratedSiteData};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    archive::{ArchiveError, ArchiveSummary, create_archive},
    assets::{ImageOptimizer, OptimizationReport},
    html::{DocumentBuilder, HtmlError},
    minify::{autoprefix, minify_css, minify_html, minify_js},
    robots::RobotsGenerator,
    sitemap::SitemapGenerator,
};

/// Bundling stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleStage {
    CreateOutput,
    WriteHtml,
    WriteCss,
    WriteJs,
    WriteAssets,
    WritePages,
    Sitemap,
    Robots,
    Archive,
}

impl BundleStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateOutput => "create-output",
            Self::WriteHtml => "write-html",
            Self::WriteCss => "write-css",
            Self::WriteJs => "write-js",
            Self::WriteAssets => "write-assets",
            Self::WritePages => "write-pages",
            Self::Sitemap => "sitemap",
            Self::Robots => "robots",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for BundleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cause of a failed stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Document assembly error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    /// Archive error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Declared path escapes the output root or is empty.
    #[error("unsafe output path: {0:?}")]
    UnsafePath(String),
}

/// A failed bundle, with the stage and site it failed for.
#[derive(Debug, Error)]
#[error("bundle stage {stage} failed for site {site_id}: {source}")]
pub struct BundleError {
    pub stage: BundleStage,
    pub site_id: String,
    #[source]
    pub source: StageError,
}

/// Result type for bundling.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Switches for optional bundle work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleOptions {
    pub optimize_for_production: bool,
    pub generate_sitemap: bool,
    pub generate_robots_txt: bool,
    pub optimize_images: bool,
    pub generate_webp: bool,
    pub jpeg_quality: u8,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BundleOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            optimize_for_production: config.bundle.optimize_for_production,
            generate_sitemap: config.bundle.generate_sitemap,
            generate_robots_txt: config.bundle.generate_robots_txt,
            optimize_images: config.images.optimize,
            generate_webp: config.images.generate_webp,
            jpeg_quality: config.images.jpeg_quality,
        }
    }
}

/// What a bundle run produced.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Path of the zip archive.
    pub archive: PathBuf,
    pub archive_summary: ArchiveSummary,
    /// Files written by the bundler, sorted.
    pub files_written: Vec<PathBuf>,
    /// External asset URLs that were referenced but not fetched.
    pub external: Vec<String>,
    /// Image optimization outcome, when it ran.
    pub images: Option<OptimizationReport>,
}

/// Writes generated site data to disk and archives it.
#[derive(Debug)]
pub struct StaticBundler {
    settings: Config,
    options: BundleOptions,
}

impl StaticBundler {
    #[must_use]
    pub fn new(settings: Config) -> Self {
        let options = BundleOptions::from_config(&settings);
        Self { settings, options }
    }

    /// Override the options taken from configuration.
    #[must_use]
    pub fn with_options(mut self, options: BundleOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> BundleOptions {
        self.options
    }

    /// Bundle `site` into `output` and return the archive path.
    pub fn bundle(&self, site: &GeneratedSiteData, output: &Path) -> Result<PathBuf> {
        self.bundle_with_report(site, output)
            .map(|report| report.archive)
    }

    /// Bundle `site` into `output`, reporting everything written.
    pub fn bundle_with_report(
        &self,
        site: &GeneratedSiteData,
        output: &Path,
    ) -> Result<BundleReport> {
        let fail = |stage: BundleStage| {
            let site_id = site.site_id.clone();
            move |source: StageError| BundleError {
                stage,
                site_id,
                source,
            }
        };
        let optimize = self.options.optimize_for_production;

        info!(
            site_id = %site.site_id,
            output = %output.display(),
            optimize,
            "bundling static site"
        );

        // 1. Output root
        prepare_output(output).map_err(fail(BundleStage::CreateOutput))?;
        let mut written = Vec::new();

        // 2. index.html
        let index = self
            .index_html(site)
            .map_err(fail(BundleStage::WriteHtml))?;
        written.push(
            write_file(output, "/index.html", index.as_bytes())
                .map_err(fail(BundleStage::WriteHtml))?,
        );

        // 3. Stylesheet
        let css = autoprefix(&site.css);
        let css = if optimize { minify_css(&css) } else { css };
        written.push(
            write_file(output, "/assets/style.css", css.as_bytes())
                .map_err(fail(BundleStage::WriteCss))?,
        );

        // 4. Script
        let js = if optimize {
            minify_js(&site.js)
        } else {
            site.js.clone()
        };
        written.push(
            write_file(output, "/assets/script.js", js.as_bytes())
                .map_err(fail(BundleStage::WriteJs))?,
        );

        // 5 + 6. Assets and secondary pages
        let (assets, pages) = rayon::join(
            || write_assets(output, site),
            || write_pages(output, site, optimize),
        );
        let (asset_files, external) = assets.map_err(fail(BundleStage::WriteAssets))?;
        let page_files = pages.map_err(fail(BundleStage::WritePages))?;
        written.extend(asset_files);
        written.extend(page_files);

        // Images are best effort and never fail the bundle.
        let images = self.options.optimize_images.then(|| {
            ImageOptimizer::new(self.options.jpeg_quality, self.options.generate_webp)
                .optimize_dir(output)
        });

        // 7. sitemap.xml
        let base_url = self.base_url(site);
        if self.options.generate_sitemap {
            let xml = SitemapGenerator::new(&base_url).generate(&site.pages);
            written.push(
                write_file(output, "/sitemap.xml", xml.as_bytes())
                    .map_err(fail(BundleStage::Sitemap))?,
            );
        }

        // 8. robots.txt
        if self.options.generate_robots_txt {
            let robots = RobotsGenerator::new(&base_url).generate(self.options.generate_sitemap);
            written.push(
                write_file(output, "/robots.txt", robots.as_bytes())
                    .map_err(fail(BundleStage::Robots))?,
            );
        }

        // 9. Archive
        let summary = create_archive(output)
            .map_err(StageError::from)
            .map_err(fail(BundleStage::Archive))?;

        written.sort();
        info!(
            site_id = %site.site_id,
            files = written.len(),
            external = external.len(),
            archive = %summary.path.display(),
            "bundle complete"
        );

        Ok(BundleReport {
            archive: summary.path.clone(),
            archive_summary: summary,
            files_written: written,
            external,
            images,
        })
    }

    fn index_html(&self, site: &GeneratedSiteData) -> std::result::Result<String, StageError> {
        let document = DocumentBuilder::new(&self.settings).document(site)?;
        Ok(if self.options.optimize_for_production {
            minify_html(&document)
        } else {
            document
        })
    }

    /// Canonical URL of the site, or the configured fallback.
    fn base_url(&self, site: &GeneratedSiteData) -> String {
        site.metadata
            .canonical
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.settings.site.fallback_base_url)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Recreate `output` as an empty directory with an `assets/` child.
fn prepare_output(output: &Path) -> std::result::Result<(), StageError> {
    if output.as_os_str().is_empty() || output.parent().is_none() {
        return Err(StageError::UnsafePath(output.display().to_string()));
    }
    if output.exists() {
        debug!(dir = %output.display(), "cleaning output directory");
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output.join("assets"))?;
    Ok(())
}

/// Map a site-relative path onto `root`, rejecting anything that would
/// leave it.
pub fn resolve_site_path(root: &Path, site_path: &str) -> std::result::Result<PathBuf, StageError> {
    let relative = Path::new(site_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    let mut depth = 0;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StageError::UnsafePath(site_path.to_string()));
            }
        }
    }

    if depth == 0 {
        return Err(StageError::UnsafePath(site_path.to_string()));
    }
    Ok(resolved)
}

fn write_file(
    root: &Path,
    site_path: &str,
    bytes: &[u8],
) -> std::result::Result<PathBuf, StageError> {
    let path = resolve_site_path(root, site_path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(path)
}

fn write_assets(
    root: &Path,
    site: &GeneratedSiteData,
) -> std::result::Result<(Vec<PathBuf>, Vec<String>), StageError> {
    let mut written = Vec::new();
    let mut external = Vec::new();

    for asset in &site.assets {
        match &asset.payload {
            AssetPayload::Inline(bytes) => written.push(write_file(root, &asset.path, bytes)?),
            AssetPayload::External(url) => {
                warn!(path = %asset.path, url = %url, "external asset referenced, not fetched");
                external.push(url.clone());
            }
        }
    }

    Ok((written, external))
}

fn write_pages(
    root: &Path,
    site: &GeneratedSiteData,
    optimize: bool,
) -> std::result::Result<Vec<PathBuf>, StageError> {
    site.pages
        .iter()
        .map(|page| {
            if optimize {
                write_file(root, &page.path, minify_html(&page.html).as_bytes())
            } else {
                write_file(root, &page.path, page.html.as_bytes())
            }
        })
        .collect()
}
