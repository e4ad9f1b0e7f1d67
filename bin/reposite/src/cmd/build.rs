//! Build command - generates the site bundle and archive

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use reposite_core::{SiteGenerationConfig, slugify};
use reposite_generator::{BuildStats, Builder};
use reposite_parser::RawContent;

use crate::load_config;

/// Arguments of the build command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BuildArgs {
    /// AI-generated content: Markdown, or a JSON payload with `metadata` and
    /// `markdown`
    pub content: PathBuf,

    /// Output directory; the archive is written next to it as `<output>.zip`
    #[arg(short, long, default_value = "public")]
    pub output: PathBuf,

    /// JSON file holding the generation request (site id, name, analysis,
    /// customizations, features)
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Site identifier, also used as the title source
    #[arg(long)]
    pub site_id: Option<String>,

    /// Site name shown in the hero and page titles
    #[arg(long)]
    pub name: Option<String>,

    /// Template key (e.g. modern-web, developer-library)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Include the demo block and screenshots
    #[arg(long)]
    pub demo: bool,

    /// Include video playback hooks
    #[arg(long)]
    pub video: bool,

    /// Include the slideshow script
    #[arg(long)]
    pub slideshow: bool,

    /// Skip HTML/CSS/JS minification
    #[arg(long)]
    pub no_minify: bool,

    /// Skip image recompression and WebP derivation
    #[arg(long)]
    pub no_images: bool,
}

/// Run the build command.
///
/// Normalizes the content, renders the site and bundles it to the output
/// directory.
pub fn run(config_path: &Path, args: &BuildArgs) -> Result<BuildStats> {
    let start = Instant::now();
    tracing::info!(?config_path, content = ?args.content, output = ?args.output, "Starting build");

    let mut config = load_config(config_path)?;
    if args.no_minify {
        config.bundle.optimize_for_production = false;
    }
    if args.no_images {
        config.images.optimize = false;
    }
    tracing::debug!(?config, "Loaded configuration");

    let text = fs::read_to_string(&args.content)
        .wrap_err_with(|| format!("Failed to read content from {}", args.content.display()))?;
    let raw = RawContent::detect(text);

    let request = request(args)?;
    let site_id = request.site_id.clone();

    let stats = Builder::new(config)
        .build(&raw, request, &args.output)
        .wrap_err_with(|| format!("Build failed for site {site_id}"))?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Template:   {}", stats.template);
    println!("  Sections:   {}", stats.sections);
    println!("  Pages:      {}", stats.pages);
    println!("  Assets:     {}", stats.assets);
    println!(
        "  Images:     {} optimized, {} failed",
        stats.images_optimized, stats.images_failed
    );
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", args.output.display());
    println!("  Archive:    {}", stats.archive.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(stats)
}

/// Assemble the generation request from the request file and flags.
pub fn request(args: &BuildArgs) -> Result<SiteGenerationConfig> {
    let mut request = match &args.request {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read request from {}", path.display()))?;
            serde_json::from_str(&json)
                .wrap_err_with(|| format!("Invalid request JSON in {}", path.display()))?
        }
        None => SiteGenerationConfig::default(),
    };

    if let Some(site_id) = &args.site_id {
        request.site_id = site_id.clone();
    }
    if request.site_id.trim().is_empty() {
        let stem = args
            .content
            .file_stem()
            .map(|s| slugify(&s.to_string_lossy()))
            .unwrap_or_default();
        request.site_id = if stem.is_empty() {
            "site".to_string()
        } else {
            stem
        };
    }
    if let Some(name) = &args.name {
        request.site_name = name.clone();
    }
    if let Some(template) = &args.template {
        request.template_type = template.clone();
    }

    request.features.include_demo |= args.demo;
    request.features.enable_video |= args.video;
    request.features.enable_slideshow |= args.slideshow;

    Ok(request)
}
