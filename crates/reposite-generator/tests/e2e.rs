//! End-to-end tests for Reposite.
//!
//! These run the whole pipeline into temporary directories and read the
//! bundle back from disk.

use std::{fs, fs::File, io::Read};

use reposite_core::{
    AnalysisResult, AssetKind, Config, ContentSection, SectionType, SiteAsset,
    SiteGenerationConfig,
};
use reposite_generator::{
    BundleOptions, StaticBundler, TemplateKind, build::Builder, generator::SiteGenerator,
    styles::RESPONSIVE_CSS,
};
use reposite_parser::RawContent;
use zip::ZipArchive;

fn acme() -> SiteGenerationConfig {
    SiteGenerationConfig {
        site_id: "acme-1".to_string(),
        site_name: "Acme".to_string(),
        template_type: "unknown-key".to_string(),
        analysis_result: AnalysisResult {
            content_sections: vec![ContentSection::new(
                SectionType::Overview,
                "Overview",
                "Acme does X.",
                1,
            )],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn plain_options() -> BundleOptions {
    BundleOptions {
        optimize_for_production: false,
        optimize_images: false,
        ..BundleOptions::default()
    }
}

fn json_ld_block(html: &str) -> &str {
    let open = r#"<script type="application/ld+json">"#;
    let start = html.find(open).expect("JSON-LD block") + open.len();
    let end = start + html[start..].find("</script>").expect("closing tag");
    &html[start..end]
}

#[test]
fn test_acme_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("acme");
    let config = Config::default();

    let site = SiteGenerator::new(config.clone())
        .generate_site(&acme())
        .unwrap();
    assert_eq!(site.template, TemplateKind::ModernWeb.key());
    assert!(site.html.contains("Acme does X."));
    assert!(site.css.contains(RESPONSIVE_CSS.trim()));

    let archive = StaticBundler::new(config)
        .with_options(plain_options())
        .bundle(&site, &output)
        .unwrap();

    assert_eq!(archive, tmp.path().join("acme.zip"));
    assert!(archive.is_file());

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("<title>Acme</title>"));

    let json_ld: serde_json::Value = serde_json::from_str(json_ld_block(&index)).unwrap();
    assert_eq!(json_ld, site.metadata.json_ld);
}

#[test]
fn test_title_and_json_ld_survive_bundling() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("site");
    let mut request = acme();
    request.site_name = "Acme & Sons".to_string();

    let site = SiteGenerator::new(Config::default())
        .generate_site(&request)
        .unwrap();
    StaticBundler::new(Config::default())
        .with_options(plain_options())
        .bundle(&site, &output)
        .unwrap();

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("<title>Acme &amp; Sons</title>"));
    let json_ld: serde_json::Value = serde_json::from_str(json_ld_block(&index)).unwrap();
    assert_eq!(json_ld["name"], "Acme & Sons");
}

#[test]
fn test_optimized_bundle_keeps_json_ld_valid() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("site");
    let site = SiteGenerator::new(Config::default())
        .generate_site(&acme())
        .unwrap();

    StaticBundler::new(Config::default())
        .with_options(BundleOptions {
            optimize_images: false,
            ..BundleOptions::default()
        })
        .bundle(&site, &output)
        .unwrap();

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("<title>Acme</title>"));
    let json_ld: serde_json::Value = serde_json::from_str(json_ld_block(&index)).unwrap();
    assert_eq!(json_ld, site.metadata.json_ld);
}

#[test]
fn test_sitemap_counts_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("site");
    let mut request = acme();
    request.analysis_result.content_sections.extend([
        ContentSection::new(SectionType::Documentation, "Guide", "Read the guide.", 0),
        ContentSection::new(SectionType::ApiReference, "API", "Call the API.", 0),
    ]);

    let site = SiteGenerator::new(Config::default())
        .generate_site(&request)
        .unwrap();
    assert_eq!(site.pages.len(), 2);

    StaticBundler::new(Config::default())
        .with_options(plain_options())
        .bundle(&site, &output)
        .unwrap();

    let sitemap = fs::read_to_string(output.join("sitemap.xml")).unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 1 + site.pages.len());
    assert!(output.join("guide.html").is_file());
    assert!(output.join("api.html").is_file());
}

#[test]
fn test_archive_mirrors_output_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("site");
    let site = SiteGenerator::new(Config::default())
        .generate_site(&acme())
        .unwrap();

    let report = StaticBundler::new(Config::default())
        .with_options(plain_options())
        .bundle_with_report(&site, &output)
        .unwrap();

    let mut archive = ZipArchive::new(File::open(&report.archive).unwrap()).unwrap();
    for name in [
        "index.html",
        "assets/style.css",
        "assets/script.js",
        "assets/hero-image.png",
        "favicon.ico",
        "og-image.png",
        "sitemap.xml",
        "robots.txt",
    ] {
        assert!(archive.by_name(name).is_ok(), "{name} missing from archive");
    }

    let mut index = String::new();
    archive
        .by_name("index.html")
        .unwrap()
        .read_to_string(&mut index)
        .unwrap();
    assert_eq!(index, fs::read_to_string(output.join("index.html")).unwrap());
}

#[test]
fn test_one_bad_image_of_three() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("site");
    let mut site = SiteGenerator::new(Config::default())
        .generate_site(&acme())
        .unwrap();

    let mut images: Vec<SiteAsset> = site
        .assets
        .iter()
        .filter(|a| a.path.ends_with(".png"))
        .take(2)
        .cloned()
        .collect();
    images.push(SiteAsset::inline(
        AssetKind::Image,
        "/assets/broken.png",
        b"definitely not a png".to_vec(),
    ));
    site.assets = images;

    let report = StaticBundler::new(Config::default())
        .with_options(BundleOptions {
            optimize_for_production: false,
            optimize_images: true,
            generate_webp: true,
            ..BundleOptions::default()
        })
        .bundle_with_report(&site, &output)
        .unwrap();

    let images = report.images.expect("image optimization ran");
    assert_eq!(images.optimized.len(), 2);
    assert_eq!(images.derived.len(), 2);
    assert_eq!(images.failed.len(), 1);
    assert!(images.failed[0].0.ends_with("broken.png"));
    assert_eq!(
        fs::read(output.join("assets/broken.png")).unwrap(),
        b"definitely not a png"
    );
    assert!(output.join("assets/hero-image.webp").is_file());
    assert!(report.archive.is_file());
}

#[test]
fn test_builder_runs_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("widgets");
    let raw = RawContent::detect(
        r###"{
            "metadata": {
                "title": "Widgets",
                "description": "Widgets for everyone.",
                "features": ["Fast", "Secure"],
                "techStack": ["Rust"],
                "projectType": "library"
            },
            "markdown": "## Overview\n\nWidgets do things.\n\n## Installation\n\n```sh\ncargo add widgets\n```\n\n## API Reference\n\nSee the docs.\n"
        }"###,
    );
    let request = SiteGenerationConfig {
        site_id: "widgets-1".to_string(),
        template_type: "developer-library".to_string(),
        ..Default::default()
    };

    let builder = Builder::new(Config::default()).with_bundler(
        StaticBundler::new(Config::default()).with_options(BundleOptions {
            optimize_images: false,
            ..BundleOptions::default()
        }),
    );
    let stats = builder.build(&raw, request, &output).unwrap();

    assert_eq!(stats.template, "developer-library");
    assert_eq!(stats.sections, 3);
    assert_eq!(stats.pages, 1);
    assert!(stats.assets >= 5);
    assert_eq!(stats.archive, tmp.path().join("widgets.zip"));
    assert!(stats.archive.is_file());

    let index = fs::read_to_string(output.join("index.html")).unwrap();
    assert!(index.contains("<title>Widgets</title>"));
    assert!(index.contains("cargo add widgets"));
    assert!(output.join("api-reference.html").is_file());
}
