//! Generator configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Reposite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings shared by every generated site.
    #[serde(default)]
    pub site: SiteConfig,

    /// Bundle output settings.
    #[serde(default)]
    pub bundle: BundleConfig,

    /// Image optimization settings.
    #[serde(default)]
    pub images: ImageConfig,

    /// Template stylesheet settings.
    #[serde(default)]
    pub styles: StyleConfig,
}

/// Settings applied to every generated site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Domain under which sites are published as `<slug>.<domain>`.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Value of the `author` meta tag.
    #[serde(default = "default_author")]
    pub author: String,

    /// Value of the `generator` meta tag.
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Document language.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Endpoint the analytics beacon posts to.
    #[serde(default = "default_analytics_endpoint")]
    pub analytics_endpoint: String,

    /// Optional gtag measurement id used by the inline bootstrap.
    #[serde(default)]
    pub measurement_id: Option<String>,

    /// Base URL used for the sitemap when a site has no canonical URL.
    #[serde(default = "default_fallback_base_url")]
    pub fallback_base_url: String,
}

/// Bundle output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Minify HTML, CSS and JS.
    #[serde(default = "default_true")]
    pub optimize_for_production: bool,

    /// Write `sitemap.xml`.
    #[serde(default = "default_true")]
    pub generate_sitemap: bool,

    /// Write `robots.txt`.
    #[serde(default = "default_true")]
    pub generate_robots_txt: bool,
}

/// Image optimization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Recompress raster images in the bundle.
    #[serde(default = "default_true")]
    pub optimize: bool,

    /// Derive a `.webp` sibling for each optimized image.
    #[serde(default = "default_true")]
    pub generate_webp: bool,

    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

/// Template stylesheet configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Directory holding `<template-key>.css` overrides. Built-in stylesheets
    /// are used when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// Default value functions
fn default_domain() -> String {
    "reposite.dev".to_string()
}

fn default_author() -> String {
    "Reposite".to_string()
}

fn default_generator() -> String {
    format!("Reposite v{}", env!("CARGO_PKG_VERSION"))
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_analytics_endpoint() -> String {
    "/api/analytics".to_string()
}

fn default_fallback_base_url() -> String {
    "https://example.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            author: default_author(),
            generator: default_generator(),
            lang: default_lang(),
            analytics_endpoint: default_analytics_endpoint(),
            measurement_id: None,
            fallback_base_url: default_fallback_base_url(),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            optimize_for_production: true,
            generate_sitemap: true,
            generate_robots_txt: true,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            generate_webp: true,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file with `REPOSITE__SECTION__KEY`
    /// environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("REPOSITE").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.domain.trim().is_empty() {
            return Err(CoreError::config("site.domain cannot be empty"));
        }

        if self.site.domain.contains('/') {
            return Err(CoreError::config(
                "site.domain must be a bare host name without scheme or path",
            ));
        }

        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(CoreError::config(
                "images.jpeg_quality must be between 1 and 100",
            ));
        }

        if self.site.fallback_base_url.ends_with('/') {
            tracing::warn!("site.fallback_base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Canonical URL for a site slug, e.g. `https://acme.reposite.dev`.
    #[must_use]
    pub fn canonical_url(&self, slug: &str) -> String {
        format!("https://{slug}.{}", self.site.domain)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
domain = "sites.example.org"
author = "Example Inc"
lang = "de"
measurement_id = "G-TEST"

[bundle]
optimize_for_production = false
generate_robots_txt = false

[images]
generate_webp = false
jpeg_quality = 70

[styles]
dir = "themes/css"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("reposite.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.domain, "sites.example.org");
        assert_eq!(config.site.author, "Example Inc");
        assert_eq!(config.site.lang, "de");
        assert_eq!(config.site.measurement_id.as_deref(), Some("G-TEST"));
        assert!(!config.bundle.optimize_for_production);
        assert!(config.bundle.generate_sitemap);
        assert!(!config.bundle.generate_robots_txt);
        assert!(config.images.optimize);
        assert!(!config.images.generate_webp);
        assert_eq!(config.images.jpeg_quality, 70);
        assert_eq!(config.styles.dir, Some(PathBuf::from("themes/css")));
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("reposite.toml");
        std::fs::write(&config_path, "").expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.domain, "reposite.dev");
        assert_eq!(config.site.lang, "en");
        assert_eq!(config.site.analytics_endpoint, "/api/analytics");
        assert!(config.site.generator.starts_with("Reposite v"));
        assert!(config.bundle.optimize_for_production);
        assert!(config.bundle.generate_sitemap);
        assert_eq!(config.images.jpeg_quality, 85);
        assert!(config.styles.dir.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_canonical_url() {
        let config = Config::default();
        assert_eq!(config.canonical_url("acme"), "https://acme.reposite.dev");
    }

    #[test]
    fn test_config_validation_bad_quality() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("reposite.toml");
        std::fs::write(&config_path, "[images]\njpeg_quality = 0\n").expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_config_validation_domain_with_scheme() {
        let mut config = Config::default();
        config.site.domain = "https://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_with_env() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("reposite.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.site.domain, "sites.example.org");
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/reposite.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
