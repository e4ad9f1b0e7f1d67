//! Reposite Generator Library
//!
//! Turns normalized project content into a deployable static site.
//!
//! # Modules
//!
//! - [`template`] - Template selection and the six page layouts
//! - [`props`] - Template props derived from a generation request
//! - [`catalog`] - Tech and partner lookup tables
//! - [`shell`] - Document and documentation page shells
//! - [`html`] - Main page document assembly
//! - [`pages`] - Secondary documentation pages
//! - [`metadata`] - Meta tags, Open Graph, Twitter Card and JSON-LD
//! - [`styles`] - Stylesheet and script assembly
//! - [`assets`] - Placeholder images and image optimization
//! - [`minify`] - HTML, CSS and JS minification
//! - [`sitemap`] / [`robots`] - Crawler files
//! - [`archive`] - Zip packaging
//! - [`bundle`] - Static bundling stages
//! - [`generator`] - Site generation
//! - [`build`] - Full pipeline orchestration

pub mod archive;
pub mod assets;
pub mod build;
pub mod bundle;
pub mod catalog;
pub mod generator;
pub mod html;
pub mod metadata;
pub mod minify;
pub mod pages;
pub mod props;
pub mod robots;
pub mod shell;
pub mod sitemap;
pub mod styles;
pub mod template;

pub use assets::{ImageOptimizer, OptimizationReport, PlaceholderGenerator};
pub use build::{BuildStats, Builder, PipelineError};
pub use bundle::{BundleError, BundleOptions, BundleReport, BundleStage, StaticBundler};
pub use catalog::Catalog;
pub use generator::{GenerateError, SiteGenerator};
pub use props::{TemplateProps, Theme, prepare_props};
pub use template::{TemplateKind, TemplateRenderError, TemplateSelection, render, select_template};
