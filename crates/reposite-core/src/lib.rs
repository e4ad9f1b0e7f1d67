//! Reposite Core Library
//!
//! Content model, configuration, and error handling for the Reposite site
//! generation pipeline.

pub mod config;
pub mod error;
pub mod model;
pub mod text;

pub use config::Config;
pub use error::{CoreError, Result};
pub use model::{
    AnalysisResult, AssetKind, AssetPayload, ContentSection, Customizations, GeneratedPage,
    GeneratedSiteData, MediaSuggestion, OpenGraph, PartnerRecommendation, ProjectType,
    SectionType, SiteAsset, SiteFeatures, SiteGenerationConfig, SiteMetadata, TwitterCard,
};
pub use text::slugify;
