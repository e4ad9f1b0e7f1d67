//! Content model shared across the generation pipeline.
//!
//! The wire format of [`AnalysisResult`] follows the snake_case JSON produced
//! by the repository analyzer; camelCase aliases are accepted for payloads
//! written by the web client.

use std::{cmp::Reverse, collections::BTreeMap};

use serde::{Deserialize, Serialize};

/// Semantic type of a content section. Drives placement on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Overview,
    Features,
    Usage,
    Documentation,
    ApiReference,
    Main,
    #[default]
    #[serde(other)]
    Other,
}

impl SectionType {
    /// Placement rank; lower ranks render first.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Overview => 0,
            Self::Main => 1,
            Self::Features => 2,
            Self::Usage => 3,
            Self::Documentation => 4,
            Self::ApiReference => 5,
            Self::Other => 6,
        }
    }

    /// Wire name of the section type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Features => "features",
            Self::Usage => "usage",
            Self::Documentation => "documentation",
            Self::ApiReference => "api_reference",
            Self::Main => "main",
            Self::Other => "other",
        }
    }

    /// Whether sections of this type are published as standalone pages.
    #[must_use]
    pub fn is_secondary_page(self) -> bool {
        matches!(self, Self::Documentation | Self::ApiReference)
    }
}

/// Advisory media placement hint attached to a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSuggestion {
    #[serde(alias = "mediaType")]
    pub media_type: String,
    pub description: String,
    pub placement: String,
}

/// One semantic block of page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    #[serde(alias = "sectionType")]
    pub section_type: SectionType,

    /// Display title.
    pub title: String,

    /// Markdown body.
    pub content: String,

    /// Higher values render first within a type group.
    pub priority: i32,

    #[serde(alias = "mediaSuggestions")]
    pub media_suggestions: Vec<MediaSuggestion>,
}

impl ContentSection {
    /// Create a section without media suggestions.
    #[must_use]
    pub fn new(
        section_type: SectionType,
        title: impl Into<String>,
        content: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            section_type,
            title: title.into(),
            content: content.into(),
            priority,
            media_suggestions: Vec::new(),
        }
    }
}

/// Kind of project detected by the analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    WebApplication,
    Library,
    Tool,
    Framework,
    #[default]
    #[serde(other)]
    Other,
}

impl ProjectType {
    /// Parse a loosely formatted project type, e.g. `"Web Application"`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match crate::text::slugify(value).as_str() {
            "web-application" | "web-app" | "webapp" => Self::WebApplication,
            "library" | "lib" | "package" => Self::Library,
            "tool" | "cli" | "cli-tool" => Self::Tool,
            "framework" => Self::Framework,
            _ => Self::Other,
        }
    }
}

/// Partner call-out suggested by the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerRecommendation {
    #[serde(alias = "partnerId")]
    pub partner_id: String,
    #[serde(alias = "partnerName")]
    pub partner_name: String,
    #[serde(alias = "relevanceScore")]
    pub relevance_score: f64,
    #[serde(alias = "integrationType")]
    pub integration_type: String,
    #[serde(alias = "ctaText")]
    pub cta_text: String,
    #[serde(alias = "placementPriority")]
    pub placement_priority: i32,
}

/// Normalized view of what the analyzer produced for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(alias = "projectType")]
    pub project_type: ProjectType,

    /// Advisory only.
    #[serde(alias = "complexityScore")]
    pub complexity_score: f64,

    /// Template key; may be absent or unknown.
    #[serde(alias = "recommendedTemplate")]
    pub recommended_template: Option<String>,

    #[serde(alias = "keyFeatures")]
    pub key_features: Vec<String>,

    #[serde(alias = "techStack")]
    pub tech_stack: Vec<String>,

    #[serde(alias = "partnerRecommendations")]
    pub partner_recommendations: Vec<PartnerRecommendation>,

    #[serde(alias = "contentSections")]
    pub content_sections: Vec<ContentSection>,

    #[serde(alias = "seoKeywords")]
    pub seo_keywords: Vec<String>,
}

impl AnalysisResult {
    /// Sections in placement order: type rank, then priority descending, then
    /// original sequence index.
    #[must_use]
    pub fn ordered_sections(&self) -> Vec<&ContentSection> {
        let mut sections: Vec<_> = self.content_sections.iter().collect();
        // Stable sort keeps source order for equal keys.
        sections.sort_by_key(|s| (s.section_type.rank(), Reverse(s.priority)));
        sections
    }

    /// Sections of one type, in placement order.
    #[must_use]
    pub fn sections_of(&self, section_type: SectionType) -> Vec<&ContentSection> {
        self.ordered_sections()
            .into_iter()
            .filter(|s| s.section_type == section_type)
            .collect()
    }
}

/// Feature flags for one generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteFeatures {
    #[serde(alias = "includeDemo")]
    pub include_demo: bool,
    #[serde(alias = "enableVideo")]
    pub enable_video: bool,
    #[serde(alias = "enableSlideshow")]
    pub enable_slideshow: bool,
}

/// Free-form theme overrides, e.g. `primaryColor` → `#FF0000`.
pub type Customizations = BTreeMap<String, serde_json::Value>;

/// Input to rendering. Constructed once per request and consumed read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteGenerationConfig {
    #[serde(alias = "siteId")]
    pub site_id: String,
    #[serde(alias = "siteName")]
    pub site_name: String,
    #[serde(alias = "siteDescription")]
    pub site_description: Option<String>,
    #[serde(alias = "templateType")]
    pub template_type: String,
    #[serde(alias = "analysisResult")]
    pub analysis_result: AnalysisResult,
    pub customizations: Customizations,
    pub features: SiteFeatures,
}

/// Kind of a bundled asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Document,
    Style,
    Script,
}

/// Where an asset's bytes come from. Exactly one source is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    /// Bytes written into the bundle.
    Inline(Vec<u8>),
    /// External reference; never fetched by the bundler.
    External(String),
}

/// A file that belongs to the generated site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAsset {
    pub kind: AssetKind,
    /// Site-relative path with a leading slash.
    pub path: String,
    pub payload: AssetPayload,
    /// Byte count, if known.
    pub size: Option<u64>,
}

impl SiteAsset {
    /// Asset with inline content; size is taken from the payload.
    #[must_use]
    pub fn inline(kind: AssetKind, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = Some(bytes.len() as u64);
        Self {
            kind,
            path: path.into(),
            payload: AssetPayload::Inline(bytes),
            size,
        }
    }

    /// Asset that only references an external URL.
    #[must_use]
    pub fn external(kind: AssetKind, path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            payload: AssetPayload::External(url.into()),
            size: None,
        }
    }
}

/// Open Graph tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub site_name: String,
}

/// Twitter Card tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub creator: Option<String>,
    pub image: Option<String>,
}

/// Document-level metadata injected into the page head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub author: String,
    pub generator: String,
    pub viewport: String,
    pub canonical: Option<String>,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    /// schema.org `SoftwareApplication` object.
    pub json_ld: serde_json::Value,
}

/// A standalone secondary page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    /// Site-relative path, e.g. `/api-reference.html`.
    pub path: String,
    /// Complete HTML document.
    pub html: String,
    pub title: String,
    pub description: String,
}

/// Output of rendering, consumed by the bundler.
#[derive(Debug, Clone)]
pub struct GeneratedSiteData {
    pub site_id: String,
    /// Key of the template that rendered `html`.
    pub template: String,
    /// Body fragment.
    pub html: String,
    pub css: String,
    pub js: String,
    pub assets: Vec<SiteAsset>,
    pub metadata: SiteMetadata,
    pub pages: Vec<GeneratedPage>,
}
