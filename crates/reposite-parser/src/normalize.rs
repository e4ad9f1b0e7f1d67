//! Normalization of AI-generated content into typed sections.

use reposite_core::{
    AnalysisResult, ContentSection, ProjectType, SectionType,
    text::truncate_chars,
};
use serde::Deserialize;
use thiserror::Error;

use crate::markdown::{first_paragraph, list_items, outline};

/// Maximum length of a derived description, in characters.
pub const DESCRIPTION_LIMIT: usize = 160;

/// Errors raised for unusable AI output.
#[derive(Debug, Error)]
pub enum ContentGenerationError {
    /// The content source returned nothing.
    #[error("content source returned an empty response")]
    EmptyResponse,

    /// A structured payload did not have the expected shape.
    #[error("invalid content payload: {0}")]
    InvalidPayload(String),
}

impl ContentGenerationError {
    /// Whether retrying the same request could succeed.
    ///
    /// Both variants describe the input itself, so the answer is always no.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmptyResponse | Self::InvalidPayload(_) => false,
        }
    }
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, ContentGenerationError>;

/// Raw output of the content source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// Free-form Markdown.
    Markdown(String),
    /// Structured payload with `metadata` and `markdown` members.
    Structured(serde_json::Value),
}

impl RawContent {
    /// Classify text: a JSON object is structured, anything else is Markdown.
    pub fn detect(text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim_start().starts_with('{') {
            return Self::Markdown(text);
        }
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value @ serde_json::Value::Object(_)) => Self::Structured(value),
            _ => Self::Markdown(text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StructuredPayload {
    metadata: Option<StructuredMetadata>,
    markdown: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StructuredMetadata {
    title: Option<String>,
    description: Option<String>,
    #[serde(alias = "key_features", alias = "keyFeatures")]
    features: Vec<String>,
    #[serde(alias = "tech_stack")]
    tech_stack: Vec<String>,
    #[serde(alias = "project_type")]
    project_type: Option<String>,
}

/// Content normalized from one AI response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedContent {
    pub title: String,
    /// Plain-text description, at most [`DESCRIPTION_LIMIT`] characters.
    pub description: String,
    pub keywords: Vec<String>,
    pub tech_stack: Vec<String>,
    pub key_features: Vec<String>,
    /// Project type stated by a structured payload, if any.
    pub project_type: Option<ProjectType>,
    /// Sections in source order. Never empty.
    pub sections: Vec<ContentSection>,
}

impl NormalizedContent {
    /// Build the analysis consumed by the generator. A project type stated
    /// in the content wins over `fallback`.
    #[must_use]
    pub fn into_analysis(self, fallback: ProjectType) -> AnalysisResult {
        AnalysisResult {
            project_type: self.project_type.unwrap_or(fallback),
            complexity_score: 0.0,
            recommended_template: None,
            key_features: self.key_features,
            tech_stack: self.tech_stack,
            partner_recommendations: Vec::new(),
            content_sections: self.sections,
            seo_keywords: self.keywords,
        }
    }
}

/// Turns raw AI output into [`NormalizedContent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentNormalizer;

impl ContentNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize `raw`. `source_id` is usually the repository URL and
    /// supplies the title when the content has none.
    pub fn normalize(&self, raw: &RawContent, source_id: &str) -> Result<NormalizedContent> {
        let content = match raw {
            RawContent::Markdown(text) => {
                if text.trim().is_empty() {
                    return Err(ContentGenerationError::EmptyResponse);
                }
                self.normalize_markdown(text, source_id)
            }
            RawContent::Structured(value) => self.normalize_structured(value, source_id)?,
        };

        tracing::debug!(
            source_id,
            title = %content.title,
            sections = content.sections.len(),
            features = content.key_features.len(),
            "normalized content"
        );

        Ok(content)
    }

    fn normalize_markdown(&self, markdown: &str, source_id: &str) -> NormalizedContent {
        let outline = outline(markdown);
        let title = outline
            .title
            .clone()
            .unwrap_or_else(|| title_from_source(source_id));

        if outline.sections.is_empty() {
            let description = first_paragraph(&outline.preamble)
                .map(|p| truncate_chars(&p, DESCRIPTION_LIMIT).to_string())
                .unwrap_or_default();
            return NormalizedContent {
                keywords: keywords_for(&title, &[]),
                title,
                description,
                sections: vec![ContentSection::new(
                    SectionType::Overview,
                    "Overview",
                    markdown,
                    1,
                )],
                ..Default::default()
            };
        }

        let count = outline.sections.len();
        let sections: Vec<ContentSection> = outline
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let title = if section.title.is_empty() {
                    format!("Section {}", i + 1)
                } else {
                    section.title.clone()
                };
                ContentSection::new(
                    classify_heading(&title),
                    title,
                    section.body.clone(),
                    (count - i) as i32,
                )
            })
            .collect();

        let description = first_paragraph(&outline.preamble)
            .or_else(|| {
                sections
                    .iter()
                    .find(|s| s.section_type == SectionType::Overview)
                    .and_then(|s| first_paragraph(&s.content))
            })
            .map(|p| truncate_chars(&p, DESCRIPTION_LIMIT).to_string())
            .unwrap_or_default();

        let key_features = sections
            .iter()
            .find(|s| s.section_type == SectionType::Features)
            .map(|s| labels(&s.content))
            .unwrap_or_default();

        let tech_stack = sections
            .iter()
            .find(|s| is_tech_heading(&s.title))
            .map(|s| labels(&s.content))
            .unwrap_or_default();

        NormalizedContent {
            keywords: keywords_for(&title, &tech_stack),
            title,
            description,
            tech_stack,
            key_features,
            project_type: None,
            sections,
        }
    }

    fn normalize_structured(
        &self,
        value: &serde_json::Value,
        source_id: &str,
    ) -> Result<NormalizedContent> {
        if !value.is_object() {
            return Err(ContentGenerationError::InvalidPayload(
                "expected a JSON object".to_string(),
            ));
        }

        let payload: StructuredPayload = serde_json::from_value(value.clone())
            .map_err(|e| ContentGenerationError::InvalidPayload(e.to_string()))?;

        let markdown = payload.markdown.filter(|m| !m.trim().is_empty());
        let metadata = match (payload.metadata, &markdown) {
            (None, None) => {
                return Err(ContentGenerationError::InvalidPayload(
                    "payload has neither metadata nor markdown".to_string(),
                ));
            }
            (metadata, _) => metadata.unwrap_or_default(),
        };

        let mut content = match &markdown {
            Some(md) => self.normalize_markdown(md, source_id),
            None => NormalizedContent {
                title: title_from_source(source_id),
                ..Default::default()
            },
        };

        if let Some(title) = metadata.title.filter(|t| !t.trim().is_empty()) {
            content.title = title;
        }
        if let Some(description) = metadata.description {
            content.description = description;
        }
        if !metadata.features.is_empty() {
            content.key_features = metadata.features;
        }
        if !metadata.tech_stack.is_empty() {
            content.tech_stack = metadata.tech_stack;
        }
        content.project_type = metadata.project_type.as_deref().map(ProjectType::parse);
        content.keywords = keywords_for(&content.title, &content.tech_stack);

        if content.sections.is_empty() {
            let body = if content.description.is_empty() {
                content.title.clone()
            } else {
                content.description.clone()
            };
            content.sections = vec![ContentSection::new(SectionType::Overview, "Overview", body, 1)];
        }

        Ok(content)
    }
}

/// Section type for a heading, from a fixed keyword map.
pub fn classify_heading(title: &str) -> SectionType {
    let words: Vec<String> = title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let has = |w: &str| words.iter().any(|x| x == w);
    let has_prefix = |p: &str| words.iter().any(|x| x.starts_with(p));
    let has_phrase = |a: &str, b: &str| words.windows(2).any(|pair| pair[0] == a && pair[1] == b);

    if has("overview") || has("introduction") || has("about") {
        SectionType::Overview
    } else if has_prefix("feature") {
        SectionType::Features
    } else if has_phrase("getting", "started")
        || has_phrase("quick", "start")
        || has("quickstart")
        || has("usage")
        || has_prefix("install")
        || has("demo")
    {
        SectionType::Usage
    } else if has("api") || has("apis") {
        SectionType::ApiReference
    } else if has("documentation") || has("docs") || has("guide") || has("reference") {
        SectionType::Documentation
    } else {
        SectionType::Other
    }
}

fn is_tech_heading(title: &str) -> bool {
    let lower = title.to_lowercase();
    lower.contains("technology")
        || lower.contains("technologies")
        || lower.contains("tech stack")
        || lower.contains("built with")
}

/// Title derived from a source identifier such as a repository URL.
pub fn title_from_source(source_id: &str) -> String {
    let segment = source_id
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let segment = segment.strip_suffix(".git").unwrap_or(segment);

    if segment.is_empty() {
        "Project".to_string()
    } else {
        segment.to_string()
    }
}

/// List items reduced to their label: text before a `:` or ` - ` separator.
fn labels(markdown: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in list_items(markdown) {
        let label = item
            .split(" - ")
            .next()
            .and_then(|s| s.split(": ").next())
            .unwrap_or(item.as_str())
            .trim()
            .trim_end_matches(':')
            .to_string();
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

fn keywords_for(title: &str, tech_stack: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for candidate in std::iter::once(title).chain(tech_stack.iter().map(String::as_str)) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if !keywords.iter().any(|k| k.eq_ignore_ascii_case(candidate)) {
            keywords.push(candidate.to_string());
        }
    }
    keywords
}
