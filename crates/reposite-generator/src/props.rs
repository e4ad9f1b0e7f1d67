//! View-model preparation for templates.

use std::collections::BTreeMap;

use reposite_core::{
    AnalysisResult, Config, ContentSection, ProjectType, SectionType, SiteGenerationConfig,
    slugify,
    text::{first_sentence, truncate_chars},
};
use reposite_parser::{CodeBlock, MarkdownRenderer, extract_code_blocks, markdown::first_paragraph};
use serde::Serialize;

use crate::{
    catalog::Catalog,
    pages::{SlugSet, doc_page_paths},
    template::FIXED_SECTION_IDS,
};

/// Maximum number of feature cards.
pub const MAX_FEATURES: usize = 6;

/// Maximum number of partner call-outs.
pub const MAX_PARTNERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

impl Link {
    fn new(text: &str, href: &str) -> Self {
        Self {
            text: text.to_string(),
            href: href.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroProps {
    pub title: String,
    pub subtitle: String,
    /// Rendered overview or main section; empty when there is none.
    pub description_html: String,
    pub primary_cta: Link,
    pub secondary_cta: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureProps {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechProps {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoProps {
    pub title: String,
    pub description: String,
    pub demo_url: String,
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageProps {
    pub title: String,
    pub html: String,
    pub code_blocks: Vec<CodeBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerProps {
    pub name: String,
    pub cta_text: String,
    pub description: String,
    pub logo: String,
    pub url: String,
}

/// A content section rendered in place on the main page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProps {
    pub id: String,
    pub title: String,
    pub section_type: SectionType,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterProps {
    pub text: String,
    pub links: Vec<Link>,
}

/// Resolved theme: customizations merged over defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub text_color: String,
    pub background_color: String,
    pub font_family: String,
    /// Customization keys without a dedicated field.
    pub extra: BTreeMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#3B82F6".to_string(),
            secondary_color: "#1E40AF".to_string(),
            accent_color: "#F59E0B".to_string(),
            text_color: "#1F2937".to_string(),
            background_color: "#FFFFFF".to_string(),
            font_family: "Inter, sans-serif".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Theme {
    /// Merge customizations over the defaults. Non-scalar values are ignored.
    #[must_use]
    pub fn from_customizations(customizations: &reposite_core::Customizations) -> Self {
        let mut theme = Self::default();

        for (key, value) in customizations {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => continue,
            };

            match key.as_str() {
                "primaryColor" => theme.primary_color = value,
                "secondaryColor" => theme.secondary_color = value,
                "accentColor" => theme.accent_color = value,
                "textColor" => theme.text_color = value,
                "backgroundColor" => theme.background_color = value,
                "fontFamily" => theme.font_family = value,
                _ => {
                    theme.extra.insert(key.clone(), value);
                }
            }
        }

        theme
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoProps {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical_url: String,
}

/// Everything a template needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateProps {
    pub site_id: String,
    pub site_name: String,
    pub site_description: String,
    pub hero: HeroProps,
    pub features: Vec<FeatureProps>,
    pub tech_stack: Vec<TechProps>,
    pub demo: Option<DemoProps>,
    pub usage: Option<UsageProps>,
    pub partners: Vec<PartnerProps>,
    pub doc_links: Vec<Link>,
    pub sections: Vec<SectionProps>,
    pub footer: FooterProps,
    pub theme: Theme,
    pub seo: SeoProps,
}

/// Derives [`TemplateProps`] from a generation request.
#[derive(Debug)]
pub struct PropsBuilder<'a> {
    settings: &'a Config,
    catalog: &'a Catalog,
    renderer: &'a MarkdownRenderer,
}

impl<'a> PropsBuilder<'a> {
    #[must_use]
    pub fn new(settings: &'a Config, catalog: &'a Catalog, renderer: &'a MarkdownRenderer) -> Self {
        Self {
            settings,
            catalog,
            renderer,
        }
    }

    /// Prepare template props for one request.
    pub fn prepare(&self, config: &SiteGenerationConfig) -> TemplateProps {
        let analysis = &config.analysis_result;
        let ordered = analysis.ordered_sections();

        let hero_section = ordered
            .iter()
            .copied()
            .find(|s| matches!(s.section_type, SectionType::Overview | SectionType::Main));
        let usage_section = ordered
            .iter()
            .copied()
            .find(|s| s.section_type == SectionType::Usage);

        let description = config
            .site_description
            .clone()
            .filter(|d| !d.trim().is_empty());

        let (primary_cta, secondary_cta) = hero_cta(analysis.project_type);
        let hero = HeroProps {
            title: config.site_name.clone(),
            subtitle: description
                .clone()
                .unwrap_or_else(|| format!("Discover the power of {}", config.site_name)),
            description_html: hero_section
                .map(|s| self.renderer.render(&s.content))
                .unwrap_or_default(),
            primary_cta,
            secondary_cta,
        };

        let site_description = description.clone().unwrap_or_else(|| {
            hero_section
                .and_then(|s| first_paragraph(&s.content))
                .unwrap_or_else(|| format!("Welcome to {}", config.site_name))
        });

        let usage = usage_section.map(|s| UsageProps {
            title: s.title.clone(),
            html: self.renderer.render(&s.content),
            code_blocks: extract_code_blocks(&s.content),
        });

        let doc_links = doc_page_paths(analysis)
            .into_iter()
            .map(|(section, path)| Link {
                text: section.title.clone(),
                href: path,
            })
            .collect();

        // Sections shown elsewhere on the page or on their own page are skipped.
        let mut ids = SlugSet::with_taken(&FIXED_SECTION_IDS);
        let sections = ordered
            .iter()
            .copied()
            .filter(|s| {
                !s.section_type.is_secondary_page()
                    && s.section_type != SectionType::Features
                    && !hero_section.is_some_and(|h| std::ptr::eq(*s, h))
                    && !usage_section.is_some_and(|u| std::ptr::eq(*s, u))
            })
            .enumerate()
            .map(|(i, s)| {
                let mut base = slugify(&s.title);
                if base.is_empty() {
                    base = format!("section-{}", i + 1);
                }
                SectionProps {
                    id: ids.claim(&base),
                    title: s.title.clone(),
                    section_type: s.section_type,
                    html: self.renderer.render(&s.content),
                }
            })
            .collect();

        TemplateProps {
            site_id: config.site_id.clone(),
            site_name: config.site_name.clone(),
            site_description,
            hero,
            features: self.features(analysis),
            tech_stack: analysis
                .tech_stack
                .iter()
                .map(|tech| TechProps {
                    name: tech.clone(),
                    icon: self.catalog.tech_icon(tech),
                    description: self.catalog.tech_description(tech),
                })
                .collect(),
            demo: config.features.include_demo.then(|| DemoProps {
                title: "See It In Action".to_string(),
                description: "Experience the capabilities firsthand".to_string(),
                demo_url: "#demo".to_string(),
                screenshots: vec![
                    "/assets/screenshot-1.png".to_string(),
                    "/assets/screenshot-2.png".to_string(),
                ],
            }),
            usage,
            partners: self.partners(analysis),
            doc_links,
            sections,
            footer: self.footer(),
            theme: Theme::from_customizations(&config.customizations),
            seo: SeoProps {
                title: config.site_name.clone(),
                description: description.unwrap_or_else(|| {
                    format!("{} - Professional project showcase", config.site_name)
                }),
                keywords: dedup_keywords(&analysis.seo_keywords),
                canonical_url: self.canonical_url(config),
            },
        }
    }

    /// Canonical URL derived from the site name, falling back to the site id.
    pub fn canonical_url(&self, config: &SiteGenerationConfig) -> String {
        canonical_url(self.settings, config)
    }

    fn features(&self, analysis: &AnalysisResult) -> Vec<FeatureProps> {
        let from_keys = analysis.key_features.iter().map(|feature| FeatureProps {
            title: feature.clone(),
            description: format!("Advanced {} capabilities", feature.to_lowercase()),
            icon: self.catalog.feature_icon(feature),
        });

        let from_sections = analysis
            .sections_of(SectionType::Features)
            .into_iter()
            .map(|section| FeatureProps {
                title: section.title.clone(),
                description: section_summary(section),
                icon: self.catalog.feature_icon(&section.title),
            });

        from_keys.chain(from_sections).take(MAX_FEATURES).collect()
    }

    fn partners(&self, analysis: &AnalysisResult) -> Vec<PartnerProps> {
        let mut partners: Vec<_> = analysis.partner_recommendations.iter().collect();
        partners.sort_by_key(|p| std::cmp::Reverse(p.placement_priority));

        partners
            .into_iter()
            .take(MAX_PARTNERS)
            .map(|p| PartnerProps {
                name: p.partner_name.clone(),
                cta_text: p.cta_text.clone(),
                description: self.catalog.partner_description(&p.partner_name),
                logo: self.catalog.partner_logo(&p.partner_name),
                url: self.catalog.partner_url(&p.partner_name),
            })
            .collect()
    }

    fn footer(&self) -> FooterProps {
        let domain = &self.settings.site.domain;
        FooterProps {
            text: format!("Generated with {}", self.settings.site.author),
            links: vec![
                Link {
                    text: "Create Your Site".to_string(),
                    href: format!("https://{domain}"),
                },
                Link {
                    text: "Documentation".to_string(),
                    href: format!("https://docs.{domain}"),
                },
            ],
        }
    }
}

/// Prepare props with the built-in catalog and a default renderer.
pub fn prepare_props(config: &SiteGenerationConfig, settings: &Config) -> TemplateProps {
    let catalog = Catalog::default();
    let renderer = MarkdownRenderer::new();
    PropsBuilder::new(settings, &catalog, &renderer).prepare(config)
}

/// `https://<slug(site name)>.<domain>`, using the site id when the name has
/// no slug characters.
pub fn canonical_url(settings: &Config, config: &SiteGenerationConfig) -> String {
    let mut slug = slugify(&config.site_name);
    if slug.is_empty() {
        slug = slugify(&config.site_id);
    }
    if slug.is_empty() {
        slug = "site".to_string();
    }
    settings.canonical_url(&slug)
}

fn hero_cta(project_type: ProjectType) -> (Link, Link) {
    match project_type {
        ProjectType::WebApplication => (
            Link::new("Try Demo", "#demo"),
            Link::new("View Source", "#source"),
        ),
        ProjectType::Library => (
            Link::new("Get Started", "#installation"),
            Link::new("Documentation", "#docs"),
        ),
        _ => (
            Link::new("Learn More", "#features"),
            Link::new("View Project", "#project"),
        ),
    }
}

/// One-line summary of a section body.
fn section_summary(section: &ContentSection) -> String {
    let text = first_paragraph(&section.content).unwrap_or_default();
    let sentence = first_sentence(&text);
    if !sentence.is_empty() {
        return sentence;
    }
    let body = section.content.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("{}...", truncate_chars(body, 100))
    }
}

/// Keywords without case-insensitive duplicates, first spelling kept.
fn dedup_keywords(keywords: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !out.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            out.push(keyword.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use reposite_core::{ContentSection, PartnerRecommendation, SiteFeatures};

    use super::*;

    fn request() -> SiteGenerationConfig {
        SiteGenerationConfig {
            site_id: "site-1".to_string(),
            site_name: "Acme Widgets".to_string(),
            template_type: "modern-web".to_string(),
            analysis_result: AnalysisResult {
                project_type: ProjectType::Library,
                key_features: vec!["Fast API".to_string(), "Tiny".to_string()],
                tech_stack: vec!["Rust".to_string(), "Elixir".to_string()],
                seo_keywords: vec!["acme".to_string(), "Acme".to_string(), "widgets".to_string()],
                content_sections: vec![
                    ContentSection::new(SectionType::Overview, "Overview", "Acme does X.", 0),
                    ContentSection::new(
                        SectionType::Features,
                        "Security first",
                        "Audited code. Really.",
                        0,
                    ),
                    ContentSection::new(
                        SectionType::Usage,
                        "Install",
                        "```bash\ncargo add acme\n```",
                        0,
                    ),
                    ContentSection::new(SectionType::Documentation, "User Guide", "Read me.", 0),
                    ContentSection::new(SectionType::Other, "Changelog", "Nothing yet.", 0),
                ],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_hero_and_cta() {
        let props = prepare_props(&request(), &Config::default());

        assert_eq!(props.hero.title, "Acme Widgets");
        assert_eq!(props.hero.subtitle, "Discover the power of Acme Widgets");
        assert!(props.hero.description_html.contains("Acme does X."));
        assert_eq!(props.hero.primary_cta, Link::new("Get Started", "#installation"));
        assert_eq!(props.hero.secondary_cta, Link::new("Documentation", "#docs"));
        assert_eq!(props.site_description, "Acme does X.");
    }

    #[test]
    fn test_cta_by_project_type() {
        assert_eq!(hero_cta(ProjectType::WebApplication).0.text, "Try Demo");
        assert_eq!(hero_cta(ProjectType::Tool).0, Link::new("Learn More", "#features"));
        assert_eq!(hero_cta(ProjectType::Other).1.href, "#project");
    }

    #[test]
    fn test_features_merge_and_icons() {
        let props = prepare_props(&request(), &Config::default());
        let titles: Vec<_> = props.features.iter().map(|f| f.title.as_str()).collect();

        assert_eq!(titles, vec!["Fast API", "Tiny", "Security first"]);
        assert_eq!(props.features[0].description, "Advanced fast api capabilities");
        assert_eq!(props.features[0].icon, "api");
        assert_eq!(props.features[2].description, "Audited code.");
        assert_eq!(props.features[2].icon, "lock");
    }

    #[test]
    fn test_features_capped() {
        let mut config = request();
        config.analysis_result.key_features = (0..10).map(|i| format!("Feature {i}")).collect();
        for i in 0..5 {
            config
                .analysis_result
                .content_sections
                .push(ContentSection::new(SectionType::Features, format!("S{i}"), "x", i));
        }

        let props = prepare_props(&config, &Config::default());
        assert_eq!(props.features.len(), MAX_FEATURES);
    }

    #[test]
    fn test_tech_stack_with_fallback() {
        let props = prepare_props(&request(), &Config::default());
        assert_eq!(props.tech_stack[0].icon, "rust");
        assert_eq!(props.tech_stack[1].icon, "code");
        assert_eq!(props.tech_stack[1].description, "Elixir technology");
    }

    #[test]
    fn test_demo_only_when_enabled() {
        let props = prepare_props(&request(), &Config::default());
        assert!(props.demo.is_none());

        let mut config = request();
        config.features = SiteFeatures {
            include_demo: true,
            ..Default::default()
        };
        let demo = prepare_props(&config, &Config::default()).demo.unwrap();
        assert_eq!(demo.demo_url, "#demo");
        assert_eq!(demo.screenshots.len(), 2);
    }

    #[test]
    fn test_usage_block() {
        let usage = prepare_props(&request(), &Config::default()).usage.unwrap();
        assert_eq!(usage.title, "Install");
        assert_eq!(usage.code_blocks.len(), 1);
        assert_eq!(usage.code_blocks[0].language, "bash");
        assert_eq!(usage.code_blocks[0].code, "cargo add acme");
    }

    #[test]
    fn test_partners_top_three_sorted() {
        let mut config = request();
        config.analysis_result.partner_recommendations = [1, 7, 3, 7, 5]
            .iter()
            .enumerate()
            .map(|(i, p)| PartnerRecommendation {
                partner_name: format!("P{i}"),
                placement_priority: *p,
                ..Default::default()
            })
            .collect();

        let props = prepare_props(&config, &Config::default());
        let names: Vec<_> = props.partners.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P3", "P4"]);
    }

    #[test]
    fn test_doc_links_and_remaining_sections() {
        let props = prepare_props(&request(), &Config::default());

        assert_eq!(props.doc_links, vec![Link::new("User Guide", "/user-guide.html")]);
        let ids: Vec<_> = props.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["changelog"]);
    }

    #[test]
    fn test_section_ids_avoid_fixed_anchors() {
        let mut config = request();
        config.analysis_result.content_sections.extend([
            ContentSection::new(SectionType::Other, "Demo", "Watch.", 0),
            ContentSection::new(SectionType::Other, "Docs", "Elsewhere.", 0),
            ContentSection::new(SectionType::Other, "Changelog", "Older.", 0),
        ]);

        let props = prepare_props(&config, &Config::default());
        let ids: Vec<_> = props.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["changelog", "demo-2", "docs-2", "changelog-2"]);
        assert!(ids.iter().all(|id| !FIXED_SECTION_IDS.contains(id)));
    }

    #[test]
    fn test_theme_merge() {
        let mut config = request();
        config
            .customizations
            .insert("primaryColor".to_string(), serde_json::json!("#FF0000"));
        config
            .customizations
            .insert("borderRadius".to_string(), serde_json::json!(8));
        config
            .customizations
            .insert("nested".to_string(), serde_json::json!({"a": 1}));

        let theme = prepare_props(&config, &Config::default()).theme;
        assert_eq!(theme.primary_color, "#FF0000");
        assert_eq!(theme.secondary_color, "#1E40AF");
        assert_eq!(theme.font_family, "Inter, sans-serif");
        assert_eq!(theme.extra.get("borderRadius").map(String::as_str), Some("8"));
        assert!(!theme.extra.contains_key("nested"));
    }

    #[test]
    fn test_seo() {
        let mut config = request();
        let props = prepare_props(&config, &Config::default());
        assert_eq!(props.seo.canonical_url, "https://acme-widgets.reposite.dev");
        assert_eq!(props.seo.keywords, vec!["acme", "widgets"]);
        assert_eq!(props.seo.description, "Acme Widgets - Professional project showcase");

        config.site_name = "!!!".to_string();
        let props = prepare_props(&config, &Config::default());
        assert_eq!(props.seo.canonical_url, "https://site-1.reposite.dev");
    }
}
