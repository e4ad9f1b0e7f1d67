//! Template selection and rendering.
//!
//! Each [`TemplateKind`] maps to a plain function that writes an HTML body
//! fragment from [`TemplateProps`]. Fragments need no client-side runtime.

use std::fmt::{self, Write};

use reposite_core::text::escape_html;
use thiserror::Error;
use tracing::warn;

use crate::props::{
    DemoProps, FeatureProps, FooterProps, HeroProps, Link, PartnerProps, SectionProps,
    TechProps, TemplateProps, UsageProps,
};

/// Element ids every template writes for its fixed blocks.
pub const FIXED_SECTION_IDS: [&str; 7] = [
    "project",
    "features",
    "tech-stack",
    "demo",
    "installation",
    "docs",
    "partners",
];

/// Rendering failure, fatal for the current generation attempt.
#[derive(Debug, Error)]
#[error("failed to render template `{template}`: {message}")]
pub struct TemplateRenderError {
    /// Key of the template that failed.
    pub template: String,
    /// Underlying cause.
    pub message: String,
}

/// Result type for template rendering.
pub type Result<T> = std::result::Result<T, TemplateRenderError>;

/// The closed set of page templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    #[default]
    ModernWeb,
    DeveloperLibrary,
    TechnicalShowcase,
    CreativeProject,
    StartupProduct,
    MinimalPortfolio,
}

impl TemplateKind {
    /// Registry key, e.g. `modern-web`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ModernWeb => "modern-web",
            Self::DeveloperLibrary => "developer-library",
            Self::TechnicalShowcase => "technical-showcase",
            Self::CreativeProject => "creative-project",
            Self::StartupProduct => "startup-product",
            Self::MinimalPortfolio => "minimal-portfolio",
        }
    }

    /// Exact key lookup.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.key() == key)
    }

    /// Every template, in registry order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::ModernWeb,
            Self::DeveloperLibrary,
            Self::TechnicalShowcase,
            Self::CreativeProject,
            Self::StartupProduct,
            Self::MinimalPortfolio,
        ]
    }

    fn renderer(self) -> RenderFn {
        match self {
            Self::ModernWeb => render_modern_web,
            Self::DeveloperLibrary => render_developer_library,
            Self::TechnicalShowcase => render_technical_showcase,
            Self::CreativeProject => render_creative_project,
            Self::StartupProduct => render_startup_product,
            Self::MinimalPortfolio => render_minimal_portfolio,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

type RenderFn = fn(&TemplateProps, &mut String) -> fmt::Result;

/// Outcome of a template lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSelection {
    pub kind: TemplateKind,
    /// True when the requested key was missing or unknown.
    pub fell_back: bool,
}

/// Resolve a template key. Unknown or missing keys resolve to `modern-web`
/// with a warning.
pub fn select_template(key: Option<&str>) -> TemplateSelection {
    match key.map(str::trim).and_then(TemplateKind::from_key) {
        Some(kind) => TemplateSelection {
            kind,
            fell_back: false,
        },
        None => {
            warn!(
                requested = key.unwrap_or("<none>"),
                fallback = TemplateKind::ModernWeb.key(),
                "template not found, using fallback"
            );
            TemplateSelection {
                kind: TemplateKind::ModernWeb,
                fell_back: true,
            }
        }
    }
}

/// Render the body fragment for `kind`.
pub fn render(kind: TemplateKind, props: &TemplateProps) -> Result<String> {
    let mut html = String::with_capacity(16 * 1024);
    (kind.renderer())(props, &mut html).map_err(|e| TemplateRenderError {
        template: kind.key().to_string(),
        message: e.to_string(),
    })?;
    Ok(html)
}

// Layouts

fn render_modern_web(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::ModernWeb)?;
    hero(out, &p.hero, "hero")?;
    features(out, &p.features, "Features")?;
    tech_stack(out, &p.tech_stack, "Built With")?;
    demo(out, p.demo.as_ref())?;
    usage(out, p.usage.as_ref())?;
    sections(out, &p.sections)?;
    doc_links(out, &p.doc_links)?;
    partners(out, &p.partners)?;
    footer(out, &p.footer)?;
    close_site(out)
}

fn render_developer_library(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::DeveloperLibrary)?;
    hero(out, &p.hero, "hero hero-compact")?;
    quick_install(out, p.usage.as_ref())?;
    usage(out, p.usage.as_ref())?;
    features(out, &p.features, "Why use it")?;
    doc_links(out, &p.doc_links)?;
    tech_stack(out, &p.tech_stack, "Dependencies")?;
    sections(out, &p.sections)?;
    demo(out, p.demo.as_ref())?;
    partners(out, &p.partners)?;
    footer(out, &p.footer)?;
    close_site(out)
}

fn render_technical_showcase(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::TechnicalShowcase)?;
    hero(out, &p.hero, "hero hero-dark")?;
    tech_stack(out, &p.tech_stack, "Architecture")?;
    features(out, &p.features, "Capabilities")?;
    sections(out, &p.sections)?;
    usage(out, p.usage.as_ref())?;
    demo(out, p.demo.as_ref())?;
    doc_links(out, &p.doc_links)?;
    partners(out, &p.partners)?;
    footer(out, &p.footer)?;
    close_site(out)
}

fn render_creative_project(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::CreativeProject)?;
    hero(out, &p.hero, "hero hero-gradient")?;
    demo(out, p.demo.as_ref())?;
    features(out, &p.features, "Highlights")?;
    sections(out, &p.sections)?;
    tech_stack(out, &p.tech_stack, "Made With")?;
    usage(out, p.usage.as_ref())?;
    doc_links(out, &p.doc_links)?;
    partners(out, &p.partners)?;
    footer(out, &p.footer)?;
    close_site(out)
}

fn render_startup_product(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::StartupProduct)?;
    hero(out, &p.hero, "hero hero-centered")?;
    features(out, &p.features, "Everything you need")?;
    demo(out, p.demo.as_ref())?;
    partners(out, &p.partners)?;
    tech_stack(out, &p.tech_stack, "Powered By")?;
    usage(out, p.usage.as_ref())?;
    sections(out, &p.sections)?;
    doc_links(out, &p.doc_links)?;
    call_to_action(out, &p.hero)?;
    footer(out, &p.footer)?;
    close_site(out)
}

fn render_minimal_portfolio(p: &TemplateProps, out: &mut String) -> fmt::Result {
    open_site(out, TemplateKind::MinimalPortfolio)?;
    hero(out, &p.hero, "hero hero-minimal")?;
    sections(out, &p.sections)?;
    features(out, &p.features, "Features")?;
    usage(out, p.usage.as_ref())?;
    tech_stack(out, &p.tech_stack, "Stack")?;
    doc_links(out, &p.doc_links)?;
    footer(out, &p.footer)?;
    close_site(out)
}

// Fragments

fn open_site(out: &mut String, kind: TemplateKind) -> fmt::Result {
    writeln!(out, r#"<div class="site template-{}">"#, kind.key())
}

fn close_site(out: &mut String) -> fmt::Result {
    writeln!(out, "</div>")
}

fn link(out: &mut String, l: &Link, class: &str) -> fmt::Result {
    write!(
        out,
        r#"<a class="{class}" href="{}">{}</a>"#,
        escape_html(&l.href),
        escape_html(&l.text)
    )
}

fn hero(out: &mut String, hero: &HeroProps, class: &str) -> fmt::Result {
    writeln!(out, r#"<header class="{class}" id="project">"#)?;
    writeln!(out, r#"<div class="container">"#)?;
    writeln!(out, "<h1>{}</h1>", escape_html(&hero.title))?;
    writeln!(out, r#"<p class="subtitle">{}</p>"#, escape_html(&hero.subtitle))?;
    if !hero.description_html.is_empty() {
        writeln!(out, r#"<div class="hero-description">{}</div>"#, hero.description_html)?;
    }
    write!(out, r#"<div class="cta">"#)?;
    link(out, &hero.primary_cta, "btn btn-primary")?;
    link(out, &hero.secondary_cta, "btn btn-secondary")?;
    writeln!(out, "</div>")?;
    writeln!(out, "</div>\n</header>")
}

fn call_to_action(out: &mut String, hero: &HeroProps) -> fmt::Result {
    writeln!(out, r#"<section class="cta-banner"><div class="container">"#)?;
    writeln!(out, "<h2>Ready to try {}?</h2>", escape_html(&hero.title))?;
    link(out, &hero.primary_cta, "btn btn-primary")?;
    writeln!(out, "\n</div></section>")
}

fn features(out: &mut String, features: &[FeatureProps], heading: &str) -> fmt::Result {
    if features.is_empty() {
        return Ok(());
    }
    writeln!(out, r#"<section id="features"><div class="container">"#)?;
    writeln!(out, "<h2>{}</h2>", escape_html(heading))?;
    writeln!(out, r#"<div class="features">"#)?;
    for f in features {
        writeln!(
            out,
            r#"<div class="feature"><span class="icon icon-{}" aria-hidden="true"></span><h3>{}</h3><p>{}</p></div>"#,
            escape_html(&f.icon),
            escape_html(&f.title),
            escape_html(&f.description)
        )?;
    }
    writeln!(out, "</div>\n</div></section>")
}

fn tech_stack(out: &mut String, tech: &[TechProps], heading: &str) -> fmt::Result {
    if tech.is_empty() {
        return Ok(());
    }
    writeln!(out, r#"<section id="tech-stack"><div class="container">"#)?;
    writeln!(out, "<h2>{}</h2>", escape_html(heading))?;
    writeln!(out, r#"<ul class="tech-stack">"#)?;
    for t in tech {
        writeln!(
            out,
            r#"<li class="tech"><span class="icon icon-{}" aria-hidden="true"></span><strong>{}</strong> <span>{}</span></li>"#,
            escape_html(&t.icon),
            escape_html(&t.name),
            escape_html(&t.description)
        )?;
    }
    writeln!(out, "</ul>\n</div></section>")
}

fn demo(out: &mut String, demo: Option<&DemoProps>) -> fmt::Result {
    let Some(demo) = demo else {
        return Ok(());
    };
    writeln!(out, r#"<section id="demo"><div class="container">"#)?;
    writeln!(out, "<h2>{}</h2>", escape_html(&demo.title))?;
    writeln!(out, "<p>{}</p>", escape_html(&demo.description))?;
    writeln!(out, r#"<div class="screenshots slideshow">"#)?;
    for (i, src) in demo.screenshots.iter().enumerate() {
        writeln!(
            out,
            r#"<img class="slide" src="{}" alt="Screenshot {}" loading="lazy">"#,
            escape_html(src),
            i + 1
        )?;
    }
    writeln!(out, "</div>")?;
    writeln!(
        out,
        r#"<a class="btn btn-primary demo-trigger" href="{}">Launch demo</a>"#,
        escape_html(&demo.demo_url)
    )?;
    writeln!(out, "</div></section>")
}

fn quick_install(out: &mut String, usage: Option<&UsageProps>) -> fmt::Result {
    let Some(block) = usage.and_then(|u| u.code_blocks.first()) else {
        return Ok(());
    };
    writeln!(
        out,
        r#"<div class="container quick-install"><pre><code class="language-{}">{}</code></pre></div>"#,
        escape_html(&block.language),
        escape_html(&block.code)
    )
}

fn usage(out: &mut String, usage: Option<&UsageProps>) -> fmt::Result {
    let Some(usage) = usage else {
        return Ok(());
    };
    writeln!(out, r#"<section id="installation" class="usage"><div class="container">"#)?;
    writeln!(out, "<h2>{}</h2>", escape_html(&usage.title))?;
    writeln!(out, "{}", usage.html)?;
    writeln!(out, "</div></section>")
}

fn sections(out: &mut String, sections: &[SectionProps]) -> fmt::Result {
    for s in sections {
        writeln!(
            out,
            r#"<section id="{}" class="content-section section-{}"><div class="container">"#,
            escape_html(&s.id),
            s.section_type.as_str()
        )?;
        writeln!(out, "<h2>{}</h2>", escape_html(&s.title))?;
        writeln!(out, "{}", s.html)?;
        writeln!(out, "</div></section>")?;
    }
    Ok(())
}

fn doc_links(out: &mut String, links: &[Link]) -> fmt::Result {
    if links.is_empty() {
        return Ok(());
    }
    writeln!(out, r#"<section id="docs"><div class="container">"#)?;
    writeln!(out, "<h2>Documentation</h2>")?;
    writeln!(out, r#"<ul class="doc-links">"#)?;
    for l in links {
        write!(out, "<li>")?;
        link(out, l, "doc-link")?;
        writeln!(out, "</li>")?;
    }
    writeln!(out, "</ul>\n</div></section>")
}

fn partners(out: &mut String, partners: &[PartnerProps]) -> fmt::Result {
    if partners.is_empty() {
        return Ok(());
    }
    writeln!(out, r#"<section id="partners"><div class="container">"#)?;
    writeln!(out, "<h2>Recommended Tools</h2>")?;
    writeln!(out, r#"<div class="partners">"#)?;
    for p in partners {
        writeln!(
            out,
            r#"<div class="partner"><img src="{}" alt="{} logo" loading="lazy"><h3>{}</h3><p>{}</p><a class="btn" href="{}" rel="sponsored noopener" target="_blank">{}</a></div>"#,
            escape_html(&p.logo),
            escape_html(&p.name),
            escape_html(&p.name),
            escape_html(&p.description),
            escape_html(&p.url),
            escape_html(&p.cta_text)
        )?;
    }
    writeln!(out, "</div>\n</div></section>")
}

fn footer(out: &mut String, footer: &FooterProps) -> fmt::Result {
    writeln!(out, r#"<footer class="footer"><div class="container">"#)?;
    writeln!(out, "<p>{}</p>", escape_html(&footer.text))?;
    write!(out, "<nav>")?;
    for l in &footer.links {
        link(out, l, "footer-link")?;
    }
    writeln!(out, "</nav>")?;
    writeln!(out, "</div></footer>")
}
