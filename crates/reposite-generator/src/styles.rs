//! Stylesheet and script assembly.

use std::{fmt::Write, fs, path::PathBuf};

use reposite_core::{SiteFeatures, SiteGenerationConfig};
use tracing::{debug, warn};

use crate::{props::Theme, template::TemplateKind};

/// Outcome of a best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    Ready(T),
    Failed { reason: String },
}

impl<T> Loaded<T> {
    /// Take the value, or log the failure and use `fallback`.
    pub fn or_log(self, what: &str, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Ready(value) => value,
            Self::Failed { reason } => {
                warn!(what, %reason, "best-effort step failed, using fallback");
                fallback()
            }
        }
    }
}

/// Placeholder emitted when a template stylesheet cannot be loaded.
pub const TEMPLATE_CSS_PLACEHOLDER: &str = "/* template stylesheet unavailable */\n";

/// Reset and typography rules.
pub const BASE_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; line-height: 1.6; }
img { max-width: 100%; height: auto; }
.container { max-width: 1200px; margin: 0 auto; padding: 0 20px; }
section { padding: 4rem 0; }
h1, h2, h3 { line-height: 1.2; margin-bottom: 0.75rem; }
p { margin-bottom: 1rem; }
pre { overflow-x: auto; padding: 1rem; border-radius: 6px; }
.btn { display: inline-block; padding: 0.75rem 1.5rem; border-radius: 6px; text-decoration: none; }
.features { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; }
.tech-stack { list-style: none; display: flex; flex-wrap: wrap; gap: 1rem; }
.partners { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; }
.footer { padding: 2rem 0; text-align: center; }
"#;

/// Breakpoint rules appended last.
pub const RESPONSIVE_CSS: &str = r#"@media (max-width: 768px) {
  .container { padding: 0 15px; }
  .hero h1 { font-size: 2rem; }
  .features { grid-template-columns: 1fr; }
  .partners { grid-template-columns: 1fr; }
}
"#;

/// Built-in stylesheet for a template.
pub fn builtin_template_css(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::ModernWeb => {
            ".template-modern-web .hero { padding: 6rem 0; background: var(--primary-color); color: #fff; }\n\
             .template-modern-web .btn-primary { background: var(--accent-color); color: #fff; }\n\
             .template-modern-web .btn-secondary { border: 1px solid #fff; color: #fff; }\n"
        }
        TemplateKind::DeveloperLibrary => {
            ".template-developer-library .hero { padding: 3rem 0; border-bottom: 1px solid #e5e7eb; }\n\
             .template-developer-library .quick-install pre { background: #111827; color: #f9fafb; }\n\
             .template-developer-library .btn-primary { background: var(--primary-color); color: #fff; }\n"
        }
        TemplateKind::TechnicalShowcase => {
            ".template-technical-showcase { background: #0f172a; color: #e2e8f0; }\n\
             .template-technical-showcase .hero { padding: 6rem 0; }\n\
             .template-technical-showcase .tech { border: 1px solid var(--primary-color); padding: 0.5rem 1rem; }\n"
        }
        TemplateKind::CreativeProject => {
            ".template-creative-project .hero { padding: 7rem 0; background: linear-gradient(135deg, var(--primary-color), var(--accent-color)); color: #fff; }\n\
             .template-creative-project .slide { border-radius: 12px; box-shadow: 0 10px 30px rgba(0,0,0,.2); }\n"
        }
        TemplateKind::StartupProduct => {
            ".template-startup-product .hero { padding: 6rem 0; text-align: center; }\n\
             .template-startup-product .cta-banner { background: var(--secondary-color); color: #fff; text-align: center; }\n\
             .template-startup-product .btn-primary { background: var(--accent-color); color: #fff; }\n"
        }
        TemplateKind::MinimalPortfolio => {
            ".template-minimal-portfolio { max-width: 760px; margin: 0 auto; }\n\
             .template-minimal-portfolio .hero { padding: 4rem 0 2rem; }\n\
             .template-minimal-portfolio section { padding: 2rem 0; }\n"
        }
    }
}

/// Custom properties for the resolved theme.
///
/// Values are stripped of characters that could end the declaration or
/// block.
pub fn theme_css(theme: &Theme) -> String {
    let mut css = String::from(":root {\n");
    let vars = [
        ("primary-color", &theme.primary_color),
        ("secondary-color", &theme.secondary_color),
        ("accent-color", &theme.accent_color),
        ("text-color", &theme.text_color),
        ("background-color", &theme.background_color),
        ("font-family", &theme.font_family),
    ];
    for (name, value) in vars {
        let _ = writeln!(css, "  --{name}: {};", sanitize_css_value(value));
    }
    css.push_str("}\nbody { color: var(--text-color); background: var(--background-color); font-family: var(--font-family); }\n");
    css
}

fn sanitize_css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Assembles the site stylesheet.
#[derive(Debug, Clone, Default)]
pub struct StyleAssembler {
    dir: Option<PathBuf>,
}

impl StyleAssembler {
    /// `dir` holds `<template-key>.css` files; built-ins are used when unset.
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Load the template stylesheet.
    pub fn load_template_css(&self, kind: TemplateKind) -> Loaded<String> {
        let Some(dir) = &self.dir else {
            return Loaded::Ready(builtin_template_css(kind).to_string());
        };

        let path = dir.join(format!("{}.css", kind.key()));
        match fs::read_to_string(&path) {
            Ok(css) => {
                debug!(path = %path.display(), "loaded template stylesheet");
                Loaded::Ready(css)
            }
            Err(err) => Loaded::Failed {
                reason: format!("{}: {err}", path.display()),
            },
        }
    }

    /// Base, template, theme and responsive rules, in that order.
    pub fn assemble(&self, kind: TemplateKind, theme: &Theme) -> String {
        let template_css = self
            .load_template_css(kind)
            .or_log("template stylesheet", || TEMPLATE_CSS_PLACEHOLDER.to_string());

        let theme_css = theme_css(theme);

        let mut css = String::with_capacity(4096);
        for part in [BASE_CSS, template_css.as_str(), theme_css.as_str(), RESPONSIVE_CSS] {
            css.push_str(part);
            if !css.ends_with('\n') {
                css.push('\n');
            }
        }
        css
    }
}

const SMOOTH_SCROLL_JS: &str = r##"// Smooth scrolling
document.querySelectorAll('a[href^="#"]').forEach(function (anchor) {
  anchor.addEventListener('click', function (e) {
    var href = this.getAttribute('href');
    if (href.length < 2) { return; }
    var target = document.querySelector(href);
    if (target) {
      e.preventDefault();
      target.scrollIntoView({ behavior: 'smooth' });
    }
  });
});
"##;

const DEMO_JS: &str = r#"// Demo interactions
document.querySelectorAll('.demo-trigger').forEach(function (trigger) {
  trigger.addEventListener('click', function () {
    if (typeof trackEvent === 'function') { trackEvent('demo_click', {}); }
  });
});
"#;

const VIDEO_JS: &str = r#"// Video playback
document.querySelectorAll('video').forEach(function (video) {
  video.addEventListener('play', function () {
    if (typeof trackEvent === 'function') { trackEvent('video_play', { src: video.currentSrc }); }
  });
});
"#;

const SLIDESHOW_JS: &str = r#"// Slideshow
document.querySelectorAll('.slideshow').forEach(function (show) {
  var slides = show.querySelectorAll('.slide');
  if (slides.length < 2) { return; }
  var current = 0;
  slides.forEach(function (s, i) { s.hidden = i !== 0; });
  setInterval(function () {
    slides[current].hidden = true;
    current = (current + 1) % slides.length;
    slides[current].hidden = false;
  }, 5000);
});
"#;

/// Analytics beacon; `site_id` and `endpoint` are embedded as JSON strings.
pub fn analytics_js(site_id: &str, endpoint: &str) -> String {
    let site_id = serde_json::Value::from(site_id).to_string();
    let endpoint = serde_json::Value::from(endpoint).to_string();
    format!(
        r#"// Analytics
function trackEvent(event, data) {{
  fetch({endpoint}, {{
    method: 'POST',
    headers: {{ 'Content-Type': 'application/json' }},
    body: JSON.stringify({{ event: event, data: data, siteId: {site_id} }})
  }}).catch(function () {{}});
}}
trackEvent('page_view', {{ url: window.location.href }});
"#
    )
}

/// Site script: smooth scroll, feature-gated snippets, analytics last.
pub fn assemble_js(config: &SiteGenerationConfig, endpoint: &str) -> String {
    let SiteFeatures {
        include_demo,
        enable_video,
        enable_slideshow,
    } = config.features;

    let mut js = String::from(SMOOTH_SCROLL_JS);
    if include_demo {
        js.push_str(DEMO_JS);
    }
    if enable_video {
        js.push_str(VIDEO_JS);
    }
    if enable_slideshow {
        js.push_str(SLIDESHOW_JS);
    }
    js.push_str(&analytics_js(&config.site_id, endpoint));
    js
}
