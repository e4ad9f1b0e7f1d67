//! HTML shells around rendered fragments.
//!
//! A shell is a fixed document with `{{ slot }}` markers; `{{ slot? }}` may
//! be left unset and renders as nothing. Slot values are inserted verbatim
//! and never rescanned, so callers escape them first.

use std::collections::HashMap;

use thiserror::Error;

/// Shell filling errors.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A required slot has no value.
    #[error("{shell} shell: slot `{slot}` is not set")]
    MissingSlot { shell: ShellKind, slot: String },

    /// A `{{` marker without its closing `}}`.
    #[error("{shell} shell: unclosed slot marker at byte {offset}")]
    Unclosed { shell: ShellKind, offset: usize },
}

/// Result type for shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// The two page shells of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// `index.html`.
    Document,
    /// A standalone documentation page.
    DocPage,
}

impl ShellKind {
    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Document => DOCUMENT_SHELL,
            Self::DocPage => DOC_PAGE_SHELL,
        }
    }

    /// Fill this shell's slots.
    pub fn fill(self, slots: &Slots) -> Result<String> {
        fill(self, self.source(), slots)
    }
}

impl std::fmt::Display for ShellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::DocPage => "doc-page",
        })
    }
}

/// Slot values for one shell.
#[derive(Debug, Clone, Default)]
pub struct Slots(HashMap<&'static str, String>);

impl Slots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(slot, value.into());
        self
    }

    /// Set `slot` only when `value` is present.
    #[must_use]
    pub fn set_opt(self, slot: &'static str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.set(slot, value),
            None => self,
        }
    }

    fn get(&self, slot: &str) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }
}

fn fill(shell: ShellKind, source: &str, slots: &Slots) -> Result<String> {
    let mut out = String::with_capacity(source.len() * 2);
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let marker = &rest[open + 2..];
        let Some(close) = marker.find("}}") else {
            return Err(ShellError::Unclosed {
                shell,
                offset: source.len() - rest.len() + open,
            });
        };

        let slot = marker[..close].trim();
        let (slot, optional) = match slot.strip_suffix('?') {
            Some(slot) => (slot.trim_end(), true),
            None => (slot, false),
        };
        match slots.get(slot) {
            Some(value) => out.push_str(value),
            None if optional => {}
            None => {
                return Err(ShellError::MissingSlot {
                    shell,
                    slot: slot.to_string(),
                });
            }
        }

        rest = &marker[close + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Main page document.
const DOCUMENT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="{{ viewport }}">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description }}">
    <meta name="keywords" content="{{ keywords }}">
    <meta name="author" content="{{ author }}">
    <meta name="generator" content="{{ generator }}">
    {{ canonical_link? }}

    <!-- Open Graph -->
    <meta property="og:title" content="{{ og_title }}">
    <meta property="og:description" content="{{ og_description }}">
    <meta property="og:type" content="{{ og_type }}">
    {{ og_url? }}
    {{ og_image? }}
    <meta property="og:site_name" content="{{ og_site_name }}">

    <!-- Twitter Card -->
    <meta name="twitter:card" content="{{ twitter_card }}">
    <meta name="twitter:title" content="{{ twitter_title }}">
    <meta name="twitter:description" content="{{ twitter_description }}">
    {{ twitter_creator? }}
    {{ twitter_image? }}

    <!-- JSON-LD -->
    <script type="application/ld+json">{{ json_ld }}</script>

    <link rel="icon" href="/favicon.ico">
    <link rel="stylesheet" href="/assets/style.css">
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link rel="dns-prefetch" href="//fonts.googleapis.com">
</head>
<body>
    {{ content }}

    <script src="/assets/script.js"></script>
    {{ analytics_bootstrap? }}
</body>
</html>
"#;

/// Standalone documentation page.
const DOC_PAGE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description }}">
    <link rel="icon" href="/favicon.ico">
    <link rel="stylesheet" href="/assets/style.css">
</head>
<body>
    <div class="container doc-page">
        <header>
            <h1>{{ heading }}</h1>
            <nav><a href="/">&larr; Back to {{ site_name }}</a></nav>
        </header>
        <main>
            {{ content }}
        </main>
    </div>
</body>
</html>
"#;
