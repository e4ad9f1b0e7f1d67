//! Syntax highlighting for fenced code blocks.

use reposite_core::text::escape_html;
use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::{SyntaxReference, SyntaxSet},
};

/// Theme used when none is requested.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax highlighter backed by syntect's bundled grammars and themes.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter using `theme`, falling back to [`DEFAULT_THEME`]
    /// when the name is unknown.
    pub fn new(theme: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme = if theme_set.themes.contains_key(theme) {
            theme.to_string()
        } else {
            tracing::warn!(theme, fallback = DEFAULT_THEME, "unknown syntax theme");
            DEFAULT_THEME.to_string()
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme,
        }
    }

    /// Name of the active theme.
    pub fn theme_name(&self) -> &str {
        &self.theme
    }

    /// Whether a grammar exists for the language token (e.g. `rust`, `sh`).
    pub fn supports(&self, lang: &str) -> bool {
        self.syntax_set.find_syntax_by_token(lang).is_some()
    }

    /// Highlight a code block, wrapped in a `div.code-block` carrying the
    /// language label.
    ///
    /// Unknown languages and highlighter failures produce an escaped
    /// `<pre><code>` block instead.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let label = lang.filter(|l| !l.is_empty()).unwrap_or("text");

        let inner = match (self.syntax_for(lang), self.active_theme()) {
            (Some(syntax), Some(theme)) => {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                    .unwrap_or_else(|err| {
                        tracing::debug!(%err, lang = label, "highlighting failed");
                        plain_block(code, label)
                    })
            }
            _ => plain_block(code, label),
        };

        format!(
            r#"<div class="code-block" data-lang="{}">{inner}</div>"#,
            escape_html(label)
        )
    }

    fn syntax_for(&self, lang: Option<&str>) -> Option<&SyntaxReference> {
        lang.and_then(|l| self.syntax_set.find_syntax_by_token(l))
    }

    fn active_theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.values().next())
    }
}

fn plain_block(code: &str, label: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        escape_html(label),
        escape_html(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust() {
        let highlighter = SyntaxHighlighter::default();
        let html = highlighter.highlight("fn main() {}\n", Some("rust"));

        assert!(html.starts_with(r#"<div class="code-block" data-lang="rust">"#));
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_escaped() {
        let highlighter = SyntaxHighlighter::default();
        let html = highlighter.highlight("<b>x</b>", Some("no_such_lang"));

        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(html.contains("language-no_such_lang"));
    }

    #[test]
    fn test_missing_language_labelled_text() {
        let highlighter = SyntaxHighlighter::default();
        let html = highlighter.highlight("plain", None);
        assert!(html.contains(r#"data-lang="text""#));
        assert!(html.contains("plain"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let highlighter = SyntaxHighlighter::new("not-a-theme");
        assert_eq!(highlighter.theme_name(), DEFAULT_THEME);
        assert!(highlighter.supports("rust"));
    }
}
