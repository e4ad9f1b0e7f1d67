//! Reposite Parser Library
//!
//! Turns AI-generated Markdown or structured payloads into typed content
//! sections, and renders Markdown to HTML with syntax highlighting.

pub mod markdown;
pub mod normalize;
pub mod syntax;

pub use markdown::{CodeBlock, MarkdownRenderer, Outline, OutlineSection, extract_code_blocks};
pub use normalize::{
    ContentGenerationError, ContentNormalizer, NormalizedContent, RawContent, Result,
};
pub use syntax::SyntaxHighlighter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_then_render() {
        let raw = RawContent::detect("# Demo\n\n## Usage\n```sh\ndemo --run\n```\n");
        let content = ContentNormalizer::new().normalize(&raw, "demo").unwrap();
        let usage = &content.sections[0];

        let html = MarkdownRenderer::new().render(&usage.content);
        assert!(html.contains("code-block"));
        assert_eq!(extract_code_blocks(&usage.content)[0].code, "demo --run");
    }
}
