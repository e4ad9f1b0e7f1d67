//! Markdown rendering and structure extraction using pulldown-cmark.
//!
//! Raw HTML embedded in Markdown is escaped rather than passed through, since
//! the Markdown comes from an AI model and is interpolated into a published
//! page.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use reposite_core::text::{escape_html, slugify};
use serde::{Deserialize, Serialize};

use crate::syntax::SyntaxHighlighter;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Markdown to HTML renderer with syntax highlighting.
#[derive(Debug)]
pub struct MarkdownRenderer {
    highlighter: SyntaxHighlighter,
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the default syntax theme.
    pub fn new() -> Self {
        Self::with_highlighter(SyntaxHighlighter::default())
    }

    /// Create a renderer with a custom highlighter.
    pub fn with_highlighter(highlighter: SyntaxHighlighter) -> Self {
        Self {
            highlighter,
            options: markdown_options(),
        }
    }

    /// Render Markdown to an HTML fragment.
    pub fn render(&self, markdown: &str) -> String {
        let mut html = String::with_capacity(markdown.len() * 2);
        let mut heading: Option<(HeadingLevel, String, String)> = None;
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut image: Option<(String, String, String)> = None;

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some((level, id.map(|i| i.to_string()).unwrap_or_default(), String::new()));
                }

                Event::End(TagEnd::Heading(level)) => {
                    if let Some((_, explicit_id, inner)) = heading.take() {
                        let id = if explicit_id.is_empty() {
                            slugify(&strip_tags(&inner))
                        } else {
                            explicit_id
                        };
                        let lvl = level as u8;
                        if id.is_empty() {
                            html.push_str(&format!("<h{lvl}>{inner}</h{lvl}>\n"));
                        } else {
                            html.push_str(&format!(
                                "<h{lvl} id=\"{}\">{inner}</h{lvl}>\n",
                                escape_html(&id)
                            ));
                        }
                    }
                }

                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }

                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        html.push_str(&self.highlighter.highlight(&code, lang.as_deref()));
                        html.push('\n');
                    }
                }

                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some((dest_url.to_string(), title.to_string(), String::new()));
                }

                Event::End(TagEnd::Image) => {
                    if let Some((src, title, alt)) = image.take() {
                        let title_attr = if title.is_empty() {
                            String::new()
                        } else {
                            format!(" title=\"{}\"", escape_html(&title))
                        };
                        push_to(
                            &mut heading,
                            &mut html,
                            &format!(
                                "<img src=\"{}\" alt=\"{}\"{title_attr} loading=\"lazy\" />",
                                escape_html(&src),
                                escape_html(&alt)
                            ),
                        );
                    }
                }

                Event::Text(text) => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    } else if let Some((_, _, alt)) = image.as_mut() {
                        alt.push_str(&text);
                    } else {
                        push_to(&mut heading, &mut html, &escape_html(&text));
                    }
                }

                Event::Code(code) => {
                    if let Some((_, _, alt)) = image.as_mut() {
                        alt.push_str(&code);
                    } else {
                        push_to(
                            &mut heading,
                            &mut html,
                            &format!("<code>{}</code>", escape_html(&code)),
                        );
                    }
                }

                Event::Html(raw) | Event::InlineHtml(raw) => {
                    push_to(&mut heading, &mut html, &escape_html(&raw));
                }

                Event::SoftBreak => push_to(&mut heading, &mut html, "\n"),
                Event::HardBreak => push_to(&mut heading, &mut html, "<br />\n"),
                Event::Rule => html.push_str("<hr />\n"),

                Event::FootnoteReference(name) => {
                    let name = escape_html(&name);
                    push_to(
                        &mut heading,
                        &mut html,
                        &format!(
                            "<sup class=\"footnote-ref\"><a href=\"#fn-{name}\">[{name}]</a></sup>"
                        ),
                    );
                }

                Event::TaskListMarker(checked) => {
                    html.push_str(if checked {
                        "<input type=\"checkbox\" checked disabled /> "
                    } else {
                        "<input type=\"checkbox\" disabled /> "
                    });
                }

                Event::InlineMath(math) => push_to(
                    &mut heading,
                    &mut html,
                    &format!("<span class=\"math inline\">{}</span>", escape_html(&math)),
                ),

                Event::DisplayMath(math) => {
                    html.push_str(&format!(
                        "<div class=\"math display\">{}</div>",
                        escape_html(&math)
                    ));
                }

                // Alt text is plain; markup inside an image is dropped.
                Event::Start(_) | Event::End(_) if image.is_some() => {}

                Event::Start(tag) => {
                    let open = tag_to_html_start(&tag);
                    push_to(&mut heading, &mut html, &open);
                }

                Event::End(tag) => {
                    let close = tag_to_html_end(&tag);
                    push_to(&mut heading, &mut html, &close);
                }
            }
        }

        html
    }
}

/// Append to the open heading buffer if there is one, otherwise to `html`.
fn push_to(heading: &mut Option<(HeadingLevel, String, String)>, html: &mut String, s: &str) {
    match heading {
        Some((_, _, inner)) => inner.push_str(s),
        None => html.push_str(s),
    }
}

fn tag_to_html_start(tag: &Tag) -> String {
    match tag {
        Tag::Paragraph => "<p>".to_string(),
        Tag::BlockQuote(_) => "<blockquote>\n".to_string(),
        Tag::List(Some(1)) => "<ol>\n".to_string(),
        Tag::List(Some(start)) => format!("<ol start=\"{start}\">\n"),
        Tag::List(None) => "<ul>\n".to_string(),
        Tag::Item => "<li>".to_string(),
        Tag::FootnoteDefinition(name) => {
            format!("<div class=\"footnote\" id=\"fn-{}\">", escape_html(name))
        }
        Tag::Table(_) => "<table>\n".to_string(),
        Tag::TableHead => "<thead><tr>".to_string(),
        Tag::TableRow => "<tr>".to_string(),
        Tag::TableCell => "<td>".to_string(),
        Tag::Emphasis => "<em>".to_string(),
        Tag::Strong => "<strong>".to_string(),
        Tag::Strikethrough => "<del>".to_string(),
        Tag::Link {
            dest_url, title, ..
        } => {
            let title_attr = if title.is_empty() {
                String::new()
            } else {
                format!(" title=\"{}\"", escape_html(title))
            };
            format!("<a href=\"{}\"{title_attr}>", escape_html(dest_url))
        }
        Tag::DefinitionList => "<dl>\n".to_string(),
        Tag::DefinitionListTitle => "<dt>".to_string(),
        Tag::DefinitionListDefinition => "<dd>".to_string(),
        Tag::Superscript => "<sup>".to_string(),
        Tag::Subscript => "<sub>".to_string(),
        Tag::Heading { .. }
        | Tag::CodeBlock(_)
        | Tag::Image { .. }
        | Tag::HtmlBlock
        | Tag::MetadataBlock(_) => String::new(),
    }
}

fn tag_to_html_end(tag: &TagEnd) -> String {
    match tag {
        TagEnd::Paragraph => "</p>\n".to_string(),
        TagEnd::BlockQuote(_) => "</blockquote>\n".to_string(),
        TagEnd::List(true) => "</ol>\n".to_string(),
        TagEnd::List(false) => "</ul>\n".to_string(),
        TagEnd::Item => "</li>\n".to_string(),
        TagEnd::FootnoteDefinition => "</div>\n".to_string(),
        TagEnd::Table => "</table>\n".to_string(),
        TagEnd::TableHead => "</tr></thead>\n".to_string(),
        TagEnd::TableRow => "</tr>\n".to_string(),
        TagEnd::TableCell => "</td>".to_string(),
        TagEnd::Emphasis => "</em>".to_string(),
        TagEnd::Strong => "</strong>".to_string(),
        TagEnd::Strikethrough => "</del>".to_string(),
        TagEnd::Link => "</a>".to_string(),
        TagEnd::DefinitionList => "</dl>\n".to_string(),
        TagEnd::DefinitionListTitle => "</dt>\n".to_string(),
        TagEnd::DefinitionListDefinition => "</dd>\n".to_string(),
        TagEnd::Superscript => "</sup>".to_string(),
        TagEnd::Subscript => "</sub>".to_string(),
        TagEnd::Heading(_)
        | TagEnd::CodeBlock
        | TagEnd::Image
        | TagEnd::HtmlBlock
        | TagEnd::MetadataBlock(_) => String::new(),
    }
}

/// Remove tags from an already-rendered inline fragment.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// One `##` block of a Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSection {
    /// Heading text as plain text.
    pub title: String,
    /// Markdown between this heading and the next level-2 heading.
    pub body: String,
}

/// Heading structure of a Markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// Text of the first H1 appearing before any level-2 heading.
    pub title: Option<String>,
    /// Markdown between the title (or document start) and the first section.
    pub preamble: String,
    /// Level-2 sections in source order.
    pub sections: Vec<OutlineSection>,
}

/// Split a Markdown document on its level-2 headings.
///
/// Only top-level ATX `##` headings start a section. Headings are located
/// with the CommonMark parser, so `##` lines inside fenced code, block quotes
/// or list items never split, and setext underlines are not sections.
pub fn outline(markdown: &str) -> Outline {
    struct Boundary {
        title: String,
        start: usize,
        body_start: usize,
    }

    let mut title: Option<String> = None;
    let mut title_end = 0;
    let mut boundaries: Vec<Boundary> = Vec::new();
    // Open non-heading tags; a heading at depth 0 is top-level.
    let mut depth = 0usize;
    let mut heading: Option<(String, bool)> = None;

    for (event, range) in Parser::new_ext(markdown, markdown_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some((String::new(), depth == 0)),
            Event::End(TagEnd::Heading(level)) => {
                let Some((text, top_level)) = heading.take() else {
                    continue;
                };
                if !top_level {
                    continue;
                }
                let text = text.trim().to_string();
                match level {
                    HeadingLevel::H1 if title.is_none() && boundaries.is_empty() => {
                        title = Some(text).filter(|t| !t.is_empty());
                        title_end = range.end;
                    }
                    HeadingLevel::H2 if is_atx(markdown, range.start) => {
                        boundaries.push(Boundary {
                            title: text,
                            start: range.start,
                            body_start: range.end,
                        });
                    }
                    _ => {}
                }
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => {
                if let Some((buf, _)) = heading.as_mut() {
                    buf.push_str(&text);
                }
            }
            _ => {}
        }
    }

    let preamble_end = boundaries.first().map_or(markdown.len(), |b| b.start);
    let preamble = markdown
        .get(title_end.min(preamble_end)..preamble_end)
        .unwrap_or_default()
        .trim()
        .to_string();

    let sections = boundaries
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let end = boundaries.get(i + 1).map_or(markdown.len(), |next| next.start);
            OutlineSection {
                title: b.title.clone(),
                body: markdown
                    .get(b.body_start.min(end)..end)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            }
        })
        .collect();

    Outline {
        title,
        preamble,
        sections,
    }
}

/// Whether the heading at `offset` is written as `## Title`.
fn is_atx(markdown: &str, offset: usize) -> bool {
    let Some(rest) = markdown.get(offset..) else {
        return false;
    };
    rest.trim_start_matches(' ')
        .strip_prefix("##")
        .is_some_and(|after| after.is_empty() || after.starts_with([' ', '\t', '\n', '\r']))
}

/// Plain text of the top-level list items of a Markdown fragment.
pub fn list_items(markdown: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut list_depth = 0usize;
    let mut current: Option<String> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::Start(Tag::Item) if list_depth == 1 => current = Some(String::new()),
            Event::End(TagEnd::Item) if list_depth == 1 => {
                if let Some(text) = current.take() {
                    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !text.is_empty() {
                        items.push(text);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) if list_depth == 1 => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak if list_depth == 1 => {
                if let Some(buf) = current.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    items
}

/// Plain text of the first paragraph outside lists and block quotes.
pub fn first_paragraph(markdown: &str) -> Option<String> {
    let mut nesting = 0usize;
    let mut current: Option<String> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::List(_) | Tag::BlockQuote(_) | Tag::Table(_)) => nesting += 1,
            Event::End(TagEnd::List(_) | TagEnd::BlockQuote(_) | TagEnd::Table) => {
                nesting = nesting.saturating_sub(1);
            }
            Event::Start(Tag::Paragraph) if nesting == 0 => current = Some(String::new()),
            Event::End(TagEnd::Paragraph) if nesting == 0 => {
                if let Some(text) = current.take() {
                    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(buf) = current.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    None
}

/// A fenced code block lifted out of Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Info-string language, `text` when absent.
    pub language: String,
    /// Code with surrounding whitespace trimmed.
    pub code: String,
}

/// Fenced code blocks of a Markdown fragment, in source order.
pub fn extract_code_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info
                    .split_whitespace()
                    .next()
                    .filter(|l| !l.is_empty())
                    .unwrap_or("text")
                    .to_string();
                current = Some(CodeBlock {
                    language,
                    code: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut block) = current.take() {
                    block.code = block.code.trim().to_string();
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}
