//! Conservative minification for HTML, CSS and JavaScript.
//!
//! Every pass is string-aware and leaves content it does not understand
//! untouched. `<pre>` and `<textarea>` bodies are copied verbatim, inline
//! styles and scripts are minified with the CSS/JS passes, and JSON-LD blocks
//! are re-serialized compactly so they remain valid JSON.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::html::script_json;

/// Elements whose body is not ordinary markup.
const RAW_TEXT: [&str; 4] = ["script", "style", "pre", "textarea"];

/// Minify an HTML document.
pub fn minify_html(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < html.len() {
        let Some(rel) = html[pos..].find('<') else {
            push_text(&mut out, &html[pos..]);
            break;
        };
        let lt = pos + rel;
        push_text(&mut out, &html[pos..lt]);

        if lower[lt..].starts_with("<!--") {
            pos = html[lt + 4..]
                .find("-->")
                .map_or(html.len(), |end| lt + 4 + end + 3);
            continue;
        }

        let Some(gt) = tag_end(html, lt) else {
            out.push_str(&html[lt..]);
            break;
        };
        out.push_str(&html[lt..gt]);
        pos = gt;

        let open = &lower[lt..gt];
        if let Some(raw) = RAW_TEXT.iter().find(|name| **name == tag_name(open)) {
            let close = format!("</{raw}");
            let end = lower[pos..].find(&close).map_or(html.len(), |e| pos + e);
            let body = &html[pos..end];
            match *raw {
                "script" => out.push_str(&minify_script(open, body)),
                "style" => out.push_str(&minify_css(body)),
                _ => out.push_str(body),
            }
            pos = end;
        }
    }

    out.trim().to_string()
}

/// Index just past the `>` closing the tag at `lt`, honouring quoted
/// attribute values.
fn tag_end(html: &str, lt: usize) -> Option<usize> {
    let mut quote = None;
    for (i, b) in html.bytes().enumerate().skip(lt + 1) {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i + 1),
            (None, _) => {}
        }
    }
    None
}

fn tag_name(tag: &str) -> &str {
    tag.trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("")
}

/// Collapse whitespace runs in text to a single space.
fn push_text(out: &mut String, text: &str) {
    let mut in_ws = out.ends_with(' ');
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
}

fn minify_script(open_tag: &str, body: &str) -> String {
    if open_tag.contains("application/ld+json") {
        return match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => script_json(&value).unwrap_or_else(|_| body.to_string()),
            Err(err) => {
                tracing::warn!(%err, "JSON-LD block is not valid JSON; left as is");
                body.to_string()
            }
        };
    }
    minify_js(body)
}

/// Characters around which CSS whitespace carries no meaning.
fn css_tight_before(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>' | ':')
}

fn css_tight_after(c: char) -> bool {
    matches!(c, '{' | '}' | ';' | ',' | '>')
}

/// Strip comments and collapse whitespace in a stylesheet.
pub fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut pending_ws = false;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for d in chars.by_ref() {
                    if prev == '*' && d == '/' {
                        break;
                    }
                    prev = d;
                }
                pending_ws = true;
            }
            c if c.is_whitespace() => pending_ws = true,
            _ => {
                if pending_ws {
                    if let Some(prev) = out.chars().last() {
                        if !css_tight_before(prev) && !css_tight_after(c) {
                            out.push(' ');
                        }
                    }
                    pending_ws = false;
                }
                if c == '}' && out.ends_with(';') {
                    out.pop();
                }
                out.push(c);
                if c == '"' || c == '\'' {
                    copy_css_string(&mut chars, c, &mut out);
                }
            }
        }
    }

    out
}

fn copy_css_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
    out: &mut String,
) {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else if c == quote {
            break;
        }
    }
}

/// Properties that still need vendor-prefixed twins, with their prefixes.
const PREFIXED: &[(&str, &[&str])] = &[
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("text-size-adjust", &["-webkit-", "-moz-"]),
    ("user-select", &["-webkit-", "-moz-"]),
];

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = PREFIXED.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(
        r"(^|[{{;\s])({})(\s*:\s*[^;{{}}]*[^;{{}}\s])",
        names.join("|")
    ))
    .expect("vendor prefix pattern is valid")
});

/// Insert vendor-prefixed declarations before unprefixed ones.
pub fn autoprefix(css: &str) -> String {
    PREFIX_RE
        .replace_all(css, |caps: &Captures| {
            let (lead, name, rest) = (&caps[1], &caps[2], &caps[3]);
            let prefixes = PREFIXED
                .iter()
                .find(|(n, _)| *n == name)
                .map_or(&[][..], |(_, p)| *p);

            let mut out = lead.to_string();
            for prefix in prefixes {
                out.push_str(&format!("{prefix}{name}{rest};"));
            }
            out.push_str(name);
            out.push_str(rest);
            out
        })
        .into_owned()
}

/// Characters after which a regex literal may start.
/// Keywords after which a `/` opens a regular expression.
const REGEX_KEYWORDS: [&str; 13] = [
    "return", "typeof", "case", "in", "of", "delete", "void", "throw", "new", "instanceof",
    "do", "else", "yield",
];

/// Whether a `/` after the minified output so far starts a regex literal.
fn regex_may_follow(out: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let Some(prev) = out.chars().last() else {
        return true;
    };
    if is_ident(prev) {
        let word_start = out
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_ident(c))
            .last()
            .map_or(out.len(), |(i, _)| i);
        return REGEX_KEYWORDS.contains(&&out[word_start..]);
    }
    "(,=:[!&|?{};+-*%<>~^".contains(prev)
}

/// Characters around which JS whitespace without a line break can go.
fn js_tight(c: char) -> bool {
    "{}()[];,:=<>!&|?*%".contains(c)
}

/// Strip comments and collapse whitespace in a script.
///
/// String, template and regex literals are copied verbatim. Line breaks are
/// kept wherever removing them could change automatic semicolon insertion.
pub fn minify_js(js: &str) -> String {
    let chars: Vec<char> = js.chars().collect();
    let mut out = String::with_capacity(js.len());
    // `Some(true)` when the pending whitespace contains a line break.
    let mut pending: Option<bool> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => {
                let newline = c == '\n' || c == '\r';
                pending = Some(pending.unwrap_or(false) || newline);
                i += 1;
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                let mut j = i + 2;
                let mut newline = false;
                while j < chars.len() && !(chars[j] == '*' && chars.get(j + 1) == Some(&'/')) {
                    newline |= chars[j] == '\n';
                    j += 1;
                }
                i = (j + 2).min(chars.len());
                pending = Some(pending.unwrap_or(false) || newline);
            }
            _ => {
                let prev = out.chars().last();
                let regex = c == '/' && regex_may_follow(&out);
                if let Some(newline) = pending.take() {
                    push_js_space(&mut out, prev, c, newline);
                }
                i = match c {
                    '\'' | '"' | '`' => copy_literal(&chars, i, &mut out),
                    '/' if regex => copy_regex(&chars, i, &mut out),
                    _ => {
                        out.push(c);
                        i + 1
                    }
                };
            }
        }
    }

    out
}

fn push_js_space(out: &mut String, prev: Option<char>, next: char, newline: bool) {
    let Some(prev) = prev else {
        return;
    };
    if newline {
        if !"{;,([".contains(prev) && !"})],".contains(next) {
            out.push('\n');
        }
    } else if !js_tight(prev) && !js_tight(next) {
        out.push(' ');
    }
}

fn copy_literal(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push(quote);
    let mut j = start + 1;
    while j < chars.len() {
        let c = chars[j];
        out.push(c);
        j += 1;
        if c == '\\' {
            if let Some(&escaped) = chars.get(j) {
                out.push(escaped);
                j += 1;
            }
        } else if c == quote {
            break;
        }
    }
    j
}

fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('/');
    let mut j = start + 1;
    let mut in_class = false;
    while j < chars.len() {
        let c = chars[j];
        if c == '\n' {
            break;
        }
        out.push(c);
        j += 1;
        match c {
            '\\' => {
                if let Some(&escaped) = chars.get(j) {
                    out.push(escaped);
                    j += 1;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break,
            _ => {}
        }
    }
    j
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_collapses_whitespace_and_comments() {
        let html = "<!DOCTYPE html>\n<html>\n  <!-- note -->\n  <body>\n    <p>Hello\n      world</p>\n  </body>\n</html>\n";
        assert_eq!(
            minify_html(html),
            "<!DOCTYPE html> <html> <body> <p>Hello world</p> </body> </html>"
        );
    }

    #[test]
    fn test_html_preserves_pre_and_textarea() {
        let html = "<div>\n  <pre><code>fn main() {\n    x();\n}</code></pre>\n<textarea>  a\n b </textarea></div>";
        let out = minify_html(html);
        assert!(out.contains("<pre><code>fn main() {\n    x();\n}</code></pre>"));
        assert!(out.contains("<textarea>  a\n b </textarea>"));
    }

    #[test]
    fn test_html_keeps_quoted_angle_brackets() {
        let html = r#"<a title="a > b"   href="/x">x</a>"#;
        assert_eq!(minify_html(html), html);
    }

    #[test]
    fn test_json_ld_recompacted() {
        let html = "<script type=\"application/ld+json\">{\n  \"name\": \"A  B\",\n  \"x\": [1, 2]\n}</script>";
        let out = minify_html(html);
        assert_eq!(
            out,
            r#"<script type="application/ld+json">{"name":"A  B","x":[1,2]}</script>"#
        );
    }

    #[test]
    fn test_inline_script_and_style_minified() {
        let html = "<style>\n  body {\n    color: red;\n  }\n</style><script>\n  // hi\n  var a = 1;\n</script>";
        assert_eq!(
            minify_html(html),
            "<style>body{color:red}</style><script>var a=1;</script>"
        );
    }

    #[test]
    fn test_css_minify() {
        let css = "/* base */\n.a  > .b ,\n.c {\n  margin: 0 auto;\n  width: calc(100% - 2px);\n}\n";
        assert_eq!(minify_css(css), ".a>.b,.c{margin:0 auto;width:calc(100% - 2px)}");
    }

    #[test]
    fn test_css_strings_preserved() {
        let css = r#"a::after { content: "/* not a comment */  x"; }"#;
        assert_eq!(minify_css(css), r#"a::after{content:"/* not a comment */  x"}"#);
    }

    #[test]
    fn test_css_media_query_spacing() {
        let css = "@media (max-width: 768px) and (min-width: 100px) {\n  .a { b: c; }\n}";
        assert_eq!(
            minify_css(css),
            "@media (max-width:768px) and (min-width:100px){.a{b:c}}"
        );
    }

    #[test]
    fn test_autoprefix() {
        let css = ".a { user-select: none; }\n.b{backdrop-filter:blur(4px)}";
        let out = autoprefix(css);
        assert!(out.contains("-webkit-user-select: none;-moz-user-select: none;user-select: none;"));
        assert!(out.contains("-webkit-backdrop-filter:blur(4px);backdrop-filter:blur(4px)}"));
    }

    #[test]
    fn test_autoprefix_leaves_prefixed_alone() {
        let css = ".a{-webkit-appearance:none}";
        assert_eq!(autoprefix(css), css);
    }

    #[test]
    fn test_js_strips_comments_keeps_strings() {
        let js = "// top\nconst url = 'http://x.y/*z*/'; /* block */\nconst t = `a // b`;\n";
        assert_eq!(
            minify_js(js),
            "const url='http://x.y/*z*/';const t=`a // b`;"
        );
    }

    #[test]
    fn test_js_keeps_line_breaks_for_asi() {
        let js = "let a = b\nlet c = d\n";
        assert_eq!(minify_js(js), "let a=b\nlet c=d");
    }

    #[test]
    fn test_js_regex_literal() {
        let js = "const re = /https?:\\/\\//g; // url\nx = a / 2;";
        assert_eq!(minify_js(js), "const re=/https?:\\/\\//g;x=a / 2;");
    }

    #[test]
    fn test_js_regex_after_keyword() {
        let js = "function slashes(s) {\n  return /\\/\\//.test(s);\n}\nvar t = typeof /x/;\nvar total = count / 2; // half";
        assert_eq!(
            minify_js(js),
            "function slashes(s){return /\\/\\//.test(s);}\nvar t=typeof /x/;var total=count / 2;"
        );
    }

    #[test]
    fn test_js_block_bodies() {
        let js = "function f(a, b) {\n    return a + b;\n}\n";
        assert_eq!(minify_js(js), "function f(a,b){return a + b;}");
    }
}
