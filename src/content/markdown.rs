//! Markdown rendering with syntax highlighting and callout blocks

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::escape_html;

lazy_static! {
    static ref CALLOUT_OPEN: Regex = Regex::new(r"<Callout\b([^>]*)>").unwrap();
    static ref CALLOUT_CLOSE: Regex = Regex::new(r"</Callout\s*>").unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

const CALLOUT_TYPES: [&str; 3] = ["info", "warning", "success"];

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let source = expand_callouts(markdown);
        let parser = Parser::new_ext(&source, parser_options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|lang| !lang.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let block = self.code_block(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlighted code wrapped with a copy button labelled by language
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        format!(
            r#"<div class="code-block"><button class="code-block-copy" type="button" data-label="{lang}">{lang}</button>{body}</div>"#,
            lang = escape_html(lang),
            body = self.highlight_code(code, lang)
        )
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted =
            theme.and_then(|t| highlighted_html_for_string(code, &self.syntax_set, syntax, t).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                self.add_line_numbers(&highlighted, code.lines().count(), lang)
            }
            Some(highlighted) => highlighted,
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(code)
            ),
        }
    }

    /// Add a gutter with one number per source line
    fn add_line_numbers(&self, highlighted: &str, line_count: usize, lang: &str) -> String {
        let gutter = (1..=line_count.max(1))
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            escape_html(lang),
            gutter,
            highlighted
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_GFM
}

/// Visible text of a markdown document, with raw HTML dropped
///
/// The result is unescaped; callers escape it for their output format.
pub fn plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Replace `<Callout>` components with plain HTML asides
///
/// Fenced code blocks and inline code spans are left alone.
fn expand_callouts(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut prose = String::new();
    let mut fence: Option<(char, usize)> = None;

    for line in markdown.split_inclusive('\n') {
        match fence {
            Some((ch, len)) => {
                out.push_str(line);
                if closes_fence(line, ch, len) {
                    fence = None;
                }
            }
            None => match opening_fence(line) {
                Some(open) => {
                    out.push_str(&expand_outside_code_spans(&prose));
                    prose.clear();
                    out.push_str(line);
                    fence = Some(open);
                }
                None => prose.push_str(line),
            },
        }
    }

    out.push_str(&expand_outside_code_spans(&prose));
    out
}

/// Strip up to three spaces of indentation, `None` for indented code
fn fence_indent(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    (line.len() - trimmed.len() <= 3).then_some(trimmed)
}

/// Fence character and length of a ``` or ~~~ opening line
fn opening_fence(line: &str) -> Option<(char, usize)> {
    let trimmed = fence_indent(line)?;
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    // Backtick fences cannot carry backticks in the info string
    if ch == '`' && trimmed[len..].contains('`') {
        return None;
    }
    Some((ch, len))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    let Some(trimmed) = fence_indent(line) else {
        return false;
    };
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    run >= len && trimmed[run..].trim().is_empty()
}

/// Expand callouts in text, skipping backtick code spans
fn expand_outside_code_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        let run = rest[start..].bytes().take_while(|b| *b == b'`').count();
        let after = &rest[start + run..];
        match closing_backticks(after, run) {
            Some(end) => {
                let span_end = start + run + end + run;
                out.push_str(&replace_callouts(&rest[..start]));
                out.push_str(&rest[start..span_end]);
                rest = &rest[span_end..];
            }
            None => {
                // An unmatched run is literal text
                out.push_str(&replace_callouts(&rest[..start + run]));
                rest = after;
            }
        }
    }

    out.push_str(&replace_callouts(rest));
    out
}

/// Offset of a backtick run of exactly `run` characters
fn closing_backticks(text: &str, run: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let len = bytes[i..].iter().take_while(|b| **b == b'`').count();
            if len == run {
                return Some(i);
            }
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

fn replace_callouts(text: &str) -> String {
    let opened = CALLOUT_OPEN.replace_all(text, |caps: &Captures| {
        let mut kind = "info".to_string();
        let mut title = None;
        for attr in ATTRIBUTE.captures_iter(&caps[1]) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match &attr[1] {
                "type" if CALLOUT_TYPES.contains(&value) => kind = value.to_string(),
                "title" if !value.is_empty() => title = Some(value.to_string()),
                _ => {}
            }
        }

        let mut html = format!("\n\n<aside class=\"callout callout-{}\">\n", kind);
        if let Some(title) = title {
            html.push_str(&format!(
                "<p class=\"callout-title\">{}</p>\n",
                escape_html(&title)
            ));
        }
        html.push_str("<div>\n\n");
        html
    });

    CALLOUT_CLOSE
        .replace_all(&opened, "\n\n</div>\n</aside>\n\n")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"class="code-block""#));
        assert!(html.contains(r#"data-label="rust">rust</button>"#));
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_code_block_without_language() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\nplain <text>\n```");
        assert!(html.contains(">text</button>"));
        assert!(!html.contains("<text>"));
    }

    #[test]
    fn test_plain_text() {
        let md = "# Title\n\nTom &amp; Jerry <3 and `a<b>`\nnext <b>bold</b>\n\n<div>hidden</div>\n\n- one\n- two\n";
        let text = plain_text(md);
        assert_eq!(
            text.split_whitespace().collect::<Vec<_>>().join(" "),
            "Title Tom & Jerry <3 and a<b> next bold one two"
        );
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", true);
        let html = renderer.render("```python\na = 1\nb = 2\n```");
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
        assert_eq!(html.matches(r#"class="line-number""#).count(), 2);
        assert!(!html.contains(r#"<span class="line-number">3</span>"#));

        let html = renderer.render("```\none\n```");
        assert_eq!(html.matches(r#"class="line-number""#).count(), 1);
        assert!(html.contains(r#"<td class="code"><pre"#));
    }

    #[test]
    fn test_render_callout() {
        let renderer = MarkdownRenderer::new();
        let md = "Intro\n\n<Callout type=\"warning\" title=\"Heads & up\">\nMind the **gap**.\n</Callout>\n";
        let html = renderer.render(md);
        assert!(html.contains(r#"<aside class="callout callout-warning">"#));
        assert!(html.contains(r#"<p class="callout-title">Heads &amp; up</p>"#));
        assert!(html.contains("<strong>gap</strong>"));
        assert!(html.contains("</aside>"));
        assert!(!html.contains("Callout"));
    }

    #[test]
    fn test_callout_in_fenced_code_is_kept() {
        let md = "```mdx\n<Callout type=\"info\">hi</Callout>\n```\n\n~~~\n<Callout>\n~~~\n";
        assert_eq!(expand_callouts(md), md);

        let html = MarkdownRenderer::new().render(md);
        assert!(!html.contains("<aside"));
        assert!(!html.contains("callout-info"));
        assert!(html.contains("Callout"));
    }

    #[test]
    fn test_callout_in_inline_code_is_kept() {
        let md = "Use `<Callout>` inline and ``<Callout type=\"x\"> ` </Callout>`` too.\n";
        assert_eq!(expand_callouts(md), md);

        let html = MarkdownRenderer::new().render(md);
        assert!(html.contains("<code>&lt;Callout&gt;</code>"));
        assert!(!html.contains("<aside"));
    }

    #[test]
    fn test_callout_after_code_is_expanded() {
        let md = "```\ncode\n```\n\nSee `x`.\n\n<Callout type=\"success\">\nDone\n</Callout>\n";
        let html = MarkdownRenderer::new().render(md);
        assert!(html.contains(r#"<aside class="callout callout-success">"#));
        assert!(html.contains("<code>x</code>"));
    }

    #[test]
    fn test_callout_defaults_to_info() {
        let html = expand_callouts("<Callout type='bogus'>x</Callout>");
        assert!(html.contains(r#"<aside class="callout callout-info">"#));
        assert!(!html.contains("callout-title"));
    }
}
