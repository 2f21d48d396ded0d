//! Markdown to plain-text conversion for feed descriptions.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// Template placeholders such as `{{ $frontmatter.title }}`, which Markdown
/// itself treats as text.
static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip Markdown syntax from `markdown`, keeping readable text on one line.
///
/// Text and inline code survive. Code blocks, HTML, images and template
/// placeholders are dropped. Block boundaries become a single space.
pub fn strip_markdown(markdown: &str) -> String {
    let markdown = RE_PLACEHOLDER.replace_all(markdown, " ");
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

    let mut text = String::with_capacity(markdown.len());
    // nesting depth of code blocks and images, whose text is not prose
    let mut hidden = 0usize;

    for event in Parser::new_ext(&markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::Image { .. }) => hidden += 1,
            Event::End(TagEnd::CodeBlock | TagEnd::Image) => hidden = hidden.saturating_sub(1),
            Event::Text(t) | Event::Code(t) if hidden == 0 => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            Event::End(end) if is_block_end(&end) => text.push(' '),
            _ => {}
        }
    }

    RE_WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

fn is_block_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::Item
            | TagEnd::List(_)
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
    )
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].trim_end(),
        None => text,
    }
}

/// Plain-text summary of a Markdown body: stripped, then truncated.
pub fn summarize(markdown: &str, max_chars: usize) -> String {
    truncate_chars(&strip_markdown(markdown), max_chars).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_headings_and_paragraphs() {
        let md = "# Title\n\nSome text.\n\n## Section\nMore text.";
        assert_eq!(strip_markdown(md), "Title Some text. Section More text.");
    }

    #[test]
    fn test_strip_code_fences() {
        let md = "Before\n```rust\nfn main() {}\n```\nAfter";
        assert_eq!(strip_markdown(md), "Before After");
    }

    #[test]
    fn test_strip_unterminated_fence() {
        assert_eq!(strip_markdown("Intro\n```js\nconsole.log(1)"), "Intro");
    }

    #[test]
    fn test_strip_inline_code_keeps_text() {
        assert_eq!(strip_markdown("Run `cargo build` now"), "Run cargo build now");
    }

    #[test]
    fn test_strip_links_and_images() {
        let md = "See [the docs](https://example.com) and ![logo](logo.png) [ref][1].\n\n[1]: https://example.com/ref";
        assert_eq!(strip_markdown(md), "See the docs and ref.");
    }

    #[test]
    fn test_strip_link_with_parens_in_url() {
        let md = "See [Rust](https://en.wikipedia.org/wiki/Rust_(language)) now";
        assert_eq!(strip_markdown(md), "See Rust now");
    }

    #[test]
    fn test_strip_setext_headings() {
        assert_eq!(strip_markdown("Intro\n=====\n\nText"), "Intro Text");
        assert_eq!(strip_markdown("Part\n-----\nMore"), "Part More");
    }

    #[test]
    fn test_strip_tables() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |";
        assert_eq!(strip_markdown(md), "a b 1 2");
    }

    #[test]
    fn test_strip_reference_definitions() {
        let md = "Text\n\n[1]: https://example.com/ref";
        assert_eq!(strip_markdown(md), "Text");
    }

    #[test]
    fn test_strip_template_placeholders() {
        let md = "Hello {{ $frontmatter.title }} world {{\n multi \n}}!";
        assert_eq!(strip_markdown(md), "Hello world !");
    }

    #[test]
    fn test_strip_emphasis() {
        let md = "**bold** and *italic* and __strong__ and _em_ and ~~gone~~";
        assert_eq!(strip_markdown(md), "bold and italic and strong and em and gone");
    }

    #[test]
    fn test_strip_keeps_inner_underscores() {
        assert_eq!(strip_markdown("call snake_case_name here"), "call snake_case_name here");
    }

    #[test]
    fn test_strip_lists_and_quotes() {
        let md = "- one\n* two\n+ three\n1. four\n2) five\n> quoted";
        assert_eq!(strip_markdown(md), "one two three four five quoted");
    }

    #[test]
    fn test_strip_horizontal_rule() {
        assert_eq!(strip_markdown("above\n\n---\n\nbelow"), "above below");
    }

    #[test]
    fn test_strip_html() {
        let md = "Some <em>inline</em> text <!-- hidden -->\n\n<div class=\"tip\">\nblock html\n</div>\n\n<ArticlesList />\n\nafter";
        assert_eq!(strip_markdown(md), "Some inline text after");
    }

    #[test]
    fn test_strip_empty() {
        assert_eq!(strip_markdown(""), "");
        assert_eq!(strip_markdown("\n\n  \n"), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 6), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_summarize_limit() {
        let md = format!("# Heading\n\n{}", "word ".repeat(200));
        let summary = summarize(&md, 280);

        assert!(summary.chars().count() <= 280);
        assert!(summary.starts_with("Heading word word"));
        assert!(!summary.contains('#'));
    }

    #[test]
    fn test_summarize_has_no_residual_markup() {
        let md = "## Intro\n\n- item with `code`\n- [link](https://x.dev)\n\n{{ var }}\n\n```\nblock\n```\n";
        let summary = summarize(md, 280);

        assert_eq!(summary, "Intro item with code link");
        for forbidden in ["`", "](", "{{", "}}", "#", "- "] {
            assert!(!summary.contains(forbidden), "found {forbidden:?} in {summary:?}");
        }
    }
}
