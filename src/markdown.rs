//! Slicing free-text model replies: fenced code blocks, bullet lists and
//! prose sections under a heading.
//!
//! Replies are loosely formatted markdown. Nothing here fails; a piece that
//! cannot be found comes back empty and the caller decides what that means.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// First word of the info string, lower-cased (`typescript`, `json`, ...)
    pub lang: String,
    pub code: String,
}

/// All fenced code blocks in document order
pub fn code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some(CodeBlock {
                    lang: info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_lowercase(),
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

/// Body of the first fenced block whose language is one of `langs`
pub fn first_code_block(text: &str, langs: &[&str]) -> Option<String> {
    code_blocks(text)
        .into_iter()
        .find(|b| langs.contains(&b.lang.as_str()))
        .map(|b| b.code)
}

/// Body of the first block opening with a `// <marker>` comment line,
/// without that line
pub fn tagged_code_block(text: &str, marker: &str) -> Option<String> {
    let marker = marker.to_lowercase();
    code_blocks(text).into_iter().find_map(|block| {
        let (first, rest) = block.code.split_once('\n').unwrap_or((block.code.as_str(), ""));
        let comment = first.trim().strip_prefix("//")?;
        comment
            .to_lowercase()
            .contains(&marker)
            .then(|| rest.trim().to_string())
    })
}

// Compiled line patterns
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\s*(.*?)[\s#]*$").unwrap());

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\*{0,2}([A-Za-z][A-Za-z &/-]{0,40}?)\*{0,2}\s*:\*{0,2}\s*(.*)$")
        .unwrap()
});

#[derive(Debug, Clone, Copy)]
enum Kind<'a> {
    Blank,
    Heading(&'a str),
    Bullet(&'a str),
    Label { label: &'a str, rest: &'a str },
    Code,
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    raw: &'a str,
    kind: Kind<'a>,
}

fn classify(text: &str) -> Vec<Line<'_>> {
    let mut in_fence = false;
    text.lines()
        .map(|raw| {
            let trimmed = raw.trim();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                return Line { raw, kind: Kind::Code };
            }
            let kind = if in_fence {
                Kind::Code
            } else if trimmed.is_empty() {
                Kind::Blank
            } else if let Some(c) = HEADING.captures(raw) {
                Kind::Heading(c.get(1).map_or("", |m| m.as_str()))
            } else if let Some(item) = bullet_text(trimmed) {
                Kind::Bullet(item)
            } else if let Some(c) = LABEL.captures(raw) {
                Kind::Label {
                    label: c.get(1).map_or("", |m| m.as_str()),
                    rest: c.get(2).map_or("", |m| m.as_str()),
                }
            } else {
                Kind::Text
            };
            Line { raw, kind }
        })
        .collect()
}

fn bullet_text(trimmed: &str) -> Option<&str> {
    ["- ", "* ", "• ", "•"]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(str::trim)
}

fn matches_label(text: &str, labels: &[&str]) -> bool {
    let text = text.trim_matches(|c: char| c == '*' || c.is_whitespace()).to_lowercase();
    labels.iter().any(|label| text.contains(&label.to_lowercase()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Heading,
    Label,
}

/// Index of the first line after the matching heading, its style, and any
/// text that followed a `Label:` on the same line
fn find_section<'a>(lines: &[Line<'a>], labels: &[&str]) -> Option<(usize, Style, &'a str)> {
    lines.iter().enumerate().find_map(|(i, line)| match line.kind {
        Kind::Heading(text) if matches_label(text, labels) => Some((i + 1, Style::Heading, "")),
        Kind::Label { label, rest } if matches_label(label, labels) => {
            Some((i + 1, Style::Label, rest))
        }
        _ => None,
    })
}

/// Bullet items listed under the first heading or `Label:` line matching one of `labels`
pub fn bullets_under(text: &str, labels: &[&str]) -> Vec<String> {
    let lines = classify(text);
    let Some((start, _, _)) = find_section(&lines, labels) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for line in lines.iter().skip(start) {
        match line.kind {
            Kind::Blank => {}
            Kind::Bullet(item) if !item.is_empty() => items.push(item.to_string()),
            Kind::Bullet(_) => {}
            _ => break,
        }
    }
    items
}

/// Prose under the first heading or `Label:` line matching one of `labels`.
///
/// After a heading the prose runs to the next heading; after a label line it
/// runs to the next blank line.
pub fn prose_under(text: &str, labels: &[&str]) -> String {
    let lines = classify(text);
    let Some((start, style, inline)) = find_section(&lines, labels) else {
        return String::new();
    };

    let mut body: Vec<&str> = Vec::new();
    if !inline.trim().is_empty() {
        body.push(inline.trim());
    }
    for line in lines.iter().skip(start) {
        match (line.kind, style) {
            (Kind::Heading(_), _) => break,
            (Kind::Blank, Style::Label) if !body.is_empty() => break,
            _ => body.push(line.raw),
        }
    }
    body.join("\n").trim().to_string()
}

/// Strip a surrounding code fence from a reply that should be bare data
pub fn unfence(reply: &str) -> String {
    let trimmed = reply.trim();
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        if let Some(block) = code_blocks(trimmed).into_iter().next() {
            return block.code;
        }
    }
    trimmed.to_string()
}
