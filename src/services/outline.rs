//! Markdown structure helpers for lectures: title, preview paragraph and
//! the heading outline shown next to the lecture text.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;

use crate::utils::truncate_text;

/// One heading in a lecture's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub title: String,
    /// Anchor id, unique within the document
    pub anchor: String,
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// All headings with their text, inline formatting stripped
fn headings(content: &str) -> Vec<(u8, String)> {
    let mut result = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level_number(level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    let text = text.trim();
                    if !text.is_empty() {
                        result.push((level, text.to_string()));
                    }
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    result
}

/// First heading of any level
pub fn first_heading(content: &str) -> Option<(u8, String)> {
    headings(content).into_iter().next()
}

/// First non-empty paragraph as plain text, truncated to `max_chars`
pub fn first_paragraph(content: &str, max_chars: usize) -> Option<String> {
    let mut in_paragraph = false;
    let mut text = String::new();

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                text.clear();
            }
            Event::End(TagEnd::Paragraph) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(truncate_text(trimmed, max_chars));
                }
                in_paragraph = false;
            }
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    None
}

/// Heading outline with GitHub-style anchors
pub fn outline(content: &str) -> Vec<OutlineEntry> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    headings(content)
        .into_iter()
        .map(|(level, title)| {
            let base = slugify(&title);
            let count = seen.entry(base.clone()).or_insert(0);
            let anchor = if *count == 0 {
                base
            } else {
                format!("{}-{}", base, count)
            };
            *count += 1;
            OutlineEntry {
                level,
                title,
                anchor,
            }
        })
        .collect()
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
