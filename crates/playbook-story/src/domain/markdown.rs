//! Markdown flattening for event descriptions.
//!
//! Story authors write events in Markdown; perceptions and the terminal need
//! plain prose. Emphasis is dropped, line breaks inside a paragraph become
//! spaces, and paragraphs are separated by a blank line.

use pulldown_cmark::{Event, Parser, TagEnd};

/// Renders Markdown as plain text.
#[must_use]
pub fn to_plain_text(markdown: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => current.push_str(&text),
            Event::SoftBreak | Event::HardBreak => current.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    paragraphs.push(trimmed.to_owned());
                }
                current.clear();
            }
            _ => {}
        }
    }

    let trailing = current.trim();
    if !trailing.is_empty() {
        paragraphs.push(trailing.to_owned());
    }

    paragraphs.join("\n\n")
}
