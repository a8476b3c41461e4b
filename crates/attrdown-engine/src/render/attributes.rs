use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

use super::tokens::{Token, find_open};

/// One term of an attribute block: a quoted stray value, or a name with an optional value.
fn term_regex() -> &'static Regex {
    static TERM_REGEX: OnceLock<Regex> = OnceLock::new();
    TERM_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?P<stray>"[^"]*"|'[^']*')
            | (?P<name>[^\s,="']+)
              (?:=(?:"(?P<double>[^"]*)"|'(?P<single>[^']*)'|(?P<bare>[^\s,]*)))?
            "#,
        )
        .expect("Invalid attribute term regex")
    })
}

fn attribute_name_regex() -> &'static Regex {
    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_:][-A-Za-z0-9_:.]*$").expect("Invalid attribute name regex")
    })
}

/// An attribute block at the very end of a run of text.
fn trailing_block_regex() -> &'static Regex {
    static TRAILING_REGEX: OnceLock<Regex> = OnceLock::new();
    TRAILING_REGEX.get_or_init(|| {
        Regex::new(r"\{:([^}\n]*)\}\s*$").expect("Invalid trailing attribute regex")
    })
}

fn standalone_block_regex() -> &'static Regex {
    static STANDALONE_REGEX: OnceLock<Regex> = OnceLock::new();
    STANDALONE_REGEX.get_or_init(|| {
        Regex::new(r"^\s*\{:([^}\n]*)\}\s*$").expect("Invalid standalone attribute regex")
    })
}

/// HTML attributes parsed from a `{:...}` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Other attributes in source order. `None` renders as an empty value.
    pub pairs: Vec<(String, Option<String>)>,
}

impl Attributes {
    /// Parse the inside of an attribute block (without the `{:` and `}`).
    ///
    /// Terms are separated by whitespace or commas: `#id`, `.class`, `key="value"`,
    /// `key='value'`, `key=value` or a bare `key`. Stray quoted strings and invalid
    /// attribute names are skipped.
    pub fn parse(source: &str) -> Self {
        let mut attributes = Self::default();
        for caps in term_regex().captures_iter(source) {
            let Some(name) = caps.name("name").map(|m| m.as_str()) else {
                continue;
            };
            let value = caps
                .name("double")
                .or_else(|| caps.name("single"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().to_string());

            if let Some(id) = name.strip_prefix('#') {
                if !id.is_empty() && value.is_none() {
                    attributes.id = Some(id.to_string());
                }
            } else if let Some(class) = name.strip_prefix('.') {
                if !class.is_empty() && value.is_none() {
                    attributes.classes.push(class.to_string());
                }
            } else if attribute_name_regex().is_match(name) {
                attributes.pairs.push((name.to_string(), value));
            } else {
                log::debug!("ignoring invalid attribute name '{name}'");
            }
        }
        attributes
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.pairs.is_empty()
    }

    /// Fold `other` into `self`; a later id replaces an earlier one.
    pub fn merge(&mut self, other: Attributes) {
        if other.id.is_some() {
            self.id = other.id;
        }
        self.classes.extend(other.classes);
        self.pairs.extend(other.pairs);
    }

    /// Render as ` id="..." class="..." key="..."`, in that order.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(id) = &self.id {
            push_attribute(&mut html, "id", id);
        }
        if !self.classes.is_empty() {
            push_attribute(&mut html, "class", &self.classes.join(" "));
        }
        for (name, value) in &self.pairs {
            push_attribute(&mut html, name, value.as_deref().unwrap_or(""));
        }
        html
    }

    /// Insert the attributes into the first opening tag of `html`.
    pub fn inject_into(&self, html: &str) -> String {
        let Some(open) = html.find('<') else {
            return html.to_string();
        };
        let name_end = html[open + 1..]
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .map(|offset| open + 1 + offset);
        match name_end {
            Some(at) => format!("{}{}{}", &html[..at], self.to_html(), &html[at..]),
            None => html.to_string(),
        }
    }

    /// Fold into a heading tag so pulldown-cmark renders them itself.
    pub(crate) fn apply_to_heading<'a>(&self, tag: Tag<'a>) -> Tag<'a> {
        match tag {
            Tag::Heading {
                level,
                id,
                mut classes,
                mut attrs,
            } => {
                classes.extend(self.classes.iter().cloned().map(CowStr::from));
                attrs.extend(
                    self.pairs
                        .iter()
                        .cloned()
                        .map(|(name, value)| (CowStr::from(name), value.map(CowStr::from))),
                );
                Tag::Heading {
                    level,
                    id: self.id.clone().map(CowStr::from).or(id),
                    classes,
                    attrs,
                }
            }
            other => other,
        }
    }
}

fn push_attribute(html: &mut String, name: &str, value: &str) {
    html.push(' ');
    html.push_str(name);
    html.push_str("=\"");
    html.push_str(&html_escape::encode_double_quoted_attribute(value));
    html.push('"');
}

/// Blocks whose trailing inline text may carry an attribute block.
fn takes_trailing_attributes(tag: &Tag<'_>) -> bool {
    matches!(tag, Tag::Heading { .. } | Tag::Paragraph | Tag::Item)
}

/// Turn `{:...}` blocks in the token stream into block attributes.
///
/// * a block at the end of a heading, paragraph or tight list item applies to it
/// * a paragraph holding only a block applies to the block closed just before it
///
/// Blocks that match neither rule stay in the text.
pub fn apply(tokens: &mut Vec<Token<'_>>) {
    let mut index = 0;
    while index < tokens.len() {
        if let Some(attributes) = standalone_paragraph(tokens, index) {
            let target = index
                .checked_sub(1)
                .and_then(|close| find_open(tokens, close));
            match target {
                Some(target) => {
                    tokens.drain(index..index + 3);
                    if let Some(Token::Open {
                        attributes: existing,
                        ..
                    }) = tokens.get_mut(target)
                    {
                        existing.merge(attributes);
                    }
                }
                None => index += 3,
            }
            continue;
        }

        let takes_trailing = matches!(
            tokens.get(index),
            Some(Token::Open { tag, .. }) if takes_trailing_attributes(tag)
        );
        let trailing = match tokens.get_mut(index + 1) {
            Some(Token::Inline(inline)) if takes_trailing => strip_trailing(inline),
            _ => None,
        };
        if let Some(found) = trailing
            && let Some(Token::Open { attributes, .. }) = tokens.get_mut(index)
        {
            attributes.merge(found);
        }
        index += 1;
    }
}

/// Attributes of a paragraph made of nothing but one attribute block.
fn standalone_paragraph(tokens: &[Token<'_>], index: usize) -> Option<Attributes> {
    let [
        Token::Open {
            tag: Tag::Paragraph,
            ..
        },
        Token::Inline(inline),
        Token::Close(TagEnd::Paragraph),
    ] = tokens.get(index..index + 3)?
    else {
        return None;
    };
    let text = text_of(inline)?;
    let caps = standalone_block_regex().captures(&text)?;
    Some(Attributes::parse(caps.get(1)?.as_str()))
}

/// Concatenated text when `inline` is nothing but text events.
fn text_of(inline: &[Event<'_>]) -> Option<String> {
    if inline.is_empty() {
        return None;
    }
    inline
        .iter()
        .map(|event| match event {
            Event::Text(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect()
}

/// Remove a trailing attribute block from inline content and return its attributes.
///
/// The block may be split over several text events. Whitespace and a soft break
/// in front of it go with it.
fn strip_trailing(inline: &mut Vec<Event<'_>>) -> Option<Attributes> {
    let run_start = inline
        .iter()
        .rposition(|event| !matches!(event, Event::Text(_)))
        .map_or(0, |position| position + 1);
    let tail: String = inline
        .get(run_start..)?
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect();

    let caps = trailing_block_regex().captures(&tail)?;
    let block = caps.get(0)?;
    let attributes = Attributes::parse(caps.get(1)?.as_str());
    let remainder = tail[..block.start()].trim_end().to_string();

    inline.truncate(run_start);
    if remainder.is_empty() {
        while matches!(
            inline.last(),
            Some(Event::SoftBreak | Event::HardBreak)
        ) {
            inline.pop();
        }
    } else {
        inline.push(Event::Text(remainder.into()));
    }
    Some(attributes)
}
