use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Receives the headings of a rendered document, in document order.
pub trait OutlineBuilder {
    fn heading(&mut self, text: &str, level: u8, html: &str);
}

fn id_attribute_regex() -> &'static Regex {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX.get_or_init(|| {
        Regex::new(r#"^\s*<h[1-6][^>]*?\sid="([^"]*)""#).expect("Invalid heading id regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub text: String,
    pub level: u8,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl OutlineEntry {
    pub fn new(text: &str, level: u8, html: &str) -> Self {
        let id = id_attribute_regex()
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned());
        Self {
            text: text.to_string(),
            level,
            html: html.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub text: String,
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub children: Vec<OutlineNode>,
}

impl From<&OutlineEntry> for OutlineNode {
    fn from(entry: &OutlineEntry) -> Self {
        Self {
            text: entry.text.clone(),
            level: entry.level,
            id: entry.id.clone(),
            children: Vec::new(),
        }
    }
}

/// Collects headings into a flat list that can be nested on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    /// Entries nested under the nearest preceding entry with a smaller level.
    pub fn tree(&self) -> Vec<OutlineNode> {
        build_hierarchy(&self.entries)
    }
}

impl OutlineBuilder for Outline {
    fn heading(&mut self, text: &str, level: u8, html: &str) {
        self.entries.push(OutlineEntry::new(text, level, html));
    }
}

/// Build a hierarchical outline from a flat list of entries
pub fn build_hierarchy(entries: &[OutlineEntry]) -> Vec<OutlineNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<OutlineNode> = Vec::new();

    for entry in entries {
        // Close every open node at the same depth or deeper
        while stack.last().is_some_and(|open| open.level >= entry.level) {
            close_innermost(&mut stack, &mut roots);
        }
        stack.push(OutlineNode::from(entry));
    }
    while !stack.is_empty() {
        close_innermost(&mut stack, &mut roots);
    }

    roots
}

fn close_innermost(stack: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}
