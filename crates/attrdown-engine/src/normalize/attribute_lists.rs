use regex::{Captures, Regex};
use std::sync::OnceLock;

/// A line holding nothing but `{:name: value}`.
fn definition_regex() -> &'static Regex {
    static DEFINITION_REGEX: OnceLock<Regex> = OnceLock::new();
    DEFINITION_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*\{:(\w+):[ \t]+([^}\n]+)\}[ \t]*(?:\n|\z)")
            .expect("Invalid attribute list definition regex")
    })
}

/// A single-line `{:...}` span.
fn attribute_span_regex() -> &'static Regex {
    static SPAN_REGEX: OnceLock<Regex> = OnceLock::new();
    SPAN_REGEX.get_or_init(|| Regex::new(r"\{:[^}\n]*\}").expect("Invalid attribute span regex"))
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| Regex::new(r"\w+").expect("Invalid word regex"))
}

/// Name to replacement text, in order of first definition.
#[derive(Debug, Default)]
struct Definitions(Vec<(String, String)>);

impl Definitions {
    /// A repeated name keeps its original position but takes the newer value.
    fn define(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, current)) => {
                log::debug!("attribute list '{name}' redefined, later definition wins");
                *current = value.to_string();
            }
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Remove attribute list definitions and substitute their names inside attribute blocks.
///
/// Substituted values are not scanned again, so a definition cannot refer to another.
pub fn resolve(text: &str) -> String {
    let mut definitions = Definitions::default();
    let stripped = definition_regex().replace_all(text, |caps: &Captures<'_>| {
        definitions.define(&caps[1], caps[2].trim_end());
        String::new()
    });

    if definitions.0.is_empty() {
        return stripped.into_owned();
    }
    log::debug!("resolved {} attribute list definitions", definitions.0.len());

    attribute_span_regex()
        .replace_all(&stripped, |span: &Captures<'_>| {
            word_regex()
                .replace_all(&span[0], |word: &Captures<'_>| {
                    definitions.get(&word[0]).unwrap_or(&word[0]).to_string()
                })
                .into_owned()
        })
        .into_owned()
}
