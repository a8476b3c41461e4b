use regex::Regex;
use std::sync::OnceLock;

use super::rewrite::rewrite_to_fixed_point;

/// An ATX heading line directly followed by a line starting with an attribute block.
fn heading_attribute_regex() -> &'static Regex {
    static HEADING_ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^(#{1,6}[ \t][^\n]*)\n(\{:[^}\n]*\}[^\n]*)")
            .expect("Invalid heading attribute regex")
    })
}

fn adjacent_blocks_regex() -> &'static Regex {
    static ADJACENT_BLOCKS_REGEX: OnceLock<Regex> = OnceLock::new();
    ADJACENT_BLOCKS_REGEX
        .get_or_init(|| Regex::new(r"\}\s*\{:").expect("Invalid adjacent blocks regex"))
}

/// A line containing a pipe, followed by a line starting with `{:`.
fn table_attribute_regex() -> &'static Regex {
    static TABLE_ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    TABLE_ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^([^\n]*\|[^\n]*\n)(\{:)").expect("Invalid table attribute regex")
    })
}

/// The first attribute span that still contains a single quote.
fn single_quoted_span_regex() -> &'static Regex {
    static SINGLE_QUOTED_SPAN_REGEX: OnceLock<Regex> = OnceLock::new();
    SINGLE_QUOTED_SPAN_REGEX.get_or_init(|| {
        Regex::new(r"\{:[^}\n']*'[^}\n]*\}").expect("Invalid single quoted span regex")
    })
}

/// Move attribute blocks to where the renderer looks for them.
///
/// Runs [`attach_to_headings`], [`merge_adjacent`], [`space_tables`] and
/// [`normalize_quotes`] in that order.
pub fn relocate(text: &str) -> String {
    let text = attach_to_headings(text);
    let text = merge_adjacent(&text);
    let text = space_tables(&text);
    normalize_quotes(&text)
}

/// Join attribute lines that trail a heading onto the heading line.
///
/// One line is joined per pass and the scan restarts, so stacked attribute
/// lines all end up on the heading in their original order.
pub fn attach_to_headings(text: &str) -> String {
    let (text, joined) =
        rewrite_to_fixed_point(text.to_string(), heading_attribute_regex(), |caps| {
            format!("{} {}", &caps[1], &caps[2])
        });
    if joined > 0 {
        log::debug!("joined {joined} attribute lines onto headings");
    }
    text
}

/// Collapse `{:a} {:b}` into `{:a b}`; only the first block on a line is honored.
pub fn merge_adjacent(text: &str) -> String {
    adjacent_blocks_regex().replace_all(text, " ").into_owned()
}

/// Put a blank line between a table row and the attribute block under it.
pub fn space_tables(text: &str) -> String {
    table_attribute_regex()
        .replace_all(text, "${1}\n${2}")
        .into_owned()
}

/// Attribute values must be double quoted.
pub fn normalize_quotes(text: &str) -> String {
    let (text, spans) =
        rewrite_to_fixed_point(text.to_string(), single_quoted_span_regex(), |caps| {
            caps[0].replace('\'', "\"")
        });
    if spans > 0 {
        log::trace!("normalized quotes in {spans} attribute blocks");
    }
    text
}
