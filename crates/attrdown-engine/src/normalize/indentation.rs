use regex::Regex;
use std::sync::OnceLock;

fn two_space_indent_regex() -> &'static Regex {
    static TWO_SPACE_INDENT_REGEX: OnceLock<Regex> = OnceLock::new();
    TWO_SPACE_INDENT_REGEX
        .get_or_init(|| Regex::new(r"\n  (\S)").expect("Invalid indentation regex"))
}

/// Widen two-space continuation indentation to four spaces.
///
/// A single pass is enough: the output never contains a new two-space indent.
pub fn normalize(text: &str) -> String {
    two_space_indent_regex()
        .replace_all(text, "\n    ${1}")
        .into_owned()
}
