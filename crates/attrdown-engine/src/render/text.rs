use regex::Regex;
use std::sync::OnceLock;

fn footnote_marker_regex() -> &'static Regex {
    static FOOTNOTE_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    FOOTNOTE_MARKER_REGEX
        .get_or_init(|| Regex::new(r"\[\^[^\]\s]+\]:?").expect("Invalid footnote marker regex"))
}

/// Text content of an HTML fragment, with footnote references left out.
///
/// Tags are dropped and entities decoded. The contents of
/// `<sup class="footnote-reference">` are skipped.
pub fn plain_text(html: &str) -> String {
    let mut text = String::new();
    let mut rest = html;
    let mut skipping = 0usize;

    while let Some(open) = rest.find('<') {
        if skipping == 0 {
            text.push_str(&rest[..open]);
        }
        let Some(close) = rest[open..].find('>').map(|offset| open + offset) else {
            // A lone '<' is text
            if skipping == 0 {
                text.push_str(&rest[open..]);
            }
            rest = "";
            break;
        };

        let tag = &rest[open..=close];
        if tag.starts_with("<sup") && (skipping > 0 || tag.contains("footnote-reference")) {
            skipping += 1;
        } else if tag.starts_with("</sup") && skipping > 0 {
            skipping -= 1;
        }
        rest = &rest[close + 1..];
    }
    if skipping == 0 {
        text.push_str(rest);
    }

    html_escape::decode_html_entities(&text).into_owned()
}

/// Drop `[^ref]` and `[^ref]:` footnote markers.
pub fn strip_footnote_markers(text: &str) -> String {
    footnote_marker_regex().replace_all(text, "").into_owned()
}

/// Outline text for a rendered heading.
pub fn heading_text(html: &str) -> String {
    strip_footnote_markers(&plain_text(html)).trim().to_string()
}
