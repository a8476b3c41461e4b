use regex::{Captures, Regex};

/// Fewest single-match rewrites one fixed-point loop may apply. Longer texts
/// get one rewrite per byte, enough for any rewrite that removes at least one
/// newline or quote each time.
pub const MAX_REWRITE_PASSES: usize = 100_000;

fn pass_limit(text_len: usize) -> usize {
    MAX_REWRITE_PASSES.max(text_len)
}

/// Rewrite the first match of `pattern` and rescan from the start until nothing matches.
///
/// Returns the rewritten text and the number of rewrites applied. A rewrite that
/// leaves its match unchanged, or a loop that runs past the pass limit, stops
/// early with a warning (and trips a debug assertion).
pub fn rewrite_to_fixed_point(
    mut text: String,
    pattern: &Regex,
    rewrite: impl Fn(&Captures<'_>) -> String,
) -> (String, usize) {
    let limit = pass_limit(text.len());
    for passes in 0..limit {
        let Some((range, replacement)) = pattern.captures(&text).and_then(|caps| {
            let whole = caps.get(0)?;
            Some((whole.range(), rewrite(&caps)))
        }) else {
            return (text, passes);
        };
        if text[range.clone()] == replacement {
            return stalled(text, pattern, passes, "a rewrite left its match unchanged");
        }
        text.replace_range(range, &replacement);
    }

    stalled(text, pattern, limit, "the pass limit was reached")
}

fn stalled(text: String, pattern: &Regex, passes: usize, reason: &str) -> (String, usize) {
    log::warn!(
        "rewrite /{}/ stopped after {passes} passes: {reason}",
        pattern.as_str()
    );
    debug_assert!(
        !pattern.is_match(&text),
        "rewrite /{}/ did not reach a fixed point",
        pattern.as_str()
    );
    (text, passes)
}
