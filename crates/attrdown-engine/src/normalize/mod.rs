//! Text rewrites that run before Markdown parsing.
//!
//! The renderer only understands attribute blocks in a few positions and
//! forms. These passes move and rewrite `{:...}` blocks so it finds them:
//!
//! 1. [`attribute_lists::resolve`] - drop `{:name: value}` definitions and
//!    substitute their names inside attribute blocks
//! 2. [`relocate::relocate`] - attach, merge, space and requote attribute blocks,
//!    then one more [`attribute_lists::resolve`] for definitions the merge formed
//! 3. [`indentation::normalize`] - widen two-space indentation to four
//!
//! Every pass is total: text it does not recognise passes through untouched.

pub mod attribute_lists;
pub mod indentation;
pub mod relocate;
pub mod rewrite;

/// Run every normalization pass in order.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = attribute_lists::resolve(&text);
    let text = relocate::relocate(&text);
    // Merging blocks can leave a new definition line behind
    let text = attribute_lists::resolve(&text);
    indentation::normalize(&text)
}
