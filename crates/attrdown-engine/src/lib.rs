pub mod io;
pub mod normalize;
pub mod outline;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::*;
pub use normalize::normalize;
pub use outline::{Outline, OutlineBuilder, OutlineEntry, OutlineNode};
pub use render::{
    HtmlGenerator, RenderError, RenderOptions, Rendered, Renderer, TokenHook,
    attributes::Attributes,
    headings::HeadingExtractor,
    highlight::{Highlighter, SyntectHighlighter},
    tokens::{Token, TokenKind},
};
