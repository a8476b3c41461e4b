//! Markdown to HTML on top of pulldown-cmark.
//!
//! Parser events are grouped into [`Token`]s so that attribute blocks can be
//! moved onto the blocks they annotate, and so that hooks such as the heading
//! extractor can inspect whole blocks before the HTML is assembled.

pub mod attributes;
pub mod headings;
pub mod highlight;
pub mod text;
pub mod tokens;

use pulldown_cmark::{Options, Parser};
use thiserror::Error;

use crate::normalize::normalize;
use crate::outline::OutlineBuilder;
use headings::HeadingExtractor;
use highlight::{Highlighter, SyntectHighlighter, highlight_code_blocks};
use tokens::{Token, render_html, tokenize};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Heading at token {index} is not followed by inline content and its closing tag")]
    MalformedHeading { index: usize },
    #[error("Document ended inside an open {tag} block")]
    UnclosedBlock { tag: String },
}

/// Markdown extensions switched on for parsing, plus code highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub definition_lists: bool,
    pub strikethrough: bool,
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            definition_lists: true,
            strikethrough: true,
            highlight: true,
        }
    }
}

impl RenderOptions {
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_DEFINITION_LIST, self.definition_lists);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options
    }
}

/// A pass over the token stream after attributes are applied and before HTML
/// is assembled.
pub trait TokenHook {
    fn run(&mut self, tokens: &[Token<'_>], renderer: &Renderer) -> Result<(), RenderError>;
}

pub struct Renderer {
    options: RenderOptions,
    highlighter: Option<Box<dyn Highlighter>>,
}

impl Renderer {
    /// Renderer for `options`, highlighting with syntect when enabled.
    pub fn new(options: RenderOptions) -> Self {
        let highlighter: Option<Box<dyn Highlighter>> = if options.highlight {
            Some(Box::new(SyntectHighlighter::new()))
        } else {
            None
        };
        Self {
            options,
            highlighter,
        }
    }

    pub fn without_highlighting(options: RenderOptions) -> Self {
        Self {
            options,
            highlighter: None,
        }
    }

    pub fn with_highlighter(options: RenderOptions, highlighter: impl Highlighter + 'static) -> Self {
        Self {
            options,
            highlighter: Some(Box::new(highlighter)),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parse `text` and apply its attribute blocks.
    pub fn parse_to_tokens<'a>(&self, text: &'a str) -> Result<Vec<Token<'a>>, RenderError> {
        let mut tokens = tokenize(Parser::new_ext(text, self.options.parser_options()))?;
        attributes::apply(&mut tokens);
        Ok(tokens)
    }

    pub fn render_tokens(&self, tokens: &[Token<'_>]) -> String {
        render_html(tokens)
    }

    /// Parse, run `hooks` in order, highlight code blocks and render.
    pub fn render_with_hooks(
        &self,
        text: &str,
        hooks: &mut [&mut dyn TokenHook],
    ) -> Result<String, RenderError> {
        let mut tokens = self.parse_to_tokens(text)?;
        log::trace!("parsed {} tokens", tokens.len());

        for hook in hooks.iter_mut() {
            hook.run(&tokens, self)?;
        }
        if let Some(highlighter) = &self.highlighter {
            highlight_code_blocks(&mut tokens, highlighter.as_ref());
        }
        Ok(self.render_tokens(&tokens))
    }

    pub fn render_to_html(&self, text: &str) -> Result<String, RenderError> {
        self.render_with_hooks(text, &mut [])
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
}

/// Normalizes attribute syntax, renders, and reports headings to outline builders.
#[derive(Debug)]
pub struct HtmlGenerator {
    renderer: Renderer,
}

impl HtmlGenerator {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            renderer: Renderer::new(options),
        }
    }

    pub fn with_renderer(renderer: Renderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render `markdown` to HTML. Each builder sees every heading, in document order.
    pub fn generate(
        &self,
        markdown: &str,
        builders: &mut [&mut dyn OutlineBuilder],
    ) -> Result<Rendered, RenderError> {
        let normalized = normalize(markdown);
        let mut extractor = HeadingExtractor::new(builders);
        let html = self
            .renderer
            .render_with_hooks(&normalized, &mut [&mut extractor])?;

        Ok(Rendered {
            html: escape_single_quotes(&html),
        })
    }
}

impl Default for HtmlGenerator {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

fn escape_single_quotes(html: &str) -> String {
    html.replace('\'', "&#39;")
}
