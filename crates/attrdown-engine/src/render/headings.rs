use pulldown_cmark::{Tag, TagEnd};

use super::{RenderError, Renderer, TokenHook, text::heading_text, tokens::Token};
use crate::outline::OutlineBuilder;

/// Reports every heading in the token stream to a set of outline builders.
///
/// Built fresh for each render, borrowing that render's builders, so nothing
/// carries over between documents.
pub struct HeadingExtractor<'b, 'o> {
    builders: &'b mut [&'o mut dyn OutlineBuilder],
}

impl<'b, 'o> HeadingExtractor<'b, 'o> {
    pub fn new(builders: &'b mut [&'o mut dyn OutlineBuilder]) -> Self {
        Self { builders }
    }
}

fn is_heading_triple(tokens: &[Token<'_>]) -> bool {
    matches!(
        tokens,
        [
            Token::Open {
                tag: Tag::Heading { level, .. },
                ..
            },
            Token::Inline(_),
            Token::Close(TagEnd::Heading(close)),
        ] if level == close
    )
}

fn level_from_tag(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')
        .and_then(|digits| digits.parse().ok())
        .filter(|level| (1..=6).contains(level))
}

impl TokenHook for HeadingExtractor<'_, '_> {
    fn run(&mut self, tokens: &[Token<'_>], renderer: &Renderer) -> Result<(), RenderError> {
        let mut reported = 0usize;

        for (index, token) in tokens.iter().enumerate() {
            if !matches!(token, Token::Open { .. }) {
                continue;
            }
            let Some(tag) = token.tag() else {
                continue;
            };
            let triple = tokens
                .get(index..index + 3)
                .filter(|triple| is_heading_triple(triple))
                .ok_or(RenderError::MalformedHeading { index })?;
            let level = level_from_tag(tag).ok_or(RenderError::MalformedHeading { index })?;

            let html = renderer.render_tokens(triple);
            let text = heading_text(&html);
            log::trace!("heading h{level}: {text}");
            for builder in self.builders.iter_mut() {
                builder.heading(&text, level, &html);
            }
            reported += 1;
        }

        log::debug!(
            "reported {reported} headings to {} outline builders",
            self.builders.len()
        );
        Ok(())
    }
}
