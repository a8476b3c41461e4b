use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::tokens::Token;

/// Syntax highlighting for fenced code blocks.
pub trait Highlighter: Send + Sync {
    /// Highlighted HTML for `code`, or an empty string when the language is
    /// unknown or highlighting fails. Must not panic.
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Class-based highlighting with syntect's bundled syntaxes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn try_highlight(&self, code: &str, language: &str) -> Result<String, syntect::Error> {
        let Some(syntax) = self.syntax_set.find_syntax_by_token(language) else {
            return Ok(String::new());
        };
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter").finish_non_exhaustive()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        if language.is_empty() {
            return String::new();
        }
        self.try_highlight(code, language).unwrap_or_else(|e| {
            log::warn!("highlighting {language} failed, falling back to plain code: {e}");
            String::new()
        })
    }
}

/// Replace fenced code blocks the highlighter understands with highlighted HTML.
///
/// Blocks it returns nothing for keep their tokens and get the renderer's
/// default escaping.
pub fn highlight_code_blocks(tokens: &mut Vec<Token<'_>>, highlighter: &dyn Highlighter) {
    let mut index = 0;
    while index < tokens.len() {
        if let Some(html) = highlighted_block(tokens, index, highlighter) {
            tokens.splice(index..index + 3, [Token::Leaf(Event::Html(html.into()))]);
        }
        index += 1;
    }
}

fn highlighted_block(
    tokens: &[Token<'_>],
    index: usize,
    highlighter: &dyn Highlighter,
) -> Option<String> {
    let [
        Token::Open {
            tag: Tag::CodeBlock(CodeBlockKind::Fenced(info)),
            attributes,
        },
        Token::Inline(inline),
        Token::Close(TagEnd::CodeBlock),
    ] = tokens.get(index..index + 3)?
    else {
        return None;
    };
    let language = info.split_whitespace().next()?;
    let code: String = inline
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) => Some(text.as_ref()),
            _ => None,
        })
        .collect();

    let highlighted = highlighter.highlight(&code, language);
    if highlighted.is_empty() {
        return None;
    }
    let html = format!(
        "<pre><code class=\"language-{}\">{highlighted}</code></pre>\n",
        html_escape::encode_double_quoted_attribute(language)
    );
    Some(if attributes.is_empty() {
        html
    } else {
        attributes.inject_into(&html)
    })
}
