use pulldown_cmark::{Event, HeadingLevel, Tag, TagEnd, html::push_html};

use super::{RenderError, attributes::Attributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Inline,
    Close,
    Leaf,
}

/// A block-level view of the pulldown-cmark event stream.
///
/// Runs of inline events are grouped into one [`Token::Inline`], so a heading is
/// always `Open`, `Inline`, `Close` (the inline run may be empty).
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Open {
        tag: Tag<'a>,
        attributes: Attributes,
    },
    Inline(Vec<Event<'a>>),
    Close(TagEnd),
    /// A block-level event without children, such as a rule or raw HTML.
    Leaf(Event<'a>),
}

impl Token<'_> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Open { .. } => TokenKind::Open,
            Token::Inline(_) => TokenKind::Inline,
            Token::Close(_) => TokenKind::Close,
            Token::Leaf(_) => TokenKind::Leaf,
        }
    }

    /// HTML tag name for heading tokens (`"h1"`..`"h6"`).
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Token::Open {
                tag: Tag::Heading { level, .. },
                ..
            }
            | Token::Close(TagEnd::Heading(level)) => Some(heading_tag(*level)),
            _ => None,
        }
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Start(tag) => is_inline_tag(tag),
        Event::End(end) => is_inline_end(end),
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineHtml(_)
        | Event::FootnoteReference(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::TaskListMarker(_) => true,
        _ => false,
    }
}

/// Group parser events into tokens.
pub fn tokenize<'a>(
    events: impl IntoIterator<Item = Event<'a>>,
) -> Result<Vec<Token<'a>>, RenderError> {
    let mut tokens = Vec::new();
    let mut inline = Vec::new();
    let mut open = Vec::new();

    for event in events {
        if is_inline(&event) {
            inline.push(event);
            continue;
        }
        if !inline.is_empty() {
            tokens.push(Token::Inline(std::mem::take(&mut inline)));
        }

        match event {
            Event::Start(tag) => {
                open.push(tag.to_end());
                tokens.push(Token::Open {
                    tag,
                    attributes: Attributes::default(),
                });
            }
            Event::End(end) => {
                // Empty headings and paragraphs still get their inline token
                if matches!(end, TagEnd::Heading(_) | TagEnd::Paragraph)
                    && matches!(tokens.last(), Some(Token::Open { .. }))
                {
                    tokens.push(Token::Inline(Vec::new()));
                }
                open.pop();
                tokens.push(Token::Close(end));
            }
            leaf => tokens.push(Token::Leaf(leaf)),
        }
    }

    if !inline.is_empty() {
        tokens.push(Token::Inline(inline));
    }
    match open.pop() {
        Some(end) => Err(RenderError::UnclosedBlock {
            tag: format!("{end:?}"),
        }),
        None => Ok(tokens),
    }
}

/// Index of the `Open` token matching the `Close` at `close`.
pub fn find_open(tokens: &[Token<'_>], close: usize) -> Option<usize> {
    if !matches!(tokens.get(close), Some(Token::Close(_))) {
        return None;
    }
    let mut depth = 0usize;
    for index in (0..close).rev() {
        match tokens.get(index) {
            Some(Token::Close(_)) => depth += 1,
            Some(Token::Open { .. }) if depth == 0 => return Some(index),
            Some(Token::Open { .. }) => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Placeholder written in front of a block whose attributes are injected after
/// rendering. Markdown text does not carry NUL characters.
fn block_marker(block: usize) -> String {
    format!("\0attrdown-block-{block}\0\n")
}

/// Flatten tokens back into events.
///
/// Headings carry their attributes in the tag. Any other block with attributes
/// is preceded by a marker event and its attributes are returned in marker order.
fn to_events<'t, 'a>(tokens: &'t [Token<'a>]) -> (Vec<Event<'a>>, Vec<&'t Attributes>) {
    let mut events = Vec::with_capacity(tokens.len());
    let mut blocks = Vec::new();

    for token in tokens {
        match token {
            Token::Open { tag, attributes } if matches!(tag, Tag::Heading { .. }) => {
                events.push(Event::Start(attributes.apply_to_heading(tag.clone())));
            }
            Token::Open { tag, attributes } => {
                if !attributes.is_empty() {
                    events.push(Event::Html(block_marker(blocks.len()).into()));
                    blocks.push(attributes);
                }
                events.push(Event::Start(tag.clone()));
            }
            Token::Inline(inline) => events.extend(inline.iter().cloned()),
            Token::Close(end) => events.push(Event::End(*end)),
            Token::Leaf(event) => events.push(event.clone()),
        }
    }

    (events, blocks)
}

/// Render tokens to HTML in one pass, so footnote numbering and table state are
/// shared by the whole stream.
pub fn render_html(tokens: &[Token<'_>]) -> String {
    let (events, blocks) = to_events(tokens);
    let mut html = String::new();
    push_html(&mut html, events.into_iter());
    if blocks.is_empty() {
        return html;
    }

    let mut out = String::with_capacity(html.len());
    let mut rest = html.as_str();
    for (block, attributes) in blocks.into_iter().enumerate() {
        let marker = block_marker(block);
        let Some(at) = rest.find(&marker) else {
            continue;
        };
        out.push_str(&rest[..at]);
        // The marker ends in a newline, which stops the writer emitting its own
        if !(out.is_empty() || out.ends_with('\n')) {
            out.push('\n');
        }
        rest = &rest[at + marker.len()..];

        let tag_end = rest.find('>').map_or(rest.len(), |offset| offset + 1);
        out.push_str(&attributes.inject_into(&rest[..tag_end]));
        rest = &rest[tag_end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Options, Parser};

    fn tokens_of(markdown: &str) -> Vec<Token<'_>> {
        tokenize(Parser::new_ext(markdown, Options::ENABLE_TABLES)).unwrap()
    }

    fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
        tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn test_heading_is_a_triple() {
        let tokens = tokens_of("## Hello *world*\n");

        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Open, TokenKind::Inline, TokenKind::Close]
        );
        assert_eq!(tokens[0].tag(), Some("h2"));
        assert_eq!(tokens[2].tag(), Some("h2"));
        assert!(matches!(&tokens[1], Token::Inline(inline) if inline.len() == 4));
    }

    #[test]
    fn test_empty_heading_gets_empty_inline() {
        let tokens = tokens_of("#\n");

        assert_eq!(tokens[1], Token::Inline(Vec::new()));
        assert_eq!(tokens[2].tag(), Some("h1"));
    }

    #[test]
    fn test_rule_is_a_leaf() {
        let tokens = tokens_of("a\n\n---\n");

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Open,
                TokenKind::Inline,
                TokenKind::Close,
                TokenKind::Leaf
            ]
        );
        assert_eq!(tokens[0].tag(), None);
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        let events = vec![Event::Start(Tag::Paragraph), Event::Text("dangling".into())];

        assert!(matches!(
            tokenize(events),
            Err(RenderError::UnclosedBlock { .. })
        ));
    }

    #[test]
    fn test_find_open_skips_nested_blocks() {
        let tokens = tokens_of("> quoted\n>\n> - item\n\nafter\n");

        // the quote holds a paragraph and a list before it closes at 9
        assert!(matches!(&tokens[9], Token::Close(_)));
        assert!(matches!(
            &tokens[10],
            Token::Open {
                tag: Tag::Paragraph,
                ..
            }
        ));
        assert_eq!(find_open(&tokens, 9), Some(0));
        assert_eq!(find_open(&tokens, 3), Some(1));
        assert_eq!(find_open(&tokens, 0), None);
    }

    #[test]
    fn test_round_trip_renders_same_html() {
        let markdown = "# T\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n\n- x\n- y\n";
        let mut direct = String::new();
        push_html(&mut direct, Parser::new_ext(markdown, Options::ENABLE_TABLES));

        assert_eq!(render_html(&tokens_of(markdown)), direct);
    }

    #[test]
    fn test_attributed_block_gets_attributes_in_place() {
        let mut tokens = tokens_of("Intro\n\nBody text\n");
        if let Token::Open { attributes, .. } = &mut tokens[3] {
            attributes.classes.push("lead".to_string());
        }

        assert_eq!(
            render_html(&tokens),
            "<p>Intro</p>\n<p class=\"lead\">Body text</p>\n"
        );
    }

    #[test]
    fn test_attributed_table_keeps_alignment() {
        // Given a table with column alignment
        let markdown = "| a | b |\n|:--|--:|\n| 1 | 2 |\n";
        let mut direct = String::new();
        push_html(&mut direct, Parser::new_ext(markdown, Options::ENABLE_TABLES));
        let mut tokens = tokens_of(markdown);
        if let Token::Open { attributes, .. } = &mut tokens[0] {
            attributes.id = Some("grid".to_string());
        }

        // When it is rendered with an id
        let html = render_html(&tokens);

        // Then only the opening tag changes
        assert_eq!(html, direct.replacen("<table>", "<table id=\"grid\">", 1));
    }

    #[test]
    fn test_nested_attributed_blocks() {
        let mut tokens = tokens_of("> - item\n");
        for index in [0, 1] {
            if let Token::Open { attributes, .. } = &mut tokens[index] {
                attributes.classes.push(format!("c{index}"));
            }
        }

        let html = render_html(&tokens);

        assert_eq!(
            html,
            "<blockquote class=\"c0\">\n<ul class=\"c1\">\n<li>item</li>\n</ul>\n</blockquote>\n"
        );
    }
}
