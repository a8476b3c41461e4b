use attrdown_engine::{HtmlGenerator, Outline, OutlineBuilder, RenderOptions, Renderer, normalize};
use pretty_assertions::assert_eq;

fn plain_generator() -> HtmlGenerator {
    HtmlGenerator::with_renderer(Renderer::without_highlighting(RenderOptions::default()))
}

fn generate(markdown: &str) -> (String, Outline) {
    let mut outline = Outline::new();
    let rendered = plain_generator()
        .generate(markdown, &mut [&mut outline])
        .unwrap();
    (rendered.html, outline)
}

#[test]
fn footnote_markers_stay_in_html_but_not_in_outline() {
    let (html, outline) = generate("# Intro[^n]\n\nBody.\n\n[^n]: A note.\n");

    assert!(html.contains("class=\"footnote-reference\""));
    assert!(html.contains("footnote-definition"));
    assert_eq!(outline.entries()[0].text, "Intro");
    assert!(outline.entries()[0].html.contains("footnote-reference"));
}

#[test]
fn footnotes_in_attributed_blocks_share_document_numbering() {
    // Given footnote references before and inside a block with attributes
    let markdown = "Plain[^b].\n\nStyled[^a]. {:.x}\n\n[^a]: A.\n[^b]: B.\n";

    // When the document is rendered
    let (html, _) = generate(markdown);

    // Then the styled reference takes the next number, not a fresh 1
    assert!(
        html.starts_with(concat!(
            "<p>Plain<sup class=\"footnote-reference\"><a href=\"#b\">1</a></sup>.</p>\n",
            "<p class=\"x\">Styled<sup class=\"footnote-reference\"><a href=\"#a\">2</a></sup>.</p>\n",
        )),
        "{html}"
    );
}

#[test]
fn table_attributes_land_on_the_table() {
    let (html, _) = generate("| a | b |\n|---|---|\n| 1 | 2 |\n{: .grid}\n\nAfter\n");

    assert!(html.starts_with("<table class=\"grid\">"), "{html}");
    assert!(!html.contains("{:"));
    assert!(html.ends_with("<p>After</p>\n"));
}

#[test]
fn defined_attribute_lists_are_applied() {
    let markdown = "{:callout: .callout style='color: red'}\n\nWatch out.\n{:callout}\n";

    let (html, _) = generate(markdown);

    assert_eq!(
        html,
        "<p class=\"callout\" style=\"color: red\">Watch out.</p>\n"
    );
}

#[test]
fn stacked_heading_attributes_merge_onto_the_heading() {
    let (html, outline) = generate("## Setup\n{:#setup}\n{: .step}\n\ntext\n");

    assert_eq!(
        html,
        "<h2 id=\"setup\" class=\"step\">Setup</h2>\n<p>text</p>\n"
    );
    assert_eq!(outline.entries()[0].id.as_deref(), Some("setup"));
}

#[test]
fn quotes_outside_attribute_blocks_are_escaped_not_rewritten() {
    let (html, _) = generate("Say 'hi' {:title='greeting'}\n");

    assert_eq!(html, "<p title=\"greeting\">Say &#39;hi&#39;</p>\n");
}

#[test]
fn outline_tree_nests_by_level() {
    let (_, outline) = generate("# A\n\n## A.1\n\n### A.1.a\n\n## A.2\n\n# B\n");

    let tree = outline.tree();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].children.len(), 2);
    assert_eq!(tree[0].children[0].children[0].text, "A.1.a");
    assert_eq!(tree[1].text, "B");
}

#[test]
fn every_builder_receives_the_same_headings() {
    // Given an outline and a builder that records levels
    struct Levels(Vec<u8>);
    impl OutlineBuilder for Levels {
        fn heading(&mut self, _text: &str, level: u8, _html: &str) {
            self.0.push(level);
        }
    }
    let mut outline = Outline::new();
    let mut levels = Levels(Vec::new());

    // When one document is generated for both
    plain_generator()
        .generate("# One\n\n### Three\n\n## Two\n", &mut [&mut outline, &mut levels])
        .unwrap();

    // Then each sees every heading
    assert_eq!(levels.0, vec![1, 3, 2]);
    assert_eq!(outline.entries().len(), 3);
}

#[test]
fn builders_do_not_leak_between_calls() {
    let generator = plain_generator();
    let mut first = Outline::new();
    let mut second = Outline::new();

    generator.generate("# First\n", &mut [&mut first]).unwrap();
    generator.generate("# Second\n", &mut [&mut second]).unwrap();

    assert_eq!(first.entries().len(), 1);
    assert_eq!(second.entries().len(), 1);
    assert_eq!(second.entries()[0].text, "Second");
}

#[test]
fn rendering_normalized_text_changes_nothing() {
    let markdown = "{:n: .note}\n# T\n{:n}\n\n- a\n  - b\n\n| x |\n|---|\n| 1 |\n{:n}\n";

    let (direct, _) = generate(markdown);
    let (again, _) = generate(&normalize(markdown));

    assert_eq!(again, direct);
}

#[test]
fn known_languages_are_highlighted() {
    let generator = HtmlGenerator::default();

    let html = generator
        .generate("```rust\nfn main() {}\n```\n", &mut [])
        .unwrap()
        .html;

    assert!(html.starts_with("<pre><code class=\"language-rust\"><span class=\"source rust\">"));
}

#[test]
fn unknown_languages_fall_back_to_escaped_code() {
    let generator = HtmlGenerator::default();

    let html = generator
        .generate("```nolang\n<x>\n```\n", &mut [])
        .unwrap()
        .html;

    assert_eq!(html, "<pre><code class=\"language-nolang\">&lt;x&gt;\n</code></pre>\n");
}

#[test]
fn generator_can_be_shared_between_threads() {
    // Given one generator borrowed by two threads
    let generator = plain_generator();

    // When each thread renders its own document
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["# Left\n", "# Right\n"]
            .into_iter()
            .map(|markdown| {
                let generator = &generator;
                scope.spawn(move || {
                    let mut outline = Outline::new();
                    generator.generate(markdown, &mut [&mut outline]).unwrap();
                    outline.entries()[0].text.clone()
                })
            })
            .collect();
        let texts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then each outline holds only its own heading
        assert_eq!(texts, vec!["Left", "Right"]);
    });
}
