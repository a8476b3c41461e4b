// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let mut content = String::from("{:note: .note data-kind='aside'}\n\n");
    let base = "# Title\n{:#title}\n\n## Section {:note}\n\nParagraph with some content.\n{: .lead}\n\n- Bullet point\n  - Nested item\n- Another item\n\n| a | b |\n|---|---|\n| 1 | 2 |\n{: .grid}\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    content.push_str(&base.repeat(size));
    content
}
