use pulldown_cmark::{html, Parser};
use scraper::Html;

/// Converts a markdown event description into display-safe plain text: render
/// the markdown to HTML, keep only the text nodes (link text, never URLs or
/// attributes), then collapse whitespace. Idempotent, since the output
/// contains no markup for a second pass to act on.
pub fn sanitize_description(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    let mut rendered = String::new();
    html::push_html(&mut rendered, Parser::new(input));
    let fragment = Html::parse_fragment(&rendered);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    clean_text(&text)
}

pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
