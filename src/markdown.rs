//! Markdown to HTML conversion with the common extensions switched on.

use pulldown_cmark::{Options, Parser, html as md_html};

/// Convert markdown to an HTML fragment.
///
/// Enables tables, footnotes, strikethrough, task lists, and heading
/// attributes. Raw HTML passes through untouched, which is what keeps
/// `<import>` directives intact for [`imports`](crate::imports).
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_heading() {
        assert_eq!(to_html("# Hi"), "<h1>Hi</h1>\n");
    }

    #[test]
    fn converts_emphasis() {
        let html = to_html("This is **bold** and *italic*.");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn tables_are_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn import_directive_passes_through() {
        let html = to_html("Intro\n\n<import src=\"snippet.html\">\n\nOutro\n");
        assert!(html.contains("<import src=\"snippet.html\">"));
    }

    #[test]
    fn inline_import_passes_through() {
        let html = to_html("See <import src='a.html'> here");
        assert!(html.contains("<import src='a.html'>"));
    }
}
