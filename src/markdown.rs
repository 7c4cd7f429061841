use pulldown_cmark::{Options, Parser, html};

/// Converts an article body to HTML. Tables are enabled; any input produces some output.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_paragraphs() {
        let out = to_html("# タイトル\n\nまえがき\n");
        assert!(out.contains("<h1>タイトル</h1>"));
        assert!(out.contains("<p>まえがき</p>"));
    }

    #[test]
    fn renders_tables() {
        let out = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table>"));
        assert!(out.contains("<th>a</th>"));
        assert!(out.contains("<td>2</td>"));
    }

    #[test]
    fn tolerates_broken_markup() {
        let out = to_html("**unclosed [link](\n\n```\nno fence end");
        assert!(!out.is_empty());
    }
}
