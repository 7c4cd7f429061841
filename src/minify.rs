use minify_html::{Cfg, minify};

/// Minifies a rendered page, including inline `<style>` and `<script>`. The opening `<html>`
/// and `<head>` tags are kept so injected meta tags stay in place.
pub fn minify_page(html: &str) -> String {
    let cfg = Cfg {
        do_not_minify_doctype: true,
        keep_html_and_head_opening_tags: true,
        minify_css: true,
        minify_js: true,
        ..Cfg::new()
    };
    String::from_utf8_lossy(&minify(html.as_bytes(), &cfg)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
  <head>
    <meta charset="utf-8">
    <style>
      body {
        color : red ;
      }
    </style>
  </head>
  <body>
    <p>
      hello    world
    </p>
  </body>
</html>
"#;

    #[test]
    fn collapses_whitespace_and_css() {
        let out = minify_page(PAGE);
        assert!(out.len() < PAGE.len());
        assert!(out.contains("hello world"));
        assert!(out.contains("color:red"));
        assert!(!out.contains("\n  "));
    }

    #[test]
    fn keeps_html_and_head_tags() {
        let out = minify_page(PAGE);
        assert!(out.contains("<html lang=ja>") || out.contains("<html lang=\"ja\">"));
        assert!(out.contains("<head>"));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(minify_page(PAGE), minify_page(PAGE));
    }
}
