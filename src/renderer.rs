use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    article::{Article, ArticleId},
    error::KijiErr,
    fs::{copy_dir_new, exists, write_file},
    markdown::to_html,
    metadata::ArticleView,
    store::IMAGES_DIR,
    templating::{ARTICLE_TEMPLATE, Theme},
};

/// Output directory of one article: `<root>/articles/<id>`.
pub fn article_output_dir(out_root: &Path, id: &ArticleId) -> PathBuf {
    out_root.join("articles").join(id.as_str())
}

/// Renders one article to `articles/<id>/index.html` and copies its images next to it.
#[derive(Debug)]
pub struct ArticleRenderer<'a> {
    theme: &'a Theme,
}

impl<'a> ArticleRenderer<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    /// The minified page. Same article in, same bytes out.
    pub fn render(&self, article: &Article) -> Result<String, KijiErr> {
        let mut context = self.theme.context();
        context.insert(
            "article",
            &ArticleView::new(&article.record, &self.theme.dates),
        );
        context.insert("article_content", &to_html(&article.body.markdown));
        self.theme.render_page(ARTICLE_TEMPLATE, &context)
    }

    /// Writes the page and copies the images directory. The copy never merges: an existing
    /// `images/` in the output fails with [`KijiErr::Conflict`].
    pub async fn write(&self, article: &Article, out_root: &Path) -> Result<PathBuf, KijiErr> {
        let dir = article_output_dir(out_root, article.id());
        let html = self.render(article)?;

        if exists(&article.body.images).await? {
            copy_dir_new(&article.body.images, &dir.join(IMAGES_DIR)).await?;
        } else {
            debug!("article {} has no images directory", article.id());
        }

        let path = dir.join("index.html");
        write_file(&path, html.as_bytes()).await?;
        Ok(path)
    }
}
