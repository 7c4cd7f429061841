use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::{
    error::KijiErr,
    fs::write_file,
    metadata::{ArticleRecord, ArticleView},
    templating::{INDEX_TEMPLATE, LIST_TEMPLATE, Theme},
};

/// Records ordered newest first. Ids are creation timestamps, so ordering by id is ordering
/// by creation.
pub fn newest_first<'r>(
    records: impl IntoIterator<Item = &'r ArticleRecord>,
) -> impl Iterator<Item = &'r ArticleRecord> {
    records
        .into_iter()
        .sorted_by(|a, b| b.id.cmp(&a.id))
}

fn render_listing<'r>(
    theme: &Theme,
    template: &str,
    records: impl Iterator<Item = &'r ArticleRecord>,
) -> Result<String, KijiErr> {
    let article_list: Vec<ArticleView> = records
        .map(|record| ArticleView::new(record, &theme.dates))
        .collect();
    let mut context = theme.context();
    context.insert("article_list", &article_list);
    theme.render_page(template, &context)
}

/// Landing page with the most recent articles.
#[derive(Debug)]
pub struct IndexBuilder<'a> {
    theme: &'a Theme,
    limit: usize,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(theme: &'a Theme, limit: usize) -> Self {
        Self { theme, limit }
    }

    pub fn render<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
    ) -> Result<String, KijiErr> {
        render_listing(
            self.theme,
            INDEX_TEMPLATE,
            newest_first(records).take(self.limit),
        )
    }

    pub async fn write<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
        out_root: &Path,
    ) -> Result<PathBuf, KijiErr> {
        let path = out_root.join("index.html");
        write_file(&path, self.render(records)?.as_bytes()).await?;
        Ok(path)
    }
}

/// Page listing every article.
#[derive(Debug)]
pub struct ListBuilder<'a> {
    theme: &'a Theme,
}

impl<'a> ListBuilder<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn render<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
    ) -> Result<String, KijiErr> {
        render_listing(self.theme, LIST_TEMPLATE, newest_first(records))
    }

    pub async fn write<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
        out_root: &Path,
    ) -> Result<PathBuf, KijiErr> {
        let path = out_root.join("list.html");
        write_file(&path, self.render(records)?.as_bytes()).await?;
        Ok(path)
    }
}
