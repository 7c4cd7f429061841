use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::KijiErr,
    fs::write_file,
    metadata::{ArticleRecord, ArticleView},
    templating::{SEARCH_TEMPLATE, Theme},
};

/// Contents of `static/search.json`: everything the client script filters on.
#[derive(Debug, Serialize)]
pub struct SearchData<'a> {
    pub articles: Vec<ArticleView<'a>>,
}

/// Search data plus the tags offered by the search page. Articles keep the order they were
/// given in; the tag set is deduplicated and sorted.
#[derive(Debug)]
pub struct SearchIndex<'a> {
    pub data: SearchData<'a>,
    pub tags: BTreeSet<&'a str>,
}

impl<'a> SearchIndex<'a> {
    pub fn collect(
        records: impl IntoIterator<Item = &'a ArticleRecord>,
        theme: &Theme,
    ) -> Self {
        let mut articles = vec![];
        let mut tags = BTreeSet::new();
        for record in records {
            tags.extend(record.tags.iter().map(String::as_str));
            articles.push(ArticleView::new(record, &theme.dates));
        }
        Self {
            data: SearchData { articles },
            tags,
        }
    }
}

/// Both search artifacts. They are only ever produced and written together.
#[derive(Debug)]
pub struct SearchArtifacts {
    pub data: String,
    pub page: String,
}

#[derive(Debug)]
pub struct SearchIndexBuilder<'a> {
    theme: &'a Theme,
}

impl<'a> SearchIndexBuilder<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn render<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
    ) -> Result<SearchArtifacts, KijiErr> {
        let index = SearchIndex::collect(records, self.theme);

        let mut context = self.theme.context();
        context.insert("js", self.theme.assets.js.as_ref());
        context.insert("tag_list", &index.tags);

        Ok(SearchArtifacts {
            data: serde_json::to_string(&index.data)?,
            page: self.theme.render_page(SEARCH_TEMPLATE, &context)?,
        })
    }

    /// Writes `static/search.json`, then `search.html`, so the page never points at data
    /// older than itself.
    pub async fn write<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ArticleRecord>,
        out_root: &Path,
    ) -> Result<(PathBuf, PathBuf), KijiErr> {
        let artifacts = self.render(records)?;
        let data_path = out_root.join("static").join("search.json");
        let page_path = out_root.join("search.html");
        write_file(&data_path, artifacts.data.as_bytes()).await?;
        write_file(&page_path, artifacts.page.as_bytes()).await?;
        Ok((data_path, page_path))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::templating::test_theme::theme;

    fn record(second: u32, tags: &[&str]) -> ArticleRecord {
        let at = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, second)
            .unwrap();
        let mut record = ArticleRecord::new(at);
        record.title = format!("article {second}");
        record.tags = tags.iter().map(|t| t.to_string()).collect();
        record
    }

    #[tokio::test]
    async fn tags_are_deduplicated_across_articles() {
        let theme = theme().await;
        let records = vec![record(1, &["go", "rust"]), record(2, &["rust", "web"])];
        let index = SearchIndex::collect(&records, &theme);
        assert_eq!(index.tags, BTreeSet::from(["go", "rust", "web"]));
    }

    #[tokio::test]
    async fn data_keeps_per_article_tags_and_given_order() {
        let theme = theme().await;
        let records = vec![
            record(2, &["rust", "web", "rust"]),
            record(1, &["go", "rust"]),
        ];
        let artifacts = SearchIndexBuilder::new(&theme).render(&records).unwrap();
        let data: Value = serde_json::from_str(&artifacts.data).unwrap();
        let articles = data["articles"].as_array().unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0]["id"], "20240101000002");
        assert_eq!(articles[0]["tags"], serde_json::json!(["rust", "web", "rust"]));
        assert_eq!(articles[1]["tags"], serde_json::json!(["go", "rust"]));
        assert_eq!(articles[1]["title"], "article 1");
        assert_eq!(articles[1]["formatted_created_at"], "2024年01月01日 00:00");
        assert_eq!(articles[1]["created_at"], "2024-01-01T00:00:01+09:00");
    }

    #[tokio::test]
    async fn page_offers_each_tag_once() {
        let theme = theme().await;
        let records = vec![record(1, &["go", "rust"]), record(2, &["rust", "web"])];
        let page = SearchIndexBuilder::new(&theme).render(&records).unwrap().page;
        for tag in ["go", "rust", "web"] {
            let marker = format!("data-tag={tag}");
            let quoted = format!("data-tag=\"{tag}\"");
            let count = page.matches(&marker).count() + page.matches(&quoted).count();
            assert_eq!(count, 1, "{tag} in {page}");
        }
    }

    #[tokio::test]
    async fn writes_both_artifacts() {
        let theme = theme().await;
        let dir = TempDir::new().unwrap();
        let records = vec![record(1, &["go"])];
        let (data, page) = SearchIndexBuilder::new(&theme)
            .write(&records, dir.path())
            .await
            .unwrap();
        assert_eq!(data, dir.path().join("static/search.json"));
        assert_eq!(page, dir.path().join("search.html"));
        assert!(data.is_file() && page.is_file());
    }
}
