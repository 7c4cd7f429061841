use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::{
    article::Article,
    config::Config,
    error::KijiErr,
    fs::{copy_dir_into, ensure_dir, exists, remove_dir_if_exists},
    pages::{IndexBuilder, ListBuilder},
    renderer::{ArticleRenderer, article_output_dir},
    search::SearchIndexBuilder,
    store::ArticleStore,
    templating::Theme,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub articles: usize,
    pub dist_path: PathBuf,
}

/// Full rebuild of the output tree from the article sources.
///
/// Theme and articles are loaded first, so a missing asset or a broken article aborts the run
/// before anything is rendered. Every later step works from that one snapshot:
/// articles, then index, list and search, then the verbatim static copies.
pub async fn build(config: &Config, clean: bool) -> Result<BuildReport, KijiErr> {
    config.validate()?;
    let dist_path = config.dist_dir();
    let theme = Theme::load(config).await?;
    let store = ArticleStore::new(config.articles_dir());

    if clean {
        info!("remove directory: {}", dist_path.display());
        remove_dir_if_exists(&dist_path).await?;
    }
    ensure_dir(&dist_path).await?;

    let ids = store.list_ids().await?.into_vec().await?;
    info!("load {} articles", ids.len());
    let mut articles: Vec<Article> = Vec::with_capacity(ids.len());
    for id in &ids {
        articles.push(store.load(id).await?);
    }

    info!("render articles");
    let renderer = ArticleRenderer::new(&theme);
    for article in &articles {
        remove_dir_if_exists(&article_output_dir(&dist_path, article.id())).await?;
        let path = renderer.write(article, &dist_path).await?;
        debug!("rendered {}", path.display());
    }

    let records = || articles.iter().map(|article| &article.record);

    info!("render index and list pages");
    IndexBuilder::new(&theme, config.index_size)
        .write(records(), &dist_path)
        .await?;
    ListBuilder::new(&theme).write(records(), &dist_path).await?;

    info!("render search page and data");
    SearchIndexBuilder::new(&theme)
        .write(records(), &dist_path)
        .await?;

    info!("copy static files");
    copy_if_present(&config.site_files_dir(), &dist_path).await?;
    copy_if_present(&config.icons_dir(), &dist_path.join("static")).await?;

    info!("built {} articles into {}", articles.len(), dist_path.display());
    Ok(BuildReport {
        articles: articles.len(),
        dist_path,
    })
}

async fn copy_if_present(src: &std::path::Path, dst: &std::path::Path) -> Result<(), KijiErr> {
    if exists(src).await? {
        copy_dir_into(src, dst).await
    } else {
        warn!("{} does not exist, nothing copied", src.display());
        Ok(())
    }
}
