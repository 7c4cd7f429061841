use std::{io::ErrorKind, path::Path, sync::Arc};

use serde::Serialize;
use tera::{Context, Tera};
use tokio::fs::read_to_string;
use tracing::info;
use url::Url;

use crate::{
    config::Config,
    error::{ContextExt, KijiErr},
    metadata::DateStyle,
    minify::minify_page,
};

pub const ARTICLE_TEMPLATE: &str = "article.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const LIST_TEMPLATE: &str = "list.html";
pub const SEARCH_TEMPLATE: &str = "search.html";

const REQUIRED_TEMPLATES: [&str; 4] = [
    ARTICLE_TEMPLATE,
    INDEX_TEMPLATE,
    LIST_TEMPLATE,
    SEARCH_TEMPLATE,
];

/// The page templates of a theme, loaded once before any page is rendered.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn load(template_path: &Path) -> Result<Self, KijiErr> {
        if !template_path.is_dir() {
            return Err(KijiErr::MissingAsset(template_path.to_owned()));
        }
        let templates = format!("{}/**/*.html", template_path.display());
        info!("initialize templates: {}", templates);
        let tera = Tera::new(&templates)?;

        for name in REQUIRED_TEMPLATES {
            if !tera.get_template_names().any(|loaded| loaded == name) {
                return Err(KijiErr::MissingAsset(template_path.join(name)));
            }
        }
        info!("template initialization complete");
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, KijiErr> {
        Ok(self.tera.render(name, context)?)
    }
}

/// Stylesheet and search script embedded verbatim into pages.
#[derive(Debug, Clone)]
pub struct Assets {
    pub css: Arc<str>,
    pub js: Arc<str>,
}

impl Assets {
    pub async fn load(style: &Path, script: &Path) -> Result<Self, KijiErr> {
        Ok(Self {
            css: read_asset(style).await?.into(),
            js: read_asset(script).await?.into(),
        })
    }
}

async fn read_asset(path: &Path) -> Result<String, KijiErr> {
    match read_to_string(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Err(KijiErr::MissingAsset(path.to_owned())),
        result => result.with_context(|| format!("read asset: {}", path.display())),
    }
}

/// Site-wide values available to every template as `site`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub domain: Option<Url>,
}

/// Everything a page builder needs besides the articles themselves.
#[derive(Debug)]
pub struct Theme {
    pub templates: Templates,
    pub assets: Assets,
    pub site: SiteInfo,
    pub dates: DateStyle,
}

impl Theme {
    /// Loads templates and assets named by `config`. A missing one fails the whole build here,
    /// before any output is written.
    pub async fn load(config: &Config) -> Result<Self, KijiErr> {
        Ok(Self {
            templates: Templates::load(&config.template_dir())?,
            assets: Assets::load(&config.style_path(), &config.script_path()).await?,
            site: SiteInfo {
                title: config.title.clone(),
                domain: config.domain.clone(),
            },
            dates: config.date_style(),
        })
    }

    /// Context shared by all pages: `site` and the inline `css`.
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("css", self.assets.css.as_ref());
        context
    }

    pub fn render_page(&self, template: &str, context: &Context) -> Result<String, KijiErr> {
        Ok(minify_page(&self.templates.render(template, context)?))
    }
}


#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{test_theme::crate_path, *};

    #[test]
    fn loads_shipped_templates() {
        assert!(Templates::load(&crate_path("templates")).is_ok());
    }

    #[test]
    fn missing_template_dir_is_missing_asset() {
        let dir = TempDir::new().unwrap();
        let err = Templates::load(&dir.path().join("templates")).unwrap_err();
        assert!(matches!(err, KijiErr::MissingAsset(_)));
    }

    #[test]
    fn missing_required_template_is_missing_asset() {
        let dir = TempDir::new().unwrap();
        for name in [ARTICLE_TEMPLATE, INDEX_TEMPLATE, LIST_TEMPLATE] {
            std::fs::write(dir.path().join(name), "<p>{{ css }}</p>").unwrap();
        }
        let err = Templates::load(dir.path()).unwrap_err();
        assert!(matches!(err, KijiErr::MissingAsset(path) if path.ends_with(SEARCH_TEMPLATE)));
    }

    #[tokio::test]
    async fn missing_stylesheet_is_missing_asset() {
        let dir = TempDir::new().unwrap();
        let err = Assets::load(&dir.path().join("style.css"), &crate_path("assets/js/search.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, KijiErr::MissingAsset(path) if path.ends_with("style.css")));
    }
}
