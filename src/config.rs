use std::{
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{
    FixedOffset,
    format::{Item, StrftimeItems},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::{ContextExt, KijiErr},
    metadata::DateStyle,
};

pub const CONFIG_FILE: &str = "kiji.yaml";

fn default_articles_path() -> PathBuf {
    "articles".into()
}

fn default_dist_path() -> PathBuf {
    "public".into()
}

fn default_template() -> PathBuf {
    "templates".into()
}

fn default_style() -> PathBuf {
    "assets/css/style.css".into()
}

fn default_script() -> PathBuf {
    "assets/js/search.js".into()
}

fn default_site_files() -> PathBuf {
    "site".into()
}

fn default_icons() -> PathBuf {
    "assets/icons".into()
}

fn default_utc_offset() -> i32 {
    9 * 3600
}

fn default_date_format() -> String {
    "%Y年%m月%d日 %H:%M".into()
}

fn default_index_size() -> usize {
    3
}

/// Contents of `kiji.yaml`. Every key is optional; relative paths are resolved against the
/// project directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub root: PathBuf,
    #[serde(default = "default_articles_path")]
    pub articles_path: PathBuf,
    #[serde(default = "default_dist_path")]
    pub dist_path: PathBuf,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_style")]
    pub style: PathBuf,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default = "default_site_files")]
    pub site_files: PathBuf,
    #[serde(default = "default_icons")]
    pub icons: PathBuf,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: Option<Url>,
    /// Seconds east of UTC used for new article ids and timestamps.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: i32,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// How many articles the landing page shows.
    #[serde(default = "default_index_size")]
    pub index_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            articles_path: default_articles_path(),
            dist_path: default_dist_path(),
            template: default_template(),
            style: default_style(),
            script: default_script(),
            site_files: default_site_files(),
            icons: default_icons(),
            title: String::new(),
            domain: None,
            utc_offset: default_utc_offset(),
            date_format: default_date_format(),
            index_size: default_index_size(),
        }
    }
}

impl TryFrom<PathBuf> for Config {
    type Error = KijiErr;
    fn try_from(value: PathBuf) -> Result<Self, KijiErr> {
        let config_path = value.join(CONFIG_FILE);
        let mut config: Config = match File::open(&config_path) {
            Ok(f) => serde_yaml::from_reader(f).map_err(|source| KijiErr::Config {
                path: config_path,
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => Err(e).with_context(|| format!("config file: {}", config_path.display()))?,
        };
        config.root = value;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), KijiErr> {
        self.offset()?;
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(KijiErr::InvalidConfig(format!(
                "date_format {:?} is not a valid strftime format",
                self.date_format
            )));
        }
        if self.index_size == 0 {
            return Err(KijiErr::InvalidConfig("index_size must be at least 1".into()));
        }
        self.check_dist_dir()
    }

    /// `build --clean` removes the output root, so it may not hold the config file, the
    /// articles or any part of the theme.
    fn check_dist_dir(&self) -> Result<(), KijiErr> {
        let dist = self.dist_dir();
        let sources = [
            self.root.join(CONFIG_FILE),
            self.articles_dir(),
            self.template_dir(),
            self.style_path(),
            self.script_path(),
            self.site_files_dir(),
            self.icons_dir(),
        ];
        match sources.iter().find(|source| source.starts_with(&dist)) {
            Some(source) => Err(KijiErr::InvalidConfig(format!(
                "dist_path {} contains {}",
                dist.display(),
                source.display()
            ))),
            None => Ok(()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn offset(&self) -> Result<FixedOffset, KijiErr> {
        FixedOffset::east_opt(self.utc_offset).ok_or_else(|| {
            KijiErr::InvalidConfig(format!("utc_offset {} is out of range", self.utc_offset))
        })
    }

    pub fn date_style(&self) -> DateStyle {
        DateStyle::new(self.date_format.clone())
    }

    pub fn articles_dir(&self) -> PathBuf {
        self.resolve(&self.articles_path)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.resolve(&self.dist_path)
    }

    pub fn template_dir(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    pub fn style_path(&self) -> PathBuf {
        self.resolve(&self.style)
    }

    pub fn script_path(&self) -> PathBuf {
        self.resolve(&self.script)
    }

    pub fn site_files_dir(&self) -> PathBuf {
        self.resolve(&self.site_files)
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.resolve(&self.icons)
    }
}
