use std::{fmt, path::PathBuf, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

use crate::metadata::ArticleRecord;

const ID_LEN: usize = 14;
const ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Article identifier: the creation instant as `YYYYMMDDHHMMSS`. Lexicographic order on ids is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid article id {0:?}, expected 14 digits")]
pub struct InvalidArticleId(pub String);

impl ArticleId {
    pub fn from_datetime(at: &DateTime<FixedOffset>) -> Self {
        Self(at.format(ID_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ArticleId {
    type Err = InvalidArticleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidArticleId(s.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Markdown source of an article plus the directory holding its images.
#[derive(Debug, Clone)]
pub struct ArticleBody {
    pub markdown: String,
    pub images: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Article {
    pub record: ArticleRecord,
    pub body: ArticleBody,
}

impl Article {
    pub fn id(&self) -> &ArticleId {
        &self.record.id
    }
}
