use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::article::ArticleId;

/// Contents of an article's `info.json`.
#[derive(Debug, PartialEq, Serialize, Clone, Deserialize, Eq)]
pub struct ArticleRecord {
    pub id: ArticleId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl ArticleRecord {
    /// Blank record for an article created at `at`.
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self {
            id: ArticleId::from_datetime(&at),
            title: String::new(),
            description: String::new(),
            image: String::new(),
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    /// Moves the record to a new creation instant. Id and both timestamps change together.
    pub fn redate(&mut self, at: DateTime<FixedOffset>) {
        self.id = ArticleId::from_datetime(&at);
        self.created_at = at;
        self.updated_at = at;
    }
}

/// Current instant in `offset`, truncated to whole seconds.
pub fn now_in(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset).trunc_subsecs(0)
}

/// How dates are shown on rendered pages. The format is validated when the config is loaded.
#[derive(Debug, Clone)]
pub struct DateStyle {
    format: String,
}

impl DateStyle {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self, at: &DateTime<FixedOffset>) -> String {
        at.format(&self.format).to_string()
    }
}

/// A record together with its display-only fields. Built fresh on every build, never written
/// back to `info.json`.
#[derive(Debug, Serialize)]
pub struct ArticleView<'a> {
    #[serde(flatten)]
    pub record: &'a ArticleRecord,
    pub formatted_created_at: String,
    pub formatted_updated_at: String,
    pub tags_as_text: String,
}

impl<'a> ArticleView<'a> {
    pub fn new(record: &'a ArticleRecord, dates: &DateStyle) -> Self {
        Self {
            record,
            formatted_created_at: dates.format(&record.created_at),
            formatted_updated_at: dates.format(&record.updated_at),
            tags_as_text: record.tags.join(", "),
        }
    }
}
