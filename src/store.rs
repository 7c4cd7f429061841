use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs::{ReadDir, read_dir, read_to_string, remove_file, rename};
use tracing::{debug, info, warn};

use crate::{
    article::{Article, ArticleBody, ArticleId},
    error::{ContextExt, KijiErr},
    fs::{create_new_dir, ensure_dir, exists, write_file},
    metadata::ArticleRecord,
};

pub const RECORD_FILE: &str = "info.json";
pub const BODY_FILE: &str = "script.md";
pub const IMAGES_DIR: &str = "images";
/// Record written by `reset` before the directory is renamed.
const PENDING_RECORD_FILE: &str = "info.json.tmp";

const PLACEHOLDER_BODY: &str =
    "# タイトル\n\nまえがき\n\n## はじめに\n\nhogehoge\n\n## おわりに\n\nhogehoge\n";

/// The `articles/` source tree: one directory per article, named by its id.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    root: PathBuf,
}

impl ArticleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn article_dir(&self, id: &ArticleId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Creates a new article stamped with `now`: directory, empty `images/`, placeholder body,
    /// blank record. Fails with [`KijiErr::Conflict`] if an article already has that id.
    pub async fn create(&self, now: DateTime<FixedOffset>) -> Result<ArticleRecord, KijiErr> {
        ensure_dir(&self.root).await?;
        let record = ArticleRecord::new(now);
        let dir = self.article_dir(&record.id);

        create_new_dir(&dir).await?;
        create_new_dir(&dir.join(IMAGES_DIR)).await?;
        write_file(&dir.join(BODY_FILE), PLACEHOLDER_BODY.as_bytes()).await?;
        write_file(&dir.join(RECORD_FILE), &to_pretty_json(&record)?).await?;

        info!("created article {}", record.id);
        Ok(record)
    }

    /// Re-dates article `id` to `now`, renaming its directory to the new id.
    ///
    /// The new record is staged as `info.json.tmp` in the old directory, the directory is
    /// renamed, and the staged record is then moved over `info.json`. An interrupted reset is
    /// finished or rolled back by the next [`ArticleStore::load`].
    pub async fn reset(
        &self,
        id: &ArticleId,
        now: DateTime<FixedOffset>,
    ) -> Result<ArticleRecord, KijiErr> {
        let old_dir = self.article_dir(id);
        let mut record = self.read_record(id).await?;
        record.redate(now);

        let new_dir = self.article_dir(&record.id);
        if exists(&new_dir).await? {
            return Err(KijiErr::Conflict(new_dir));
        }

        write_file(&old_dir.join(PENDING_RECORD_FILE), &to_pretty_json(&record)?).await?;
        rename(&old_dir, &new_dir).await.with_context(|| {
            format!("rename {} to {}", old_dir.display(), new_dir.display())
        })?;
        commit_pending(&new_dir).await?;

        info!("reset article {} to {}", id, record.id);
        Ok(record)
    }

    /// Lazily yields the ids of every directory under the store root whose name is a valid
    /// article id, in filesystem order. A missing root yields nothing.
    pub async fn list_ids(&self) -> Result<ArticleIds, KijiErr> {
        let entries = match read_dir(&self.root).await {
            Ok(entries) => Some(entries),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("articles directory {} does not exist", self.root.display());
                None
            }
            Err(e) => Err(e).with_context(|| format!("read directory: {}", self.root.display()))?,
        };
        Ok(ArticleIds {
            root: self.root.clone(),
            entries,
        })
    }

    pub async fn load(&self, id: &ArticleId) -> Result<Article, KijiErr> {
        let dir = self.article_dir(id);
        let record = self.read_record(id).await?;
        let markdown = read_or_not_found(id, &dir.join(BODY_FILE)).await?;
        Ok(Article {
            record,
            body: ArticleBody {
                markdown,
                images: dir.join(IMAGES_DIR),
            },
        })
    }

    async fn read_record(&self, id: &ArticleId) -> Result<ArticleRecord, KijiErr> {
        let dir = self.article_dir(id);
        if !exists(&dir).await? {
            return Err(KijiErr::NotFound {
                id: id.clone(),
                path: dir,
            });
        }
        recover_pending(id, &dir).await?;

        let path = dir.join(RECORD_FILE);
        let contents = read_or_not_found(id, &path).await?;
        let record: ArticleRecord = serde_json::from_str(&contents)
            .map_err(|source| KijiErr::MalformedData { path, source })?;
        if &record.id != id {
            warn!(
                "record in {} has id {}, directory name wins",
                dir.display(),
                record.id
            );
        }
        Ok(ArticleRecord {
            id: id.clone(),
            ..record
        })
    }
}

/// Lazy sequence of article ids, see [`ArticleStore::list_ids`].
#[derive(Debug)]
pub struct ArticleIds {
    root: PathBuf,
    entries: Option<ReadDir>,
}

impl ArticleIds {
    pub async fn next(&mut self) -> Result<Option<ArticleId>, KijiErr> {
        let Some(entries) = self.entries.as_mut() else {
            return Ok(None);
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("read directory: {}", self.root.display()))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match name.parse::<ArticleId>() {
                Ok(id) if entry.path().is_dir() => return Ok(Some(id)),
                _ => debug!("skip {} in {}", name, self.root.display()),
            }
        }
        Ok(None)
    }

    pub async fn into_vec(mut self) -> Result<Vec<ArticleId>, KijiErr> {
        let mut ids = vec![];
        while let Some(id) = self.next().await? {
            ids.push(id);
        }
        Ok(ids)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, KijiErr> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

async fn read_or_not_found(id: &ArticleId, path: &Path) -> Result<String, KijiErr> {
    match read_to_string(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Err(KijiErr::NotFound {
            id: id.clone(),
            path: path.to_owned(),
        }),
        result => result.with_context(|| format!("read file: {}", path.display())),
    }
}

async fn commit_pending(dir: &Path) -> Result<(), KijiErr> {
    let pending = dir.join(PENDING_RECORD_FILE);
    let record = dir.join(RECORD_FILE);
    rename(&pending, &record)
        .await
        .with_context(|| format!("rename {} to {}", pending.display(), record.display()))
}

/// Finishes or discards a reset that stopped half way. A staged record whose id matches the
/// directory means the rename happened and only the commit is missing.
async fn recover_pending(id: &ArticleId, dir: &Path) -> Result<(), KijiErr> {
    let pending = dir.join(PENDING_RECORD_FILE);
    if !exists(&pending).await? {
        return Ok(());
    }
    let staged = read_to_string(&pending)
        .await
        .with_context(|| format!("read file: {}", pending.display()))?;
    match serde_json::from_str::<ArticleRecord>(&staged) {
        Ok(record) if &record.id == id => {
            warn!("completing interrupted reset of {}", id);
            commit_pending(dir).await
        }
        _ => {
            warn!("discarding stale {}", pending.display());
            remove_file(&pending)
                .await
                .with_context(|| format!("remove file: {}", pending.display()))
        }
    }
}
