use std::{io, path::PathBuf};

use thiserror::Error;

use crate::article::ArticleId;

#[derive(Error, Debug)]
pub enum KijiErr {
    #[error("Article {id} not found: {path}")]
    NotFound { id: ArticleId, path: PathBuf },
    #[error("Already exists: {0}")]
    Conflict(PathBuf),
    #[error("Malformed record {path}:\n {source}")]
    MalformedData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Missing asset: {0}")]
    MissingAsset(PathBuf),
    #[error("Config file not valid {path}:\n {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Tera error:\n {0}")]
    Template(#[from] tera::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{context}:\n {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl KijiErr {
    /// Process exit code for this error. 2 is left to clap for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            KijiErr::NotFound { .. } => 3,
            KijiErr::Conflict(_) => 4,
            KijiErr::MalformedData { .. } => 5,
            KijiErr::MissingAsset(_) => 6,
            _ => 1,
        }
    }
}

pub trait ContextExt<T> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, KijiErr>;
}

impl<T> ContextExt<T> for Result<T, io::Error> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, KijiErr> {
        self.map_err(|source| KijiErr::Io {
            context: f(),
            source,
        })
    }
}
