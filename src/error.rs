use std::path::PathBuf;

use crate::query::QueryError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed query: {0}")]
    MalformedQuery(#[from] QueryError),

    #[error("no corpus manifest available at {0}")]
    IndexUnavailable(PathBuf),

    #[error("index cache error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}
