use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where the crawler leaves its pages when nothing else is configured.
pub const DEFAULT_CORPUS_DIR: &str = "Pages";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The BOOLSEARCH_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/boolsearch/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("BOOLSEARCH_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("boolsearch")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_cache(&self) -> PathBuf {
        self.root.join("index.json")
    }
}

/// Resolve the corpus directory: --corpus, then BOOLSEARCH_CORPUS_DIR, then
/// `./Pages`.
pub fn resolve_corpus_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        path.to_path_buf()
    } else if let Ok(val) = std::env::var("BOOLSEARCH_CORPUS_DIR") {
        PathBuf::from(val)
    } else {
        PathBuf::from(DEFAULT_CORPUS_DIR)
    }
}
