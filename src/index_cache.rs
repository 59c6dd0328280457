//! On-disk cache of a built [`InvertedIndex`].
//!
//! The cache is a single JSON document. Maps and sets are ordered, so the
//! same index always serializes to the same bytes. The document records the
//! tokenizer settings it was built with; a cache built with other settings
//! is never reused.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    inverted_index::{DocId, InvertedIndex},
    tokenizer::Alphabet,
};

/// Bumped whenever the stored layout changes; other versions are ignored.
pub const FORMAT_VERSION: u32 = 2;

/// How document text was turned into terms. Queries are only comparable
/// with an index built under the same settings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct IndexSettings {
    pub alphabet: Alphabet,
    pub strip_markup: bool,
}

#[derive(Serialize)]
struct StoredIndexRef<'a> {
    version: u32,
    complete: bool,
    settings: IndexSettings,
    universe: &'a BTreeSet<DocId>,
    postings: &'a BTreeMap<String, BTreeSet<DocId>>,
    sources: &'a BTreeMap<DocId, String>,
}

#[derive(Deserialize)]
struct StoredIndex {
    version: u32,
    complete: bool,
    #[serde(default)]
    settings: IndexSettings,
    universe: BTreeSet<DocId>,
    postings: BTreeMap<String, BTreeSet<DocId>>,
    #[serde(default)]
    sources: BTreeMap<DocId, String>,
}

/// Result of a cheap look at the cache location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Missing,
    Present { bytes: u64 },
}

/// Check whether a cache file exists without reading it.
pub fn probe(path: &Path) -> CacheStatus {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => {
            CacheStatus::Present { bytes: meta.len() }
        }
        _ => CacheStatus::Missing,
    }
}

/// Write `index`, built under `settings`, to `path`.
///
/// The data goes to a sibling temp file first and is renamed into place, so
/// a crash mid-write never leaves a truncated cache behind.
pub fn save(
    index: &InvertedIndex,
    settings: IndexSettings,
    path: &Path,
) -> Result<()> {
    write_atomic(index, settings, path).map_err(|e| Error::Persistence {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

fn write_atomic(
    index: &InvertedIndex,
    settings: IndexSettings,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        let stored = StoredIndexRef {
            version: FORMAT_VERSION,
            complete: true,
            settings,
            universe: index.universe(),
            postings: index.postings_map(),
            sources: index.sources(),
        };
        serde_json::to_writer(&mut writer, &stored)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    std::fs::rename(&tmp, path)?;

    tracing::debug!(
        path = %path.display(),
        terms = index.term_count(),
        documents = index.document_count(),
        "saved index cache"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a cached index built under `settings`.
///
/// Returns `None` when there is nothing usable at `path`: no file, a read
/// or decode failure, a different format version, other tokenizer settings,
/// an incomplete build, or postings that reference documents outside the
/// universe. The caller is expected to rebuild in that case.
pub fn load(path: &Path, settings: IndexSettings) -> Option<InvertedIndex> {
    if probe(path) == CacheStatus::Missing {
        return None;
    }

    let stored = match read(path) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("ignoring unreadable index cache: {e}");
            return None;
        }
    };

    if stored.version != FORMAT_VERSION {
        tracing::info!(
            found = stored.version,
            expected = FORMAT_VERSION,
            "index cache has a different format version"
        );
        return None;
    }
    if stored.settings != settings {
        tracing::info!(
            cached = ?stored.settings,
            requested = ?settings,
            "index cache was built with other tokenizer settings"
        );
        return None;
    }
    if !stored.complete {
        tracing::warn!(path = %path.display(), "index cache is incomplete");
        return None;
    }

    let index = InvertedIndex::from_parts(
        stored.postings,
        stored.universe,
        stored.sources,
    );
    if index.is_none() {
        tracing::warn!(
            path = %path.display(),
            "index cache references unknown documents"
        );
    }
    index
}

fn read(path: &Path) -> Result<StoredIndex> {
    let parse = || -> Result<StoredIndex> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    };
    parse().map_err(|e| Error::Persistence {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
