use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    inverted_index::DocId,
};

/// Name of the manifest file inside a corpus directory.
pub const MANIFEST_FILE: &str = "index.txt";

/// One accepted document listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub doc_id: DocId,
    /// Page the crawler fetched the document from.
    pub url: String,
    /// File holding the document's extracted words.
    pub path: PathBuf,
}

/// A document that could not be read. The build skips it and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusReadError {
    pub doc_id: Option<DocId>,
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for CorpusReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.doc_id {
            Some(id) => write!(
                f,
                "document {id} ({}): {}",
                self.path.display(),
                self.reason
            ),
            None => write!(f, "{}: {}", self.path.display(), self.reason),
        }
    }
}

/// The crawler's output directory: a manifest plus one `<id>.txt` file per
/// document.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    entries: Vec<ManifestEntry>,
    failures: Vec<CorpusReadError>,
}

impl Corpus {
    /// Read the manifest of the corpus at `root`.
    ///
    /// Fails with [`Error::IndexUnavailable`] when the manifest itself is
    /// missing or unreadable. Bad lines are recorded in
    /// [`Corpus::failures`] rather than failing the whole corpus.
    pub fn open(root: &Path) -> Result<Self> {
        let manifest = root.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest).map_err(|e| {
            tracing::debug!(
                path = %manifest.display(),
                "cannot read manifest: {e}"
            );
            Error::IndexUnavailable(manifest.clone())
        })?;
        Ok(Self::parse(root, &content))
    }

    /// Build a corpus view from manifest text.
    pub fn parse(root: &Path, manifest: &str) -> Self {
        let manifest_path = root.join(MANIFEST_FILE);
        let mut entries = Vec::new();
        let mut failures = Vec::new();
        let mut seen = HashSet::new();

        for (line_no, line) in manifest.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok((doc_id, url)) => {
                    if !seen.insert(doc_id) {
                        failures.push(CorpusReadError {
                            doc_id: Some(doc_id),
                            path: manifest_path.clone(),
                            reason: format!(
                                "line {}: duplicate document id",
                                line_no + 1
                            ),
                        });
                        continue;
                    }
                    entries.push(ManifestEntry {
                        doc_id,
                        url: url.to_string(),
                        path: document_path(root, doc_id),
                    });
                }
                Err(reason) => failures.push(CorpusReadError {
                    doc_id: None,
                    path: manifest_path.clone(),
                    reason: format!("line {}: {reason}", line_no + 1),
                }),
            }
        }

        Self {
            root: root.to_path_buf(),
            entries,
            failures,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Manifest lines that could not be turned into entries.
    pub fn failures(&self) -> &[CorpusReadError] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Location of the words file for `doc_id`.
pub fn document_path(root: &Path, doc_id: DocId) -> PathBuf {
    root.join(format!("{doc_id}.txt"))
}

fn parse_line(line: &str) -> std::result::Result<(DocId, &str), String> {
    let (id, url) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| "expected `<id> <url>`".to_string())?;
    let doc_id = id
        .parse::<DocId>()
        .map_err(|e| format!("invalid document id {id:?}: {e}"))?;
    Ok((doc_id, url.trim()))
}
