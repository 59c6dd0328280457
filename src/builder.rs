use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use rayon::prelude::*;

use crate::{
    index_cache::{self, IndexSettings},
    inverted_index::InvertedIndex,
    manifest::{Corpus, CorpusReadError, ManifestEntry},
    tokenizer::Tokenizer,
};

/// Observes a build as it goes through the manifest.
pub trait Progress: Send + Sync {
    fn start(&self, total: usize);
    /// One manifest entry has been indexed or skipped.
    fn advance(&self);
    fn finish(&self) {}
}

/// Knobs for a single index build.
#[derive(Clone, Default)]
pub struct BuildOptions {
    pub tokenizer: Tokenizer,
    /// Treat document files as page source and drop markup before
    /// tokenizing.
    pub strip_markup: bool,
    /// Set to stop the build before the next document is read.
    pub cancel: Option<Arc<AtomicBool>>,
    pub progress: Option<Arc<dyn Progress>>,
}

impl BuildOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn progress(&self) -> Option<&dyn Progress> {
        self.progress.as_deref()
    }

    /// The settings recorded alongside a cached index built with these
    /// options.
    pub fn settings(&self) -> IndexSettings {
        IndexSettings {
            alphabet: self.tokenizer.alphabet(),
            strip_markup: self.strip_markup,
        }
    }
}

/// What happened during a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub documents_indexed: usize,
    /// Documents and manifest lines that were skipped, sorted by id.
    pub failures: Vec<CorpusReadError>,
    /// The build stopped early; the index holds only part of the corpus.
    pub cancelled: bool,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub index: InvertedIndex,
    pub report: BuildReport,
}

/// Where the index returned by [`load_or_build`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOrigin {
    Cache,
    Built(BuildReport),
    /// Neither a cache nor a readable corpus manifest existed.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: InvertedIndex,
    pub origin: IndexOrigin,
}

#[derive(Default)]
struct Partial {
    index: InvertedIndex,
    indexed: usize,
    skipped: usize,
    failures: Vec<CorpusReadError>,
}

impl Partial {
    fn merge(mut self, other: Partial) -> Self {
        self.index.merge(other.index);
        self.indexed += other.indexed;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
        self
    }
}

/// Index every document listed in `corpus`.
///
/// Documents are read in parallel into per-worker partial indexes that are
/// merged at the end, so the result does not depend on scheduling. A
/// document that cannot be read is skipped and reported; it never fails the
/// build.
pub fn build(corpus: &Corpus, options: &BuildOptions) -> BuildOutcome {
    if let Some(progress) = options.progress() {
        progress.start(corpus.len());
    }

    let partial = corpus
        .entries()
        .par_iter()
        .fold(Partial::default, |mut acc, entry| {
            if options.is_cancelled() {
                acc.skipped += 1;
            } else {
                match read_terms(entry, options) {
                    Ok(terms) => {
                        acc.index.add(entry.doc_id, &terms);
                        acc.index.set_source(entry.doc_id, entry.url.as_str());
                        acc.indexed += 1;
                    }
                    Err(failure) => {
                        tracing::warn!("skipping {failure}");
                        acc.failures.push(failure);
                    }
                }
            }
            if let Some(progress) = options.progress() {
                progress.advance();
            }
            acc
        })
        .reduce(Partial::default, Partial::merge);

    if let Some(progress) = options.progress() {
        progress.finish();
    }

    let mut failures = corpus.failures().to_vec();
    for failure in corpus.failures() {
        tracing::warn!("skipping {failure}");
    }
    failures.extend(partial.failures);
    failures.sort_by(|a, b| {
        (a.doc_id, &a.path, &a.reason).cmp(&(b.doc_id, &b.path, &b.reason))
    });

    let report = BuildReport {
        documents_indexed: partial.indexed,
        failures,
        cancelled: partial.skipped > 0,
    };

    tracing::info!(
        corpus = %corpus.root().display(),
        documents = report.documents_indexed,
        terms = partial.index.term_count(),
        failures = report.failures.len(),
        cancelled = report.cancelled,
        "built index"
    );

    BuildOutcome {
        index: partial.index,
        report,
    }
}

fn read_terms(
    entry: &ManifestEntry,
    options: &BuildOptions,
) -> Result<Vec<String>, CorpusReadError> {
    let text = std::fs::read_to_string(&entry.path).map_err(|e| {
        CorpusReadError {
            doc_id: Some(entry.doc_id),
            path: entry.path.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok(if options.strip_markup {
        options.tokenizer.tokenize_html(&text)
    } else {
        options.tokenizer.tokenize(&text)
    })
}

/// Use the cached index at `cache_path` if it is valid, otherwise build from
/// the corpus at `corpus_dir` and cache the result.
pub fn load_or_build(
    corpus_dir: &Path,
    cache_path: &Path,
    options: &BuildOptions,
) -> LoadedIndex {
    if let Some(index) = index_cache::load(cache_path, options.settings()) {
        tracing::info!(
            path = %cache_path.display(),
            terms = index.term_count(),
            documents = index.document_count(),
            "loaded index cache"
        );
        return LoadedIndex {
            index,
            origin: IndexOrigin::Cache,
        };
    }

    rebuild(corpus_dir, cache_path, options)
}

/// Build from the corpus regardless of any cache, then save the result.
///
/// Only a complete build is saved. A missing manifest yields an empty index
/// and leaves the cache untouched so the next run tries again.
pub fn rebuild(
    corpus_dir: &Path,
    cache_path: &Path,
    options: &BuildOptions,
) -> LoadedIndex {
    let corpus = match Corpus::open(corpus_dir) {
        Ok(corpus) => corpus,
        Err(e) => {
            tracing::warn!("{e}, starting with an empty index");
            return LoadedIndex {
                index: InvertedIndex::new(),
                origin: IndexOrigin::Unavailable,
            };
        }
    };
    if corpus.is_empty() {
        tracing::warn!(
            corpus = %corpus.root().display(),
            "manifest lists no documents"
        );
    }

    let BuildOutcome { index, report } = build(&corpus, options);

    if report.is_complete() {
        if let Err(e) =
            index_cache::save(&index, options.settings(), cache_path)
        {
            tracing::warn!("index kept in memory only: {e}");
        }
    } else {
        tracing::warn!("build was interrupted, not caching a partial index");
    }

    LoadedIndex {
        index,
        origin: IndexOrigin::Built(report),
    }
}
