use std::collections::{BTreeMap, BTreeSet};

/// Document identifier as assigned by the crawler's manifest.
pub type DocId = u64;

static EMPTY: BTreeSet<DocId> = BTreeSet::new();

/// Term to posting-set mapping plus the universe of known documents.
///
/// Every id in a posting set is also in the universe; `add` is the only way
/// to grow either, so the invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: BTreeMap<String, BTreeSet<DocId>>,
    universe: BTreeSet<DocId>,
    sources: BTreeMap<DocId, String>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `doc_id` contains each of `terms`. Adding the same
    /// document twice is a no-op; a document with no terms still joins the
    /// universe.
    pub fn add<I, S>(&mut self, doc_id: DocId, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.universe.insert(doc_id);
        for term in terms {
            let term = term.as_ref();
            if let Some(set) = self.postings.get_mut(term) {
                set.insert(doc_id);
            } else {
                self.postings
                    .insert(term.to_string(), BTreeSet::from([doc_id]));
            }
        }
    }

    /// Remember where a document came from. Purely informational.
    pub fn set_source(&mut self, doc_id: DocId, url: impl Into<String>) {
        self.sources.insert(doc_id, url.into());
    }

    pub fn source(&self, doc_id: DocId) -> Option<&str> {
        self.sources.get(&doc_id).map(String::as_str)
    }

    /// Posting set for `term`; unknown terms yield the empty set.
    pub fn postings(&self, term: &str) -> &BTreeSet<DocId> {
        self.postings.get(term).unwrap_or(&EMPTY)
    }

    pub fn universe(&self) -> &BTreeSet<DocId> {
        &self.universe
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn document_count(&self) -> usize {
        self.universe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universe.is_empty()
    }

    /// Union another index into this one. Merging is commutative and
    /// associative, so partial indexes can be combined in any order.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (term, ids) in other.postings {
            self.postings.entry(term).or_default().extend(ids);
        }
        self.universe.extend(other.universe);
        self.sources.extend(other.sources);
    }

    pub(crate) fn postings_map(&self) -> &BTreeMap<String, BTreeSet<DocId>> {
        &self.postings
    }

    pub(crate) fn sources(&self) -> &BTreeMap<DocId, String> {
        &self.sources
    }

    /// Reassemble an index from stored parts. Returns `None` when a posting
    /// set mentions a document outside the universe.
    pub(crate) fn from_parts(
        postings: BTreeMap<String, BTreeSet<DocId>>,
        universe: BTreeSet<DocId>,
        sources: BTreeMap<DocId, String>,
    ) -> Option<Self> {
        let consistent = postings
            .values()
            .all(|ids| ids.is_subset(&universe));
        consistent.then_some(Self {
            postings,
            universe,
            sources,
        })
    }
}
