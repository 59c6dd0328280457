use std::io::{self, Write};

use crate::{
    error::Result,
    evaluator,
    inverted_index::{DocId, InvertedIndex},
    query::QueryParser,
};

/// Parse and evaluate one query.
///
/// Fails only with [`Error::MalformedQuery`](crate::Error::MalformedQuery);
/// a well-formed query always has an answer, possibly empty.
pub fn execute_search(
    parser: &QueryParser,
    index: &InvertedIndex,
    query: &str,
) -> Result<Vec<DocId>> {
    let expr = parser.parse(query)?;
    tracing::debug!(%expr, "parsed query");
    let ids = evaluator::evaluate(&expr, index);
    tracing::debug!(matches = ids.len(), "evaluated query");
    Ok(ids)
}

/// Render ids as a bracketed list: `[0, 3, 7]`, or `[]` when empty.
pub fn format_ids(ids: &[DocId]) -> String {
    let joined = ids
        .iter()
        .map(DocId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

/// Write the id list followed by one `id<TAB>url` line per match whose
/// source is known.
pub fn write_with_sources(
    out: &mut impl Write,
    ids: &[DocId],
    index: &InvertedIndex,
) -> io::Result<()> {
    writeln!(out, "{}", format_ids(ids))?;
    for &id in ids {
        if let Some(url) = index.source(id) {
            writeln!(out, "{id}\t{url}")?;
        }
    }
    Ok(())
}

/// Results as a single JSON object.
pub fn format_json(query: &str, ids: &[DocId], index: &InvertedIndex) -> String {
    let results: Vec<_> = ids
        .iter()
        .map(|&id| serde_json::json!({ "id": id, "url": index.source(id) }))
        .collect();
    serde_json::json!({
        "query": query,
        "result_count": ids.len(),
        "results": results,
    })
    .to_string()
}
