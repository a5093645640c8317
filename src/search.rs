//! Lexical chunk scoring, ranking, and prompt-context formatting.
//!
//! A chunk matches when the lower-cased query occurs in its lower-cased
//! text. Relevance is the number of non-overlapping occurrences divided by
//! the chunk's word count, so short dense matches outrank long chunks with
//! an incidental hit. Multi-word queries are matched as a single substring
//! and are not normalized by their own length.

use crate::models::{Document, SearchResult};

/// Separator placed between context blocks.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Relevance of `text` for an already lower-cased, non-empty query, or
/// `None` when the query does not occur.
pub fn relevance(text: &str, query_lower: &str) -> Option<f64> {
    if query_lower.is_empty() {
        return None;
    }
    let text_lower = text.to_lowercase();
    let occurrences = text_lower.matches(query_lower).count();
    if occurrences == 0 {
        return None;
    }
    let words = text_lower.split_whitespace().count();
    if words == 0 {
        return None;
    }
    Some(occurrences as f64 / words as f64)
}

/// Append a result for every chunk of `doc` that matches `query_lower`.
pub fn collect_matches(
    document_hash: &str,
    doc: &Document,
    query_lower: &str,
    out: &mut Vec<SearchResult>,
) {
    for chunk in &doc.chunks {
        if let Some(score) = relevance(&chunk.text, query_lower) {
            out.push(SearchResult {
                document_hash: document_hash.to_string(),
                filename: doc.filename().to_string(),
                chunk_index: chunk.chunk_index,
                text: chunk.text.clone(),
                relevance: score,
                metadata: chunk.metadata.clone(),
            });
        }
    }
}

/// Sort by relevance descending and keep the top `max_results`.
///
/// The sort is stable: equal scores keep their enumeration order.
pub fn rank(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(max_results);
    results
}

/// Render ranked results as the context string spliced into a prompt.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("[From: {}]\n{}", r.filename, r.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
