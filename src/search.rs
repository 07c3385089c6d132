use std::sync::Arc;

use crate::{bm25::DocumentStats, store::Document, tokenizer::tokenize};

/// Score assigned to fallback results.
///
/// A genuine match always scores above [`crate::bm25::PRESENCE_BONUS`], so
/// this value can only come from the fallback path.
pub const FALLBACK_SCORE: f64 = 0.01;

/// Passages taken from each document when building fallback results.
pub const DEFAULT_FALLBACK_PASSAGES: usize = 2;

/// Result count callers use when they have no preference.
pub const DEFAULT_TOP_K: usize = 3;

/// One ranked passage.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub document: Arc<Document>,
    /// Copy of `document.passages[passage_index]`.
    pub passage: String,
    pub passage_index: usize,
    pub score: f64,
}

impl SearchResult {
    /// Whether this result is a fallback placeholder rather than a match.
    pub fn is_fallback(&self) -> bool {
        self.score.to_bits() == FALLBACK_SCORE.to_bits()
    }
}

/// A document paired with its precomputed BM25 statistics.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub document: Arc<Document>,
    pub stats: DocumentStats,
}

impl IndexedDocument {
    pub fn new(document: Document) -> Self {
        let stats = DocumentStats::new(&document.passages);
        Self {
            document: Arc::new(document),
            stats,
        }
    }
}

/// Rank every passage in `documents` against `query`.
///
/// Tokenizes `query` and delegates to [`rank_terms`].
pub fn rank(
    documents: &[IndexedDocument],
    query: &str,
    top_k: usize,
    fallback_per_document: usize,
) -> Vec<SearchResult> {
    rank_terms(documents, &tokenize(query), top_k, fallback_per_document)
}

/// Rank every passage in `documents` against already tokenized query terms.
///
/// 1. No terms means no results (and no fallback).
/// 2. Score each passage against its own document's passages.
/// 3. Keep positive scores, sort descending (stable, so ties stay in
///    document then passage order) and take `top_k`.
/// 4. If nothing matched, return up to `fallback_per_document` leading
///    passages of each document, scored [`FALLBACK_SCORE`], capped at
///    `top_k`.
pub fn rank_terms(
    documents: &[IndexedDocument],
    query_terms: &[String],
    top_k: usize,
    fallback_per_document: usize,
) -> Vec<SearchResult> {
    if query_terms.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    for indexed in documents {
        for (index, passage) in indexed.document.passages.iter().enumerate() {
            let score = indexed.stats.score_passage(query_terms, index);
            if score > 0.0 {
                results.push(SearchResult {
                    document: Arc::clone(&indexed.document),
                    passage: passage.clone(),
                    passage_index: index,
                    score,
                });
            }
        }
    }

    if results.is_empty() {
        return fallback(documents, top_k, fallback_per_document);
    }

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}

fn fallback(
    documents: &[IndexedDocument],
    top_k: usize,
    per_document: usize,
) -> Vec<SearchResult> {
    documents
        .iter()
        .flat_map(|indexed| {
            indexed
                .document
                .passages
                .iter()
                .take(per_document)
                .enumerate()
                .map(|(index, passage)| SearchResult {
                    document: Arc::clone(&indexed.document),
                    passage: passage.clone(),
                    passage_index: index,
                    score: FALLBACK_SCORE,
                })
        })
        .take(top_k)
        .collect()
}
