//! BM25 passage scoring.
//!
//! Corpus statistics are scoped to a single document: a passage is scored
//! against its sibling passages, not the whole knowledge base. On top of the
//! classic BM25 sum, any passage matching at least one query term receives a
//! partial-match bonus proportional to the fraction of query terms it
//! contains plus a flat presence bonus. With only a handful of passages per
//! document the IDF term is noisy (a term found in every sibling has an IDF
//! of zero), and the bonuses keep such passages above zero.

use std::collections::{HashMap, HashSet};

use crate::tokenizer::tokenize;

/// Term-frequency saturation.
pub const K1: f64 = 1.2;

/// Length normalization strength.
pub const B: f64 = 0.75;

/// Weight of the matched-terms / query-terms ratio added to a matching passage.
pub const PARTIAL_MATCH_WEIGHT: f64 = 0.5;

/// Flat bonus added to any passage matching at least one query term.
pub const PRESENCE_BONUS: f64 = 0.1;

/// Score `passage` against `query_terms`, using `siblings` as the corpus.
///
/// This recomputes every statistic from scratch. The engine uses
/// [`DocumentStats`], which produces the same numbers from statistics built
/// once per reindex.
pub fn score(query_terms: &[String], passage: &str, siblings: &[String]) -> f64 {
    let passage_terms = tokenize(passage);
    let term_freq = term_frequencies(&passage_terms);
    let sibling_terms: Vec<Vec<String>> =
        siblings.iter().map(|p| tokenize(p)).collect();
    let lengths: Vec<usize> = sibling_terms.iter().map(Vec::len).collect();

    accumulate(
        query_terms,
        &term_freq,
        passage_terms.len(),
        average_length(&lengths),
        siblings.len(),
        |term| {
            sibling_terms
                .iter()
                .filter(|terms| terms.iter().any(|t| t == term))
                .count()
        },
    )
}

/// Per-passage token statistics.
#[derive(Debug, Clone)]
struct PassageStats {
    term_freq: HashMap<String, usize>,
    length: usize,
}

/// BM25 statistics for the passages of one document.
#[derive(Debug, Clone)]
pub struct DocumentStats {
    passages: Vec<PassageStats>,
    doc_freq: HashMap<String, usize>,
    avg_length: f64,
}

impl DocumentStats {
    /// Tokenize every passage once and collect the statistics BM25 needs.
    pub fn new(passages: &[String]) -> Self {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let stats: Vec<PassageStats> = passages
            .iter()
            .map(|passage| {
                let terms = tokenize(passage);
                let term_freq = term_frequencies(&terms);
                for term in term_freq.keys() {
                    *doc_freq.entry(term.clone()).or_default() += 1;
                }
                PassageStats {
                    term_freq,
                    length: terms.len(),
                }
            })
            .collect();

        let lengths: Vec<usize> = stats.iter().map(|p| p.length).collect();

        Self {
            avg_length: average_length(&lengths),
            passages: stats,
            doc_freq,
        }
    }

    pub fn passage_count(&self) -> usize {
        self.passages.len()
    }

    /// Score the passage at `index`. Out-of-range indices score zero.
    pub fn score_passage(&self, query_terms: &[String], index: usize) -> f64 {
        let Some(passage) = self.passages.get(index) else {
            return 0.0;
        };

        accumulate(
            query_terms,
            &passage.term_freq,
            passage.length,
            self.avg_length,
            self.passages.len(),
            |term| self.doc_freq.get(term).copied().unwrap_or(0),
        )
    }
}

fn term_frequencies(terms: &[String]) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for term in terms {
        *freq.entry(term.clone()).or_default() += 1;
    }
    freq
}

/// Mean token count, or zero for an empty passage set.
fn average_length(lengths: &[usize]) -> f64 {
    if lengths.is_empty() {
        return 0.0;
    }
    let total: usize = lengths.iter().sum();
    total as f64 / lengths.len() as f64
}

/// The shared BM25 sum plus match bonuses.
///
/// Each distinct query term contributes once, in first-occurrence order, so
/// both scoring paths add the same floats in the same order.
fn accumulate(
    query_terms: &[String],
    term_freq: &HashMap<String, usize>,
    passage_length: usize,
    avg_length: f64,
    passage_count: usize,
    doc_freq: impl Fn(&str) -> usize,
) -> f64 {
    // An all-empty sibling set has no lengths to normalize against.
    let avg_length = if avg_length > 0.0 { avg_length } else { 1.0 };
    let n = passage_count as f64;

    let mut seen = HashSet::new();
    let mut score = 0.0;
    let mut matched = 0usize;

    for term in query_terms {
        if !seen.insert(term.as_str()) {
            continue;
        }
        let tf = term_freq.get(term).copied().unwrap_or(0);
        if tf == 0 {
            continue;
        }
        matched += 1;

        let tf = tf as f64;
        let idf = ((n + 1.0) / (doc_freq(term.as_str()) as f64 + 1.0)).ln();
        let numerator = tf * (K1 + 1.0);
        let denominator = tf
            + K1 * (1.0 - B + B * (passage_length as f64 / avg_length));
        score += idf * (numerator / denominator);
    }

    if matched > 0 {
        score += (matched as f64 / query_terms.len() as f64)
            * PARTIAL_MATCH_WEIGHT;
        score += PRESENCE_BONUS;
    }

    score
}
