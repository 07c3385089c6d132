//! The retrieval engine.
//!
//! A [`Retriever`] owns an immutable snapshot of the indexed documents behind
//! an `Arc`. Searches clone the `Arc` and work on that snapshot without
//! holding any lock; [`Retriever::reindex`] builds a complete replacement
//! off to the side and publishes it with a single pointer swap. A search
//! therefore sees either the old index or the new one, never a mix.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use crate::{
    search::{self, DEFAULT_FALLBACK_PASSAGES, IndexedDocument, SearchResult},
    segment::DEFAULT_LONG_PASSAGE_CHARS,
    source::SourceProvider,
    store::{self, Document, LoadError},
    tokenizer::tokenize,
};

/// Segmentation and fallback settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieverConfig {
    /// Blocks longer than this many characters are split on newlines.
    pub long_passage_chars: usize,
    /// Leading passages per document used for fallback results.
    pub fallback_passages_per_document: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            long_passage_chars: DEFAULT_LONG_PASSAGE_CHARS,
            fallback_passages_per_document: DEFAULT_FALLBACK_PASSAGES,
        }
    }
}

/// Whether the engine has completed a load.
///
/// The only transition is `Unready -> Ready`; reindexing keeps it `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Unready,
    Ready,
}

#[derive(Debug)]
struct Snapshot {
    state: IndexState,
    documents: Vec<IndexedDocument>,
}

impl Snapshot {
    fn unready() -> Self {
        Self {
            state: IndexState::Unready,
            documents: Vec::new(),
        }
    }
}

/// What a reindex published.
#[derive(Debug)]
pub struct ReindexSummary {
    pub document_count: usize,
    pub passage_count: usize,
    pub errors: Vec<LoadError>,
}

pub struct Retriever {
    source: Arc<dyn SourceProvider>,
    config: RetrieverConfig,
    snapshot: RwLock<Arc<Snapshot>>,
    // Serializes concurrent reindexes so the last one started is the last
    // one published.
    reindex_lock: Mutex<()>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("source", &self.source.describe())
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl Retriever {
    /// Create an engine that has not loaded anything yet.
    pub fn new(source: Arc<dyn SourceProvider>) -> Self {
        Self::with_config(source, RetrieverConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn SourceProvider>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(Snapshot::unready())),
            reindex_lock: Mutex::new(()),
        }
    }

    /// Create an engine and load the corpus immediately.
    pub fn open(source: Arc<dyn SourceProvider>) -> Self {
        let retriever = Self::new(source);
        retriever.reindex();
        retriever
    }

    pub fn config(&self) -> RetrieverConfig {
        self.config
    }

    pub fn source(&self) -> &Arc<dyn SourceProvider> {
        &self.source
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(
            &self.snapshot.read().unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Reload every source and publish the result as the new index.
    ///
    /// Per-source failures are reported in the summary and never prevent
    /// publication: an empty or unreadable corpus still leaves the engine
    /// ready with zero documents.
    pub fn reindex(&self) -> ReindexSummary {
        let _guard = self
            .reindex_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let report = store::load(self.source.as_ref(), self.config.long_passage_chars);
        let passage_count = report.passage_count();
        let documents: Vec<IndexedDocument> = report
            .documents
            .into_iter()
            .map(IndexedDocument::new)
            .collect();
        let document_count = documents.len();

        let next = Arc::new(Snapshot {
            state: IndexState::Ready,
            documents,
        });
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;

        info!(
            source = %self.source.describe(),
            documents = document_count,
            passages = passage_count,
            errors = report.errors.len(),
            "knowledge base indexed"
        );

        ReindexSummary {
            document_count,
            passage_count,
            errors: report.errors,
        }
    }

    pub fn state(&self) -> IndexState {
        self.snapshot().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == IndexState::Ready
    }

    /// Rank passages for `query`, returning at most `top_k` results.
    ///
    /// Returns nothing before the first load, for queries without any terms,
    /// and for an empty corpus. When no passage matches, the leading passages
    /// of each document are returned with [`search::FALLBACK_SCORE`].
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        let snapshot = self.snapshot();
        if snapshot.state != IndexState::Ready {
            return Vec::new();
        }

        let query_terms = tokenize(query);
        let results = search::rank_terms(
            &snapshot.documents,
            &query_terms,
            top_k,
            self.config.fallback_passages_per_document,
        );

        debug!(
            query,
            terms = query_terms.len(),
            top_k,
            results = results.len(),
            fallback = results.first().is_some_and(SearchResult::is_fallback),
            "search complete"
        );

        results
    }

    pub fn document(&self, filename: &str) -> Option<Arc<Document>> {
        self.snapshot()
            .documents
            .iter()
            .find(|d| d.document.filename == filename)
            .map(|d| Arc::clone(&d.document))
    }

    /// All documents in load order.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.snapshot()
            .documents
            .iter()
            .map(|d| Arc::clone(&d.document))
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.snapshot().documents.len()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.snapshot()
            .documents
            .iter()
            .map(|d| d.document.filename.clone())
            .collect()
    }

    pub fn passage_count(&self) -> usize {
        self.snapshot()
            .documents
            .iter()
            .map(|d| d.document.passages.len())
            .sum()
    }
}
