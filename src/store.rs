use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{error::Error, segment::segment_passages, source::SourceProvider};

/// One knowledge-base entry and its passages.
///
/// Immutable once built: a reindex produces new `Document` values rather
/// than editing these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Filename without its extension.
    pub id: String,
    /// Source name, used as the citation key.
    pub filename: String,
    /// Full text as loaded.
    pub content: String,
    /// Ordered passages; citation indices refer to this order.
    pub passages: Vec<String>,
}

impl Document {
    /// Build a document by segmenting `content`.
    ///
    /// A document whose content is blank is kept with zero passages.
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        long_passage_chars: usize,
    ) -> Self {
        let filename = filename.into();
        let content = content.into();
        let passages = segment_passages(&content, long_passage_chars);
        Self {
            id: document_id(&filename),
            filename,
            content,
            passages,
        }
    }
}

/// Derive a document ID by dropping the filename's extension.
pub fn document_id(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

/// A source that could not be loaded.
#[derive(Debug)]
pub struct LoadError {
    /// Source name, or the provider label when the listing itself failed.
    pub name: String,
    pub error: Error,
}

/// Outcome of a load: every document that could be built plus the sources
/// that could not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    pub fn passage_count(&self) -> usize {
        self.documents.iter().map(|d| d.passages.len()).sum()
    }
}

/// Read and segment every source `provider` lists.
///
/// A listing failure produces an empty report carrying one error; it is not
/// fatal.
pub fn load(provider: &dyn SourceProvider, long_passage_chars: usize) -> LoadReport {
    let names = match provider.list() {
        Ok(names) => names,
        Err(e) => {
            let name = provider.describe();
            warn!(source = %name, error = %e, "could not list knowledge-base sources");
            return LoadReport {
                documents: Vec::new(),
                errors: vec![LoadError {
                    name: name.clone(),
                    error: Error::Source { name, source: e },
                }],
            };
        }
    };

    load_from(&names, |name| provider.read(name), long_passage_chars)
}

/// Build documents for `names`, reading each through `read`.
///
/// Reads run in parallel; the resulting documents keep the order of `names`.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn load_from<F>(names: &[String], read: F, long_passage_chars: usize) -> LoadReport
where
    F: Fn(&str) -> std::io::Result<Vec<u8>> + Sync,
{
    let loaded: Vec<Result<Document, LoadError>> = names
        .par_iter()
        .map(|name| {
            let bytes = read(name).map_err(|e| LoadError {
                name: name.clone(),
                error: Error::Source {
                    name: name.clone(),
                    source: e,
                },
            })?;
            let content = String::from_utf8_lossy(&bytes);
            Ok(Document::new(name.as_str(), content, long_passage_chars))
        })
        .collect();

    let mut report = LoadReport::default();
    for item in loaded {
        match item {
            Ok(doc) => {
                debug!(
                    filename = %doc.filename,
                    passages = doc.passages.len(),
                    "loaded document"
                );
                report.documents.push(doc);
            }
            Err(err) => {
                warn!(source = %err.name, error = %err.error, "skipping unreadable source");
                report.errors.push(err);
            }
        }
    }

    report
}
