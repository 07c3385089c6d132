//! helpdesk - BM25 passage retrieval over a local support knowledge base.
//!
//! helpdesk loads the markdown and text files of a knowledge-base directory,
//! splits them into paragraph-sized passages and ranks those passages
//! against free-text questions with BM25. When a question matches nothing,
//! the leading passages of each document are returned with a sentinel score
//! so callers always have something to cite.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use helpdesk::{DataDir, DirectorySource, Retriever};
//! use helpdesk::citation::citations;
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let retriever = Retriever::open(Arc::new(DirectorySource::new(data_dir.root())));
//!
//! let results = retriever.search("how do refunds work", 3);
//! for r in &results {
//!     println!("{}#{} (score: {:.3})", r.document.filename, r.passage_index, r.score);
//! }
//! let cites = citations(&results);
//! # let _ = cites;
//! ```

pub mod bm25;
pub mod citation;
pub mod cli;
pub mod data_dir;
pub mod error;
pub mod mcp;
pub mod retriever;
pub mod search;
pub mod segment;
pub mod source;
pub mod store;
pub mod tokenizer;
pub mod walker;

pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use retriever::{IndexState, ReindexSummary, Retriever, RetrieverConfig};
pub use search::{FALLBACK_SCORE, SearchResult};
pub use source::{DirectorySource, MemorySource, SourceProvider};
pub use store::{Document, LoadError};
