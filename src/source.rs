//! Where knowledge-base bytes come from.
//!
//! The engine never touches the file system directly: it asks a
//! [`SourceProvider`] for a listing of source names and then reads each one.
//! [`DirectorySource`] is the production provider; [`MemorySource`] backs
//! tests and embedders that already hold the documents in memory.

use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::walker;

/// A listing plus per-name byte reads.
///
/// Implementations must be shareable across threads: reads are issued in
/// parallel during a load.
pub trait SourceProvider: Send + Sync {
    /// Names of the available sources, in load order.
    fn list(&self) -> std::io::Result<Vec<String>>;

    /// Raw bytes of the source called `name`.
    fn read(&self, name: &str) -> std::io::Result<Vec<u8>>;

    /// Human-readable label used in logs and load errors.
    fn describe(&self) -> String;
}

/// Reads `.md`/`.txt` files from a single directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for DirectorySource {
    fn list(&self) -> std::io::Result<Vec<String>> {
        walker::discover_files(&self.root)
    }

    fn read(&self, name: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// An in-memory corpus. Entries keep insertion order; inserting an existing
/// name replaces its bytes in place.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: RwLock<Vec<(String, Vec<u8>)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from `(name, content)` pairs.
    pub fn from_entries<N, C>(entries: impl IntoIterator<Item = (N, C)>) -> Self
    where
        N: Into<String>,
        C: Into<Vec<u8>>,
    {
        let source = Self::new();
        for (name, content) in entries {
            source.insert(name, content);
        }
        source
    }

    pub fn insert(&self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        let name = name.into();
        let content = content.into();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = content,
            None => entries.push((name, content)),
        }
    }

    pub fn remove(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|(n, _)| n != name);
        entries.len() != before
    }
}

impl SourceProvider for MemorySource {
    fn list(&self) -> std::io::Result<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| walker::is_supported(name))
            .collect())
    }

    fn read(&self, name: &str) -> std::io::Result<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no in-memory source named {name}"),
                )
            })
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
