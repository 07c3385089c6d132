use std::{
    fs::DirEntry,
    io,
    path::Path,
};

use tracing::warn;

/// File suffixes recognized as knowledge-base entries.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt"];

/// List the names of the knowledge-base entries directly inside `root`.
///
/// Only regular files (or symlinks resolving to regular files) with a
/// supported extension are returned. Hidden entries and subdirectories are
/// skipped, as is any entry the file system fails to describe. Results are
/// sorted so the load order is stable across platforms.
pub fn discover_files(root: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(root)?
        .filter_map(|entry| accept_entry(root, entry))
        .collect();

    names.sort();
    Ok(names)
}

/// The entry's name if it is a supported knowledge-base file.
fn accept_entry(root: &Path, entry: io::Result<DirEntry>) -> Option<String> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "skipping unreadable directory entry");
            return None;
        }
    };

    let name = entry.file_name().to_str()?.to_string();
    if name.starts_with('.') || !is_supported(&name) {
        return None;
    }

    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(e) => {
            warn!(file = %name, error = %e, "skipping entry with unknown file type");
            return None;
        }
    };

    let is_file = if file_type.is_symlink() {
        // Broken symlinks are skipped.
        entry.path().canonicalize().is_ok_and(|p| p.is_file())
    } else {
        file_type.is_file()
    };

    is_file.then_some(name)
}

/// Whether `name` ends in one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_md_and_txt() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("faq.md"), "# FAQ").unwrap();
        std::fs::write(tmp.path().join("hours.txt"), "9 to 5").unwrap();
        std::fs::write(tmp.path().join("logo.png"), "binary").unwrap();

        let files = discover_files(tmp.path()).unwrap();
        assert_eq!(files, vec!["faq.md", "hours.txt"]);
    }

    #[test]
    fn skips_hidden_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".draft.md"), "secret").unwrap();
        std::fs::write(tmp.path().join("visible.md"), "hello").unwrap();

        let files = discover_files(tmp.path()).unwrap();
        assert_eq!(files, vec!["visible.md"]);
    }

    #[test]
    fn does_not_recurse() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("archive");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("old.md"), "old").unwrap();
        std::fs::write(tmp.path().join("top.md"), "top").unwrap();

        let files = discover_files(tmp.path()).unwrap();
        assert_eq!(files, vec!["top.md"]);
    }

    #[test]
    fn directory_named_like_a_document_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("notes.md")).unwrap();

        let files = discover_files(tmp.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn results_are_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("z.md"), "z").unwrap();
        std::fs::write(tmp.path().join("a.md"), "a").unwrap();
        std::fs::write(tmp.path().join("m.txt"), "m").unwrap();

        let files = discover_files(tmp.path()).unwrap();
        assert_eq!(files, vec!["a.md", "m.txt", "z.md"]);
    }

    #[test]
    fn empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let files = discover_files(tmp.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_files(&tmp.path().join("gone")).is_err());
    }

    #[test]
    fn failed_entry_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let entry = Err(io::Error::other("stale handle"));
        assert_eq!(accept_entry(tmp.path(), entry), None);
    }

    #[test]
    fn accepted_entry_yields_its_name() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("faq.md"), "# FAQ").unwrap();
        let entry = std::fs::read_dir(tmp.path()).unwrap().next().unwrap();
        assert_eq!(accept_entry(tmp.path(), entry), Some("faq.md".to_string()));
    }

    #[test]
    fn supported_suffixes() {
        assert!(is_supported("pricing.md"));
        assert!(is_supported("hours.txt"));
        assert!(!is_supported("pricing.MD"));
        assert!(!is_supported("pricing.pdf"));
        assert!(!is_supported("README"));
    }
}
