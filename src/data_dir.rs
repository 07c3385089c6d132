use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable overriding the knowledge-base directory.
pub const KB_DIR_ENV: &str = "HELPDESK_KB_DIR";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the knowledge-base directory from, in order of priority:
    /// 1. An explicit path (from --kb-dir)
    /// 2. The HELPDESK_KB_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/helpdesk/kb/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var(KB_DIR_ENV) {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("helpdesk")
                .get_data_home()
                .map(|home| home.join("kb"))
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_with_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::resolve(Some(tmp.path())).unwrap();

        assert_eq!(dir.root(), tmp.path());
    }

    #[test]
    fn resolve_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("support").join("kb");
        let dir = DataDir::resolve(Some(&nested)).unwrap();

        assert!(nested.is_dir());
        assert_eq!(dir.root(), nested.as_path());
    }

    #[test]
    fn resolve_fails_when_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let err = DataDir::resolve(Some(&file)).unwrap_err();
        assert!(matches!(err, Error::DataDir(_)));
    }
}
