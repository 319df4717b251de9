//! Read-only access to the JSON documents bundled with the application.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::repository::StorageError;

/// Resolves a logical document name to its bytes.
///
/// `read_json("closures", &["Resources/Topics", "Topics"])` looks for
/// `Resources/Topics/closures.json`, then `Topics/closures.json`, then
/// `closures.json` at the bundle root, and returns the first one found.
#[async_trait]
pub trait BundleResolver: Send + Sync {
    /// Returns `Ok(None)` when no candidate location holds the document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a document exists but cannot be read.
    async fn read_json(
        &self,
        name: &str,
        subdirectories: &[&str],
    ) -> Result<Option<Vec<u8>>, StorageError>;

    /// Every bundled JSON document, as sorted `/`-separated relative paths.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bundle cannot be listed.
    async fn list_json_files(&self) -> Result<Vec<String>, StorageError>;
}

/// Candidate relative paths for `name`, in lookup order.
fn candidate_paths(name: &str, subdirectories: &[&str]) -> Vec<String> {
    let file = format!("{name}.json");
    let mut paths: Vec<String> = subdirectories
        .iter()
        .map(|dir| dir.trim_matches('/'))
        .filter(|dir| !dir.is_empty())
        .map(|dir| format!("{dir}/{file}"))
        .collect();
    paths.push(file);
    paths
}

//
// ─── DIRECTORY BUNDLE ──────────────────────────────────────────────────────────
//

/// Bundle backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BundleResolver for DirectoryBundle {
    async fn read_json(
        &self,
        name: &str,
        subdirectories: &[&str],
    ) -> Result<Option<Vec<u8>>, StorageError> {
        for relative in candidate_paths(name, subdirectories) {
            match tokio::fs::read(self.root.join(&relative)).await {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(None)
    }

    async fn list_json_files(&self) -> Result<Vec<String>, StorageError> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        let parts: Vec<_> = relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect();
                        found.push(parts.join("/"));
                    }
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

//
// ─── IN-MEMORY BUNDLE ──────────────────────────────────────────────────────────
//

/// Bundle held in memory, keyed by relative path (`"Resources/x.json"`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl InMemoryBundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

#[async_trait]
impl BundleResolver for InMemoryBundle {
    async fn read_json(
        &self,
        name: &str,
        subdirectories: &[&str],
    ) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(candidate_paths(name, subdirectories)
            .into_iter()
            .find_map(|path| self.files.get(&path).cloned()))
    }

    async fn list_json_files(&self) -> Result<Vec<String>, StorageError> {
        Ok(self
            .files
            .keys()
            .filter(|path| path.ends_with(".json"))
            .cloned()
            .collect())
    }
}
