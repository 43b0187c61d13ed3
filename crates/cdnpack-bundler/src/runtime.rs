//! Filesystem runtime abstraction.
//!
//! The engine never touches `std::fs` directly. Every read and write goes
//! through the [`Runtime`] trait so tests can substitute their own
//! implementation and so blocking I/O stays off the async worker threads.

use async_trait::async_trait;
use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Platform runtime trait
///
/// Abstracts the file operations the engine needs: reading sources and
/// manifests, probing candidate paths during resolution, and writing
/// artifacts.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file, replacing any previous content
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Create a directory
    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Check whether a path is an existing regular file
    async fn is_file(&self, path: &Path) -> bool;

    /// First of `candidates` that is an existing regular file
    async fn find_file(&self, candidates: Vec<PathBuf>) -> Option<PathBuf> {
        for candidate in candidates {
            if self.is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    /// Working directory relative paths are resolved against
    fn cwd(&self) -> &Path;
}

/// Runtime backed by the local filesystem.
///
/// Blocking calls run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    cwd: PathBuf,
}

impl NativeRuntime {
    /// Create a runtime resolving relative paths against `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.resolve_path(path);
        tokio::task::spawn_blocking(move || {
            std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeError::FileNotFound(path.clone())
                } else {
                    RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
                }
            })
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = self.resolve_path(path);
        let content = content.to_vec();
        tokio::task::spawn_blocking(move || {
            std::fs::write(&path, content)
                .map_err(|e| RuntimeError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let path = self.resolve_path(path);
        tokio::task::spawn_blocking(move || {
            let result = if recursive {
                std::fs::create_dir_all(&path)
            } else {
                std::fs::create_dir(&path)
            };

            result.map_err(|e| {
                RuntimeError::Io(format!(
                    "Failed to create directory {}: {}",
                    path.display(),
                    e
                ))
            })
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn is_file(&self, path: &Path) -> bool {
        let path = self.resolve_path(path);
        tokio::task::spawn_blocking(move || path.is_file())
            .await
            .unwrap_or(false)
    }

    async fn find_file(&self, candidates: Vec<PathBuf>) -> Option<PathBuf> {
        let resolved: Vec<(PathBuf, PathBuf)> = candidates
            .into_iter()
            .map(|candidate| (self.resolve_path(&candidate), candidate))
            .collect();

        // One blocking hop for the whole candidate list
        tokio::task::spawn_blocking(move || {
            resolved
                .into_iter()
                .find(|(absolute, _)| absolute.is_file())
                .map(|(_, candidate)| candidate)
        })
        .await
        .ok()
        .flatten()
    }

    fn cwd(&self) -> &Path {
        &self.cwd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_relative_paths_resolve_against_cwd() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.js"), b"module.exports = 1;").unwrap();

        let runtime = NativeRuntime::new(temp_dir.path());

        let content = runtime.read_file(Path::new("./a.js")).await.unwrap();
        assert_eq!(content, b"module.exports = 1;");
        assert!(runtime.is_file(Path::new("a.js")).await);
        assert!(!runtime.is_file(Path::new("missing.js")).await);
    }

    #[tokio::test]
    async fn test_find_file_keeps_candidate_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.js"), b"").unwrap();
        std::fs::write(temp_dir.path().join("c.js"), b"").unwrap();

        let runtime = NativeRuntime::new(temp_dir.path());
        let candidates = vec![
            PathBuf::from("a.js"),
            PathBuf::from("c.js"),
            PathBuf::from("b.js"),
        ];

        assert_eq!(
            runtime.find_file(candidates).await,
            Some(PathBuf::from("c.js"))
        );
        assert_eq!(runtime.find_file(vec![PathBuf::from("none.js")]).await, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported_as_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let runtime = NativeRuntime::new(temp_dir.path());

        let err = runtime.read_file(Path::new("nope.js")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_write_creates_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let runtime = NativeRuntime::new(temp_dir.path());

        runtime.create_dir(Path::new("out/nested"), true).await.unwrap();
        runtime.write_file(Path::new("out/nested/x.js"), b"first").await.unwrap();
        runtime.write_file(Path::new("out/nested/x.js"), b"second").await.unwrap();

        let content = std::fs::read(temp_dir.path().join("out/nested/x.js")).unwrap();
        assert_eq!(content, b"second");
    }
}
