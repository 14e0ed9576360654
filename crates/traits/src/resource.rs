//! Loading of raw resource bytes (images, font files) by path.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// A source of resource bytes addressed by path.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    fn exists(&self, path: &str) -> bool;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Resources held in memory, keyed by path.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let path = path.into();
        let mut resources = self.resources.write().map_err(|_| ResourceError::LoadFailed {
            path: path.clone(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources.insert(path, Arc::new(data));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self.resources.read().map_err(|_| ResourceError::LoadFailed {
            path: path.to_string(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.resources
            .read()
            .map(|r| r.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

/// Reads resources from disk. Relative paths resolve against `base`.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    base: PathBuf,
}

impl FilesystemResourceProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base.join(candidate)
        }
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resolved = self.resolve(path);
        match std::fs::read(&resolved) {
            Ok(bytes) => Ok(Arc::new(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResourceError::NotFound(resolved.display().to_string()))
            }
            Err(e) => Err(ResourceError::LoadFailed {
                path: resolved.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_provider_add_and_load() {
        let provider = InMemoryResourceProvider::new();
        provider.add("logo.png", b"png bytes".to_vec()).unwrap();

        let data = provider.load("logo.png").unwrap();
        assert_eq!(&*data, b"png bytes");
        assert!(provider.exists("logo.png"));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_in_memory_provider_not_found() {
        let provider = InMemoryResourceProvider::new();
        let result = provider.load("missing.png");
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_filesystem_provider_resolves_relative_paths() {
        let dir = std::env::temp_dir().join(format!("pagewright-res-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("font.ttf"), b"abc").unwrap();

        let provider = FilesystemResourceProvider::new(&dir);
        assert!(provider.exists("font.ttf"));
        assert_eq!(&*provider.load("font.ttf").unwrap(), b"abc");
        assert!(matches!(provider.load("nope.ttf"), Err(ResourceError::NotFound(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resource_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let resource_err: ResourceError = io_err.into();
        assert!(matches!(resource_err, ResourceError::Io(_)));
        assert!(resource_err.to_string().contains("denied"));
    }
}
