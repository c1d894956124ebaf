//! Resource lookup for configuration documents.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const CLASSPATH_PREFIX: &str = "classpath:";

/// Resolves a resource path to the bytes of a configuration document.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<Vec<u8>, ConfigError>;
}

/// Strip an optional `classpath:` prefix and any leading `/`.
fn normalize(path: &str) -> &str {
    path.strip_prefix(CLASSPATH_PREFIX)
        .unwrap_or(path)
        .trim_start_matches('/')
}

/// Loads resources relative to a root directory.
///
/// Paths may carry a `classpath:` prefix. Once the prefix is stripped the
/// path must be relative and must not climb out of the root.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ConfigError> {
        let relative = Path::new(normalize(path));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if relative.as_os_str().is_empty() || escapes {
            return Err(ConfigError::InvalidResourcePath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, ConfigError> {
        let full = self.resolve(path)?;
        tracing::debug!(resource = %path, file = %full.display(), "loading resource");

        std::fs::read(&full).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::ResourceNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::Io { path: full, source },
        })
    }
}

/// Serves documents held in memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.resources
            .insert(normalize(path).to_string(), contents.into());
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, ConfigError> {
        self.resources
            .get(normalize(path))
            .cloned()
            .ok_or_else(|| ConfigError::ResourceNotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> DirectoryLoader {
        DirectoryLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"))
    }

    #[test]
    fn directory_loader_reads_relative_paths() {
        let bytes = fixtures().load("fixtures/order.json").unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn classpath_prefix_is_accepted() {
        let loader = fixtures();
        assert_eq!(
            loader.load("classpath:fixtures/order.json").unwrap(),
            loader.load("fixtures/order.json").unwrap()
        );
        assert!(loader.load("classpath:/fixtures/payment.json").is_ok());
    }

    #[test]
    fn missing_resource_is_reported() {
        let err = fixtures().load("fixtures/absent.json").unwrap_err();
        assert!(matches!(err, ConfigError::ResourceNotFound { path } if path == "fixtures/absent.json"));
    }

    #[test]
    fn escaping_the_root_is_rejected() {
        let loader = fixtures();
        for path in ["../Cargo.toml", "fixtures/../../Cargo.toml", "", "classpath:"] {
            assert!(
                matches!(loader.load(path), Err(ConfigError::InvalidResourcePath { .. })),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn memory_loader_normalizes_keys() {
        let loader = MemoryLoader::new().with("classpath:machines/a.json", "{}");

        assert_eq!(loader.load("machines/a.json").unwrap(), b"{}");
        assert_eq!(loader.load("/machines/a.json").unwrap(), b"{}");
        assert!(matches!(
            loader.load("machines/b.json"),
            Err(ConfigError::ResourceNotFound { .. })
        ));
    }
}
