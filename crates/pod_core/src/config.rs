//! Import options and resource lookup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding resource search directories.
pub const RESOURCE_DIR_ENV: &str = "POD_RESOURCE_DIR";

/// Directory searched when the environment names none.
pub const DEFAULT_RESOURCE_DIR: &str = "assets";

/// Errors that can occur while loading import options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options applied while building scene objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Mark every node that has children as highlighted
    pub highlight_parents: bool,

    /// Ask the renderer to flip material textures vertically
    pub flip_textures: bool,
}

impl ImportOptions {
    /// Parse options from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Ordered list of directories in which named resources are looked up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    roots: Vec<PathBuf>,
}

impl ResourceBundle {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories from `POD_RESOURCE_DIR` (a platform path list), or
    /// `./assets` when the variable is unset or empty.
    pub fn from_env() -> Self {
        let roots: Vec<PathBuf> = std::env::var_os(RESOURCE_DIR_ENV)
            .map(|value| std::env::split_paths(&value).collect())
            .unwrap_or_default();

        if roots.is_empty() {
            Self::new([DEFAULT_RESOURCE_DIR])
        } else {
            Self { roots }
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Append a search directory.
    pub fn push(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    /// First existing file called `name` under the search directories.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_missing_fields() {
        let options = ImportOptions::from_json_str(r#"{ "flip_textures": true }"#).unwrap();
        assert!(options.flip_textures);
        assert!(!options.highlight_parents);

        assert_eq!(ImportOptions::from_json_str("{}").unwrap(), ImportOptions::default());
    }

    #[test]
    fn test_options_reject_bad_json() {
        assert!(matches!(
            ImportOptions::from_json_str("{ highlight_parents: yes"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_options_file_roundtrip() {
        let options = ImportOptions {
            highlight_parents: true,
            flip_textures: false,
        };
        let path = std::env::temp_dir().join(format!("pod_options_{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&options).unwrap()).unwrap();

        let loaded = ImportOptions::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_bundle_searches_roots_in_order() {
        let base = std::env::temp_dir().join(format!("pod_bundle_{}", std::process::id()));
        let first = base.join("first");
        let second = base.join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(second.join("scene.pod"), b"pod").unwrap();

        let mut bundle = ResourceBundle::new([&first]);
        assert_eq!(bundle.resolve("scene.pod"), None);

        bundle.push(&second);
        assert_eq!(bundle.resolve("scene.pod"), Some(second.join("scene.pod")));
        assert_eq!(bundle.roots().len(), 2);

        std::fs::remove_dir_all(&base).ok();
    }
}
