//! Texture file name overrides.
//!
//! Materials keep the texture name stored in the POD file. Callers can remap
//! names at any time; the map is consulted whenever a material's texture is
//! resolved, so changes apply to materials that were already built.

use std::collections::HashMap;

/// Map from original texture file names to replacements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureOverrides {
    replacements: HashMap<String, String>,
}

impl TextureOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `original` with `replacement`. A later call for the same name wins.
    pub fn insert(&mut self, original: impl Into<String>, replacement: impl Into<String>) {
        let original = original.into();
        let replacement = replacement.into();
        log::debug!("Texture override: {} -> {}", original, replacement);
        self.replacements.insert(original, replacement);
    }

    /// Resolve a texture name through the map.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.replacements.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}
