use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read version manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse version manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported manifest_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("library name must not be empty")]
    EmptyLibraryName,
    #[error("version for library '{0}' must not be empty")]
    EmptyVersion(String),
    #[error("unknown library '{0}' (not present in the version manifest)")]
    UnknownLibrary(String),
}

/// Single source of truth mapping library names to version strings.
///
/// Immutable once loaded. Keys are kept sorted so `all()` is deterministic.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VersionManifest {
    manifest_version: u32,
    #[serde(default)]
    versions: BTreeMap<String, String>,
}

impl VersionManifest {
    /// Build a manifest directly from `(library, version)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let manifest = Self {
            manifest_version: 1,
            versions: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// The manifest compiled into the binary.
    pub fn builtin() -> Result<Self, ManifestError> {
        parse_manifest_str(DEFAULT_MANIFEST)
    }

    pub fn get(&self, library: &str) -> Result<&str, ManifestError> {
        self.versions
            .get(library)
            .map(String::as_str)
            .ok_or_else(|| ManifestError::UnknownLibrary(library.to_owned()))
    }

    pub fn contains(&self, library: &str) -> bool {
        self.versions.contains_key(library)
    }

    /// Every `(library, version)` pair, sorted by library name.
    pub fn all(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.versions
            .iter()
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }

    /// True if some library in the manifest is pinned to exactly `version`.
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.values().any(|v| v == version)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.manifest_version != 1 {
            return Err(ManifestError::UnsupportedVersion(self.manifest_version));
        }
        for (name, version) in &self.versions {
            if name.trim().is_empty() {
                return Err(ManifestError::EmptyLibraryName);
            }
            if version.trim().is_empty() {
                return Err(ManifestError::EmptyVersion(name.clone()));
            }
        }
        Ok(())
    }
}

/// Parse and validate a version manifest.
///
/// The TOML parser rejects duplicate keys, so a library can never be pinned
/// twice within one document.
pub fn parse_manifest_str(input: &str) -> Result<VersionManifest, ManifestError> {
    let manifest: VersionManifest = toml::from_str(input)?;
    manifest.validate()?;
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<VersionManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

pub const DEFAULT_MANIFEST: &str = r#"manifest_version = 1

[versions]
androidGradlePlugin = "7.2.1"
kotlin = "1.7.0"
kotlinCoroutines = "1.6.3"
javaxInject = "1"
dagger = "2.42"
androidAnnotation = "1.4.0"
androidxArch = "2.1.0"
androidxCore = "1.8.0"
activity = "1.4.0"
fragment = "1.4.1"
recyclerview = "1.2.1"
constraintLayout = "2.1.4"
lifecycle = "2.4.1"
appcompat = "1.4.2"
androidNavigation = "2.4.2"
slf4android = "0.1.6"
slf4j = "1.7.36"
leakCanary = "2.9.1"
junit = "4.13.2"
compose = "1.2.0-rc02"
composeActivity = "1.4.0"
"#;
