//! Data structures passed between the pipeline stages.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// User-supplied model reference, as written in the component configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAssetReference")]
pub enum AssetReference {
  /// Bare string whose origin is inferred from its prefix.
  Shorthand(String),
  /// Explicit file under the project root.
  Local {
    /// Path relative to the project root.
    path: String,
  },
  /// Explicit download location.
  Remote {
    /// HTTP(S) URL of the asset.
    url: String,
  },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAssetReference {
  Shorthand(String),
  Tagged(TaggedAssetReference),
}

#[derive(Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
enum TaggedAssetReference {
  Local { path: String },
  Web { url: String },
}

impl From<RawAssetReference> for AssetReference {
  fn from(raw: RawAssetReference) -> Self {
    match raw {
      RawAssetReference::Shorthand(value) => Self::Shorthand(value),
      RawAssetReference::Tagged(TaggedAssetReference::Local { path }) => Self::Local { path },
      RawAssetReference::Tagged(TaggedAssetReference::Web { url }) => Self::Remote { url },
    }
  }
}

impl fmt::Display for AssetReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Shorthand(value) => f.write_str(value),
      Self::Local { path } => write!(f, "local:{path}"),
      Self::Remote { url } => write!(f, "web:{url}"),
    }
  }
}

/// Reference after classification: exactly one origin is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
  /// File relative to the project root.
  Local(String),
  /// URL to download through the cache.
  Remote(String),
}

/// Deterministic cache filename derived from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(pub(crate) String);

impl CacheKey {
  /// Borrow the key as its hex string.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Location of a downloaded asset inside the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
  /// Key the entry is stored under.
  pub key: CacheKey,
  /// Full path of the cached file.
  pub path: PathBuf,
}

impl CacheEntry {
  /// Entry for `key` inside `cache_dir`.
  pub fn new(cache_dir: &Path, key: CacheKey) -> Self {
    let path = cache_dir.join(key.as_str());
    Self { key, path }
  }
}

/// Where a resolved asset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
  /// Found under the project root.
  Local,
  /// Served from the download cache for this URL.
  Remote {
    /// URL the asset was downloaded from.
    url: String,
  },
}

/// Concrete file ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
  /// Path of an existing regular file.
  pub path: PathBuf,
  /// File size at resolution time.
  pub byte_length: u64,
  /// Origin of the file.
  pub origin: AssetOrigin,
}

/// Exact in-memory copy of an asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedModel {
  bytes: Vec<u8>,
}

impl EmbeddedModel {
  /// Wrap raw file contents.
  pub fn new(bytes: Vec<u8>) -> Self {
    Self { bytes }
  }

  /// Embedded bytes.
  pub fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Number of embedded bytes.
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  /// Returns `true` for a zero-length asset.
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

/// Library the generated firmware must link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDependency {
  /// Library name.
  pub name: String,
  /// Repository the library is fetched from.
  pub repository: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialises_bare_string_as_shorthand() {
    let reference: AssetReference = serde_yaml::from_str("\"models/m.tflite\"").unwrap();
    assert_eq!(reference, AssetReference::Shorthand("models/m.tflite".into()));
  }

  #[test]
  fn deserialises_tagged_local_reference() {
    let reference: AssetReference =
      serde_yaml::from_str("source: local\npath: models/m.tflite").unwrap();
    assert_eq!(reference, AssetReference::Local {
      path: "models/m.tflite".into()
    });
  }

  #[test]
  fn deserialises_tagged_web_reference() {
    let reference: AssetReference =
      serde_yaml::from_str("source: web\nurl: https://example.com/m.tflite").unwrap();
    assert_eq!(reference, AssetReference::Remote {
      url: "https://example.com/m.tflite".into()
    });
  }

  #[test]
  fn rejects_unknown_source_tag() {
    let result: Result<AssetReference, _> = serde_yaml::from_str("source: ftp\nurl: x");
    assert!(result.is_err());
  }

  #[test]
  fn cache_entry_joins_key_onto_directory() {
    let entry = CacheEntry::new(Path::new("/cache/litert"), CacheKey("a1b2c3d4".into()));
    assert_eq!(entry.path, PathBuf::from("/cache/litert/a1b2c3d4"));
  }
}
