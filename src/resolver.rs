//! Turn a user-supplied asset reference into a concrete file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::asset_paths::{has_expected_extension, is_remote_reference, is_well_formed_url};
use crate::error::{AssetError, AssetResult};
use crate::fetch::{ModelCache, Transport};
use crate::models::{AssetOrigin, AssetReference, AssetSource, ResolvedAsset};

/// Decide whether a reference is local or remote.
///
/// Tagged references keep their explicit origin. Shorthand strings starting with `http://`
/// or `https://` are remote and everything else is local.
pub fn classify(reference: &AssetReference) -> AssetResult<AssetSource> {
  let source = match reference {
    AssetReference::Shorthand(value) => {
      if value.trim().is_empty() {
        return Err(AssetError::EmptyReference);
      }
      if is_remote_reference(value) {
        AssetSource::Remote(value.clone())
      } else {
        AssetSource::Local(value.clone())
      }
    }
    AssetReference::Local { path } => {
      if path.trim().is_empty() {
        return Err(AssetError::EmptyReference);
      }
      AssetSource::Local(path.clone())
    }
    AssetReference::Remote { url } => {
      if url.trim().is_empty() {
        return Err(AssetError::EmptyReference);
      }
      AssetSource::Remote(url.clone())
    }
  };

  match &source {
    AssetSource::Remote(url) if !is_well_formed_url(url) => Err(AssetError::MalformedReference {
      reference: url.clone(),
      reason: "expected an http:// or https:// URL with a host",
    }),
    AssetSource::Local(path) if path.contains('\0') => Err(AssetError::MalformedReference {
      reference: path.replace('\0', "\\0"),
      reason: "paths may not contain NUL bytes",
    }),
    _ => Ok(source),
  }
}

/// Resolves references against a project root, using a cache for remote assets.
pub struct SourceResolver<'a, T> {
  project_root: &'a Path,
  model_extension: &'a str,
  cache: &'a ModelCache<T>,
}

impl<'a, T: Transport> SourceResolver<'a, T> {
  /// Create a resolver accepting local files with `model_extension` (without the dot).
  pub fn new(project_root: &'a Path, model_extension: &'a str, cache: &'a ModelCache<T>) -> Self {
    Self {
      project_root,
      model_extension,
      cache,
    }
  }

  /// Resolve `reference` to an existing file, downloading it if necessary.
  pub fn resolve(&self, reference: &AssetReference) -> AssetResult<ResolvedAsset> {
    let source = classify(reference)?;
    tracing::debug!("classified {} as {:?}", reference, source);

    let (path, origin) = match source {
      AssetSource::Local(path) => (self.resolve_local(&path)?, AssetOrigin::Local),
      AssetSource::Remote(url) => {
        let path = self.cache.fetch(&url)?;
        (path, AssetOrigin::Remote { url })
      }
    };

    let metadata = fs::metadata(&path).map_err(|source| AssetError::Io {
      path: path.clone(),
      source,
    })?;

    Ok(ResolvedAsset {
      path,
      byte_length: metadata.len(),
      origin,
    })
  }

  /// Validate a local reference and return its full path.
  pub fn resolve_local(&self, relative: &str) -> AssetResult<PathBuf> {
    let path = self.project_root.join(relative);

    if !has_expected_extension(&path, self.model_extension) {
      return Err(AssetError::UnsupportedExtension {
        path,
        expected: self.model_extension.to_string(),
      });
    }

    match fs::metadata(&path) {
      Ok(meta) if meta.is_file() && meta.len() == 0 => Err(AssetError::EmptyAsset { path }),
      Ok(meta) if meta.is_file() => Ok(path),
      _ => Err(AssetError::MissingFile { path }),
    }
  }
}
