//! Content-addressed download cache.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::asset_paths::cache_key;
use crate::error::{AssetError, AssetResult};
use crate::fetch::transport::Transport;
use crate::models::CacheEntry;

/// Download cache rooted at a per-domain directory.
///
/// Entries are keyed by a digest prefix of their URL and are never evicted here.
pub struct ModelCache<T> {
  cache_dir: PathBuf,
  transport: T,
}

impl<T: Transport> ModelCache<T> {
  /// Create a cache that stores entries directly inside `cache_dir`.
  pub fn new(cache_dir: impl Into<PathBuf>, transport: T) -> Self {
    Self {
      cache_dir: cache_dir.into(),
      transport,
    }
  }

  /// Directory holding cache entries.
  pub fn cache_dir(&self) -> &Path {
    &self.cache_dir
  }

  /// Transport used on cache misses.
  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Cache slot assigned to `url`.
  pub fn entry_for(&self, url: &str) -> CacheEntry {
    CacheEntry::new(&self.cache_dir, cache_key(url))
  }

  /// Returns `true` when `url` has a non-empty cached copy.
  pub fn is_cached(&self, url: &str) -> bool {
    is_populated(&self.entry_for(url).path)
  }

  /// Return the cached path for `url`, downloading it first on a miss.
  pub fn fetch(&self, url: &str) -> AssetResult<PathBuf> {
    let entry = self.entry_for(url);

    if is_populated(&entry.path) {
      tracing::debug!("cache hit for {} at {}", url, entry.path.display());
      return Ok(entry.path);
    }

    fs::create_dir_all(&self.cache_dir).map_err(|source| AssetError::Cache {
      path: self.cache_dir.clone(),
      source,
    })?;

    tracing::info!("downloading {} into {}", url, entry.path.display());
    let body = self.transport.get(url).map_err(|source| {
      tracing::warn!("download of {} failed: {}", url, source);
      AssetError::Fetch {
        url: url.to_string(),
        source,
      }
    })?;

    write_atomically(&self.cache_dir, &entry.path, &body)?;
    tracing::info!("cached {} bytes for {} as {}", body.len(), url, entry.key);

    Ok(entry.path)
  }
}

fn is_populated(path: &Path) -> bool {
  fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// Write `contents` to a sibling temp file and rename it over `destination`.
fn write_atomically(dir: &Path, destination: &Path, contents: &[u8]) -> AssetResult<()> {
  let cache_error = |source| AssetError::Cache {
    path: destination.to_path_buf(),
    source,
  };

  let mut staged = NamedTempFile::new_in(dir).map_err(cache_error)?;
  staged.write_all(contents).map_err(cache_error)?;
  staged.as_file().sync_all().map_err(cache_error)?;
  staged
    .persist(destination)
    .map_err(|err| cache_error(err.error))?;
  Ok(())
}
