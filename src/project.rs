//! Borrowed project layout and build context shared by the pipeline stages.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Static description of how the pipeline lays out caches and generated identifiers.
#[derive(Debug, Clone, Copy)]
pub struct AssetLayout<'a> {
  /// Cache namespace for downloaded assets of this component.
  pub domain: &'a str,
  /// Cache root, relative to the project root unless absolute.
  pub cache_dir: &'a str,
  /// Upper bound for a single download.
  pub download_timeout: Duration,
  /// Maximum number of redirects followed while downloading.
  pub max_redirects: u32,
  /// File extension (without the dot) accepted for local assets.
  pub model_extension: &'a str,
  /// Default identifier of the generated byte array.
  pub model_identifier: &'a str,
  /// Suffix appended to the array identifier to name the size constant.
  pub size_suffix: &'a str,
  /// Placement attribute attached to the generated array.
  pub memory_attribute: &'a str,
  /// Name of the inference library the component links against.
  pub library_name: &'a str,
  /// Repository the inference library is fetched from.
  pub library_repository: &'a str,
}

/// Explicit context handed to every pipeline stage.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
  /// Directory relative references are resolved against.
  pub project_root: &'a Path,
  /// Layout describing cache and naming conventions.
  pub layout: &'a AssetLayout<'a>,
  /// Fully resolved cache directory for this component's domain.
  pub cache_dir: PathBuf,
}

impl<'a> BuildContext<'a> {
  /// Create a context rooted at `project_root`.
  pub fn new(project_root: &'a Path, layout: &'a AssetLayout<'a>) -> Self {
    let cache_dir = project_root.join(layout.cache_dir).join(layout.domain);
    Self {
      project_root,
      layout,
      cache_dir,
    }
  }

  /// Override the cache root, keeping the per-domain subdirectory.
  #[must_use]
  pub fn with_cache_root(mut self, cache_root: &Path) -> Self {
    self.cache_dir = cache_root.join(self.layout.domain);
    self
  }
}

#[cfg(test)]
pub(crate) fn test_layout() -> AssetLayout<'static> {
  AssetLayout {
    domain: "litert",
    cache_dir: ".esphome/external_files",
    download_timeout: Duration::from_secs(30),
    max_redirects: 10,
    model_extension: "tflite",
    model_identifier: "LITERT_MODEL",
    size_suffix: "_SIZE",
    memory_attribute: "PROGMEM",
    library_name: "TensorFlow",
    library_repository: "https://github.com/jfbuggen/esp-tflite-micro.git",
  }
}
