//! Project and component configuration loaders.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::models::AssetReference;
use crate::project::AssetLayout;

const DEFAULT_CONFIG_FILE: &str = "litert.config.json";

/// Discoverable project configuration describing cache layout and generated names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Cache namespace for downloaded models.
  pub domain: String,
  /// Cache root relative to the project root.
  pub cache_dir: String,
  /// Download timeout in seconds.
  pub download_timeout_secs: u64,
  /// Maximum redirects followed per download.
  pub max_redirects: u32,
  /// Accepted extension for local model files.
  pub model_extension: String,
  /// Default identifier of the generated model array.
  pub model_identifier: String,
  /// Suffix appended to the array identifier for the size constant.
  pub size_suffix: String,
  /// Placement attribute for the generated array.
  pub memory_attribute: String,
  /// Inference library linked by the component.
  pub library_name: String,
  /// Repository of the inference library.
  pub library_repository: String,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      domain: "litert".into(),
      cache_dir: ".esphome/external_files".into(),
      download_timeout_secs: 30,
      max_redirects: 10,
      model_extension: "tflite".into(),
      model_identifier: "LITERT_MODEL".into(),
      size_suffix: "_SIZE".into(),
      memory_attribute: "PROGMEM".into(),
      library_name: "TensorFlow".into(),
      library_repository: "https://github.com/jfbuggen/esp-tflite-micro.git".into(),
    }
  }
}

impl PipelineConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// Missing or unparsable files fall back to the defaults.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Some(config) => {
        tracing::debug!("loaded pipeline configuration from {}", candidate.display());
        config
      }
      None => Self::default(),
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Borrowing conversion into a layout.
  pub fn to_layout(&self) -> AssetLayout<'_> {
    AssetLayout {
      domain: &self.domain,
      cache_dir: &self.cache_dir,
      download_timeout: Duration::from_secs(self.download_timeout_secs),
      max_redirects: self.max_redirects,
      model_extension: self.model_extension.trim_start_matches('.'),
      model_identifier: &self.model_identifier,
      size_suffix: &self.size_suffix,
      memory_attribute: &self.memory_attribute,
      library_name: &self.library_name,
      library_repository: &self.library_repository,
    }
  }
}

/// Number of operators registered with the op resolver when unspecified.
pub const DEFAULT_OP_COUNT: usize = 4;

fn default_component_id() -> String {
  "litert_component".into()
}

fn default_op_count() -> usize {
  DEFAULT_OP_COUNT
}

/// YAML configuration block of a single model loader component.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
  /// Identifier of the generated component instance.
  #[serde(default = "default_component_id")]
  pub id: String,
  /// Model file reference.
  pub file: AssetReference,
  /// Optional override for the generated array identifier.
  #[serde(default)]
  pub raw_data_id: Option<String>,
  /// Capacity of the generated op resolver.
  #[serde(default = "default_op_count")]
  pub op_count: usize,
}

impl ComponentConfig {
  /// Parse a component block from YAML text.
  pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(text)
  }

  /// Configuration for a bare reference with every other field defaulted.
  pub fn for_reference(file: AssetReference) -> Self {
    Self {
      id: default_component_id(),
      file,
      raw_data_id: None,
      op_count: DEFAULT_OP_COUNT,
    }
  }
}
