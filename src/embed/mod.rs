//! Read resolved assets and render them as firmware declarations.

mod render;

use std::fs;
use std::path::Path;

use crate::error::{AssetError, AssetResult};
use crate::models::EmbeddedModel;

pub use render::{ArrayDeclaration, BYTES_PER_LINE, SizeDeclaration, is_c_identifier, sanitize_ident};

/// Read the whole file at `path` into an [`EmbeddedModel`].
///
/// The bytes are copied verbatim.
pub fn embed(path: &Path) -> AssetResult<EmbeddedModel> {
  let metadata = fs::metadata(path).map_err(|source| AssetError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  if !metadata.is_file() {
    return Err(AssetError::NotAFile {
      path: path.to_path_buf(),
    });
  }

  let bytes = fs::read(path).map_err(|source| AssetError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  tracing::info!("embedding {} ({} bytes)", path.display(), bytes.len());

  Ok(EmbeddedModel::new(bytes))
}
