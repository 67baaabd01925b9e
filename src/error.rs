//! Error types surfaced by the pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure category, used by hosts to report configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The reference itself is invalid or points at a missing or unsupported file.
  Validation,
  /// The remote asset could not be downloaded.
  Fetch,
  /// The resolved file could not be read, or the cache could not be written.
  Io,
}

/// Failure while talking to a remote server.
#[derive(Debug, Error)]
pub enum TransportError {
  /// The server answered with a non-success status.
  #[error("server responded with HTTP status {0}")]
  Status(u16),
  /// The request exceeded the configured timeout.
  #[error("request timed out")]
  Timeout,
  /// Connection, DNS, TLS or protocol failure.
  #[error("{0}")]
  Network(String),
  /// The response body could not be read.
  #[error("failed to read response body: {0}")]
  Body(#[source] io::Error),
  /// The server returned no content.
  #[error("response body was empty")]
  EmptyBody,
}

/// Errors produced while resolving, fetching or embedding an asset.
#[derive(Debug, Error)]
pub enum AssetError {
  /// Shorthand reference was empty or blank.
  #[error("asset reference is empty")]
  EmptyReference,
  /// Reference could not be interpreted.
  #[error("malformed asset reference `{reference}`: {reason}")]
  MalformedReference {
    /// Reference as written.
    reference: String,
    /// What is wrong with it.
    reason: &'static str,
  },
  /// A configured identifier cannot be used in generated code.
  #[error("invalid identifier `{identifier}`: {reason}")]
  InvalidIdentifier {
    /// Identifier as configured.
    identifier: String,
    /// What is wrong with it.
    reason: &'static str,
  },
  /// Local file exists but holds no bytes.
  #[error("asset file {} is empty", path.display())]
  EmptyAsset {
    /// Offending path.
    path: PathBuf,
  },
  /// Local file has the wrong extension.
  #[error("unsupported asset {}: only .{expected} files are supported", path.display())]
  UnsupportedExtension {
    /// Offending path.
    path: PathBuf,
    /// Extension that would have been accepted.
    expected: String,
  },
  /// Local file does not exist under the project root.
  #[error("could not find asset file {}", path.display())]
  MissingFile {
    /// Path that was checked.
    path: PathBuf,
  },
  /// Download failed.
  #[error("failed to download {url}: {source}")]
  Fetch {
    /// URL being downloaded.
    url: String,
    /// Underlying transport failure.
    #[source]
    source: TransportError,
  },
  /// A cache entry could not be written.
  #[error("failed to write cache entry {}: {source}", path.display())]
  Cache {
    /// Cache path being written.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: io::Error,
  },
  /// Path exists but is not a regular file.
  #[error("{} is not a regular file", path.display())]
  NotAFile {
    /// Offending path.
    path: PathBuf,
  },
  /// The asset could not be read.
  #[error("could not read asset file {}: {source}", path.display())]
  Io {
    /// Path being read.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: io::Error,
  },
}

impl AssetError {
  /// Category of this failure.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::EmptyReference
      | Self::MalformedReference { .. }
      | Self::InvalidIdentifier { .. }
      | Self::EmptyAsset { .. }
      | Self::UnsupportedExtension { .. }
      | Self::MissingFile { .. } => ErrorKind::Validation,
      Self::Fetch { .. } => ErrorKind::Fetch,
      Self::Cache { .. } | Self::NotAFile { .. } | Self::Io { .. } => ErrorKind::Io,
    }
  }
}

/// Result alias used across the crate.
pub type AssetResult<T> = Result<T, AssetError>;
