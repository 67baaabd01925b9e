#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod models;
pub mod project;
pub mod resolver;

pub use builder::{ModelArtifacts, ModelBuilder};
pub use codegen::{CodeSink, GeneratedSource};
pub use config::{ComponentConfig, PipelineConfig};
pub use error::{AssetError, AssetResult, ErrorKind, TransportError};
pub use models::{AssetReference, CacheKey, EmbeddedModel, ResolvedAsset};
pub use project::{AssetLayout, BuildContext};
