//! Model build orchestrator: resolve, fetch, embed and render a component's model.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::codegen::{CodeSink, op_resolver_declaration, set_model_data_statement};
use crate::config::ComponentConfig;
use crate::embed::{ArrayDeclaration, SizeDeclaration, embed, is_c_identifier, sanitize_ident};
use crate::error::{AssetError, AssetResult};
use crate::fetch::{HttpTransport, ModelCache, Transport};
use crate::models::{
  AssetOrigin, AssetReference, EmbeddedModel, LibraryDependency, ResolvedAsset,
};
use crate::project::BuildContext;
use crate::resolver::SourceResolver;

/// Everything generated for a single model loader component.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
  /// File the model was read from.
  pub asset: ResolvedAsset,
  /// Exact model bytes.
  pub model: EmbeddedModel,
  /// Identifier of the generated array.
  pub model_identifier: String,
  /// Identifier of the generated size constant.
  pub size_identifier: String,
  /// Program-memory array declaration.
  pub model_declaration: String,
  /// Size constant declaration.
  pub size_declaration: String,
  /// Op resolver declaration for the component.
  pub op_resolver_declaration: String,
  /// Setup statement passing the model to the component.
  pub setup_statement: String,
  /// Library the component links against.
  pub library: LibraryDependency,
  /// Local files whose changes should trigger regeneration.
  pub rerun_paths: Vec<PathBuf>,
}

/// High-level helper running the full pipeline for model loader components.
pub struct ModelBuilder<'a, T = HttpTransport> {
  context: BuildContext<'a>,
  cache: ModelCache<T>,
}

impl<'a> ModelBuilder<'a, HttpTransport> {
  /// Create a builder that downloads remote models over HTTP.
  pub fn new(context: BuildContext<'a>) -> Self {
    let transport = HttpTransport::new(
      context.layout.download_timeout,
      context.layout.max_redirects,
    );
    Self::with_transport(context, transport)
  }
}

impl<'a, T: Transport> ModelBuilder<'a, T> {
  /// Create a builder using a custom transport for remote models.
  pub fn with_transport(context: BuildContext<'a>, transport: T) -> Self {
    let cache = ModelCache::new(context.cache_dir.clone(), transport);
    Self { context, cache }
  }

  /// Download cache used for remote models.
  pub fn cache(&self) -> &ModelCache<T> {
    &self.cache
  }

  /// Resolve a reference to a file on disk without embedding it.
  pub fn resolve(&self, reference: &AssetReference) -> AssetResult<ResolvedAsset> {
    SourceResolver::new(
      self.context.project_root,
      self.context.layout.model_extension,
      &self.cache,
    )
    .resolve(reference)
  }

  /// Run the pipeline for `component` and return the generated artifacts.
  ///
  /// All validation, download and read failures surface before any code is rendered.
  pub fn build(&self, component: &ComponentConfig) -> AssetResult<ModelArtifacts> {
    let layout = self.context.layout;
    let names =
      GeneratedNames::for_component(component, layout.model_identifier, layout.size_suffix)?;

    let asset = self.resolve(&component.file)?;
    let model = embed(&asset.path)?;
    let GeneratedNames {
      component: component_identifier,
      model: model_identifier,
      size: size_identifier,
      op_resolver: op_resolver_identifier,
    } = names;

    let model_declaration =
      ArrayDeclaration::for_model(&model_identifier, layout.memory_attribute, &model).render();
    let size_declaration = SizeDeclaration {
      identifier: &size_identifier,
      length: model.len(),
    }
    .render();

    let rerun_paths = match asset.origin {
      AssetOrigin::Local => vec![asset.path.clone()],
      AssetOrigin::Remote { .. } => Vec::new(),
    };

    Ok(ModelArtifacts {
      op_resolver_declaration: op_resolver_declaration(
        &op_resolver_identifier,
        component.op_count,
      ),
      setup_statement: set_model_data_statement(
        &component_identifier,
        &model_identifier,
        &size_identifier,
      ),
      library: LibraryDependency {
        name: layout.library_name.to_string(),
        repository: layout.library_repository.to_string(),
      },
      asset,
      model,
      model_identifier,
      size_identifier,
      model_declaration,
      size_declaration,
      rerun_paths,
    })
  }

  /// Build `component` and push the generated code into `sink`.
  ///
  /// Nothing is written to the sink when the build fails.
  pub fn emit<S: CodeSink>(
    &self,
    component: &ComponentConfig,
    sink: &mut S,
  ) -> AssetResult<ModelArtifacts> {
    let artifacts = self.build(component)?;
    sink.add_global(artifacts.model_declaration.clone());
    sink.add_global(artifacts.size_declaration.clone());
    sink.add_declaration(artifacts.op_resolver_declaration.clone());
    sink.add_statement(artifacts.setup_statement.clone());
    Ok(artifacts)
  }
}

/// Identifiers used by the generated code for one component.
struct GeneratedNames {
  component: String,
  model: String,
  size: String,
  op_resolver: String,
}

impl GeneratedNames {
  /// The component id is declared by the host and is used verbatim; generated names never
  /// shadow it.
  fn for_component(
    component: &ComponentConfig,
    default_model_identifier: &str,
    size_suffix: &str,
  ) -> AssetResult<Self> {
    if !is_c_identifier(&component.id) {
      return Err(AssetError::InvalidIdentifier {
        identifier: component.id.clone(),
        reason: "component ids must be valid C identifiers",
      });
    }

    let mut used_idents = BTreeSet::new();
    let model = sanitize_ident(
      component
        .raw_data_id
        .as_deref()
        .unwrap_or(default_model_identifier),
      &mut used_idents,
    );
    let size = sanitize_ident(&format!("{model}{size_suffix}"), &mut used_idents);
    let op_resolver = sanitize_ident(&format!("{}_op_res", component.id), &mut used_idents);

    if [&model, &size, &op_resolver].contains(&&component.id) {
      return Err(AssetError::InvalidIdentifier {
        identifier: component.id.clone(),
        reason: "component id collides with a generated model identifier",
      });
    }

    Ok(Self {
      component: component.id.clone(),
      model,
      size,
      op_resolver,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;
  use std::fs;
  use std::path::Path;
  use tempfile::tempdir;

  use crate::asset_paths::cache_key;
  use crate::codegen::GeneratedSource;
  use crate::error::{ErrorKind, TransportError};
  use crate::project::test_layout;

  struct StaticTransport {
    body: Vec<u8>,
    calls: Cell<usize>,
  }

  impl StaticTransport {
    fn new(body: Vec<u8>) -> Self {
      Self {
        body,
        calls: Cell::new(0),
      }
    }
  }

  impl Transport for StaticTransport {
    fn get(&self, _url: &str) -> Result<Vec<u8>, TransportError> {
      self.calls.set(self.calls.get() + 1);
      Ok(self.body.clone())
    }
  }

  fn write_model(root: &Path, relative: &str, len: usize) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0xabu8; len]).unwrap();
  }

  #[test]
  fn local_component_embeds_exact_length() {
    let temp = tempdir().unwrap();
    write_model(temp.path(), "models/m.tflite", 1024);
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let builder = ModelBuilder::with_transport(context, StaticTransport::new(Vec::new()));

    let component = ComponentConfig::for_reference(AssetReference::Local {
      path: "models/m.tflite".into(),
    });
    let artifacts = builder.build(&component).unwrap();

    assert_eq!(artifacts.asset.path, temp.path().join("models/m.tflite"));
    assert_eq!(artifacts.model.len(), 1024);
    assert!(
      artifacts
        .model_declaration
        .starts_with("const uint8_t LITERT_MODEL[1024] PROGMEM = {")
    );
    assert_eq!(
      artifacts.size_declaration,
      "const size_t LITERT_MODEL_SIZE = 1024;"
    );
    assert_eq!(artifacts.rerun_paths, vec![temp.path().join("models/m.tflite")]);
    assert_eq!(artifacts.library.name, "TensorFlow");
  }

  #[test]
  fn remote_component_downloads_into_domain_cache() {
    let temp = tempdir().unwrap();
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let transport = StaticTransport::new(vec![1, 2, 3, 4, 5]);
    let builder = ModelBuilder::with_transport(context, &transport);
    let url = "https://example.com/model.tflite";

    let component = ComponentConfig::for_reference(AssetReference::Shorthand(url.into()));
    let artifacts = builder.build(&component).unwrap();
    let expected = temp
      .path()
      .join(".esphome/external_files/litert")
      .join(cache_key(url).as_str());

    assert_eq!(artifacts.asset.path, expected);
    assert_eq!(artifacts.model.bytes(), &[1, 2, 3, 4, 5]);
    assert_eq!(artifacts.size_declaration, "const size_t LITERT_MODEL_SIZE = 5;");
    assert!(artifacts.rerun_paths.is_empty());

    builder.build(&component).unwrap();
    assert_eq!(transport.calls.get(), 1);
  }

  #[test]
  fn custom_identifiers_flow_into_wiring() {
    let temp = tempdir().unwrap();
    write_model(temp.path(), "m.tflite", 3);
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let builder = ModelBuilder::with_transport(context, StaticTransport::new(Vec::new()));

    let component = ComponentConfig::from_yaml_str(
      "id: detector\nraw_data_id: person-model\nop_count: 6\nfile: m.tflite",
    )
    .unwrap();
    let mut sink = GeneratedSource::default();
    let artifacts = builder.emit(&component, &mut sink).unwrap();

    assert_eq!(artifacts.model_identifier, "person_model");
    assert_eq!(artifacts.size_identifier, "person_model_SIZE");
    assert_eq!(sink.globals.len(), 2);
    assert_eq!(sink.declarations, vec![
      "static tflite::MicroMutableOpResolver<6> detector_op_res;".to_string()
    ]);
    assert_eq!(sink.statements, vec![
      "detector->set_model_data(person_model, person_model_SIZE);".to_string()
    ]);
  }

  #[test]
  fn valid_component_ids_are_kept_verbatim() {
    let temp = tempdir().unwrap();
    write_model(temp.path(), "m.tflite", 3);
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let builder = ModelBuilder::with_transport(context, StaticTransport::new(Vec::new()));

    let component = ComponentConfig::from_yaml_str("id: my__detector\nfile: m.tflite").unwrap();
    let artifacts = builder.build(&component).unwrap();

    assert_eq!(
      artifacts.setup_statement,
      "my__detector->set_model_data(LITERT_MODEL, LITERT_MODEL_SIZE);"
    );
    assert_eq!(
      artifacts.op_resolver_declaration,
      "static tflite::MicroMutableOpResolver<4> my__detector_op_res;"
    );
  }

  #[test]
  fn component_id_colliding_with_model_identifier_is_rejected() {
    let temp = tempdir().unwrap();
    write_model(temp.path(), "m.tflite", 3);
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let transport = StaticTransport::new(vec![1]);
    let builder = ModelBuilder::with_transport(context, &transport);

    let component =
      ComponentConfig::from_yaml_str("id: model\nraw_data_id: model\nfile: m.tflite").unwrap();
    let mut sink = GeneratedSource::default();
    let err = builder.emit(&component, &mut sink).unwrap_err();

    assert!(matches!(err, AssetError::InvalidIdentifier { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(sink, GeneratedSource::default());
  }

  #[test]
  fn invalid_component_id_fails_before_download() {
    let temp = tempdir().unwrap();
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let transport = StaticTransport::new(vec![1]);
    let builder = ModelBuilder::with_transport(context, &transport);

    let component = ComponentConfig::from_yaml_str(
      "id: my-detector\nfile: https://example.com/model.tflite",
    )
    .unwrap();
    let err = builder.build(&component).unwrap_err();

    assert!(matches!(err, AssetError::InvalidIdentifier { .. }));
    assert_eq!(transport.calls.get(), 0);
  }

  #[test]
  fn rejected_extension_emits_nothing() {
    let temp = tempdir().unwrap();
    write_model(temp.path(), "weights.bin", 16);
    let layout = test_layout();
    let context = BuildContext::new(temp.path(), &layout);
    let builder = ModelBuilder::with_transport(context, StaticTransport::new(Vec::new()));

    let component = ComponentConfig::for_reference(AssetReference::Shorthand("weights.bin".into()));
    let mut sink = GeneratedSource::default();
    let err = builder.emit(&component, &mut sink).unwrap_err();

    assert!(matches!(err, AssetError::UnsupportedExtension { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(sink, GeneratedSource::default());
  }

  #[test]
  fn unreachable_host_reports_fetch_error_without_cache_file() {
    let temp = tempdir().unwrap();
    let mut layout = test_layout();
    layout.download_timeout = std::time::Duration::from_secs(1);
    let context = BuildContext::new(temp.path(), &layout);
    let builder = ModelBuilder::new(context);
    let url = "http://127.0.0.1:1/model.tflite";

    let component = ComponentConfig::for_reference(AssetReference::Remote { url: url.into() });
    let err = builder.build(&component).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(!builder.cache().entry_for(url).path.exists());
  }
}
