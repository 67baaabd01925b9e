//! litert-bundler - resolve, cache and embed LiteRT models for firmware builds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use litert_bundler::asset_paths::cache_key;
use litert_bundler::{
  AssetReference, BuildContext, ComponentConfig, GeneratedSource, ModelBuilder, PipelineConfig,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "litert-bundler", version, about)]
struct Cli {
  /// Project root that relative model paths and `litert.config.json` are resolved against.
  #[arg(long, global = true)]
  project_root: Option<PathBuf>,

  /// Override the download cache root (the domain subdirectory is still appended).
  #[arg(long, global = true)]
  cache_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Generate the model header for a component YAML block.
  Embed {
    /// YAML file containing the component configuration.
    component: PathBuf,
    /// Write the header here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write the setup fragment here. Defaults to `<header stem>_setup.inc` next to
    /// `--output`, or stdout after the header.
    #[arg(long)]
    setup_output: Option<PathBuf>,
  },
  /// Resolve a model reference and print the local path.
  Resolve {
    /// Local path or http(s) URL.
    reference: String,
  },
  /// Print the cache key for a URL.
  CacheKey {
    /// Remote model URL.
    url: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::registry()
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .with(filter)
    .init();

  match &cli.command {
    Command::Embed {
      component,
      output,
      setup_output,
    } => {
      let default_root = component
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
      let project_root = cli.project_root.as_deref().unwrap_or(default_root);
      let targets = EmbedTargets::new(output.as_deref(), setup_output.as_deref());
      run_embed(&cli, project_root, component, &targets)
    }
    Command::Resolve { reference } => {
      let project_root = cli.project_root.as_deref().unwrap_or(Path::new("."));
      let config = PipelineConfig::discover(project_root);
      let layout = config.to_layout();
      let builder = ModelBuilder::new(context_for(&cli, project_root, &layout));

      let resolved = builder
        .resolve(&AssetReference::Shorthand(reference.clone()))
        .with_context(|| format!("failed to resolve {reference}"))?;
      println!("{}", resolved.path.display());
      Ok(())
    }
    Command::CacheKey { url } => {
      println!("{}", cache_key(url));
      Ok(())
    }
  }
}

fn context_for<'a>(
  cli: &'a Cli,
  project_root: &'a Path,
  layout: &'a litert_bundler::AssetLayout<'a>,
) -> BuildContext<'a> {
  let context = BuildContext::new(project_root, layout);
  match cli.cache_dir.as_deref() {
    Some(cache_root) => context.with_cache_root(cache_root),
    None => context,
  }
}

/// Where the generated header and setup fragment go; `None` means stdout.
struct EmbedTargets {
  header: Option<PathBuf>,
  setup: Option<PathBuf>,
  header_name: String,
}

const DEFAULT_HEADER_NAME: &str = "litert_model.h";

impl EmbedTargets {
  fn new(header: Option<&Path>, setup: Option<&Path>) -> Self {
    let header_name = header
      .and_then(|path| path.file_name())
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| DEFAULT_HEADER_NAME.to_string());
    let setup = setup.map(Path::to_path_buf).or_else(|| {
      header.map(|path| {
        let stem = path
          .file_stem()
          .map(|stem| stem.to_string_lossy().into_owned())
          .unwrap_or_else(|| "litert_model".to_string());
        path.with_file_name(format!("{stem}_setup.inc"))
      })
    });
    Self {
      header: header.map(Path::to_path_buf),
      setup,
      header_name,
    }
  }
}

fn run_embed(
  cli: &Cli,
  project_root: &Path,
  component_path: &Path,
  targets: &EmbedTargets,
) -> Result<()> {
  let text = fs::read_to_string(component_path)
    .with_context(|| format!("failed to read {}", component_path.display()))?;
  let component = ComponentConfig::from_yaml_str(&text)
    .with_context(|| format!("invalid component configuration in {}", component_path.display()))?;

  let config = PipelineConfig::discover(project_root);
  let layout = config.to_layout();
  let builder = ModelBuilder::new(context_for(cli, project_root, &layout));

  let mut source = GeneratedSource::default();
  let artifacts = builder
    .emit(&component, &mut source)
    .with_context(|| format!("could not load model for component `{}`", component.id))?;

  let header = source.render_header();
  let setup = source.render_setup(&targets.header_name);

  match &targets.header {
    Some(path) => write_generated(path, &header)?,
    None => print!("{header}"),
  }
  match &targets.setup {
    Some(path) => write_generated(path, &setup)?,
    None => print!("\n{setup}"),
  }

  tracing::info!(
    "embedded {} ({} model bytes) for component `{}`",
    artifacts.model_identifier,
    artifacts.model.len(),
    component.id
  );
  tracing::info!(
    "link library {} from {}",
    artifacts.library.name,
    artifacts.library.repository
  );

  Ok(())
}

fn write_generated(path: &Path, contents: &str) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
  tracing::info!("wrote {}", path.display());
  Ok(())
}
