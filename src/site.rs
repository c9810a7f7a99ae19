use crate::config::MapConfig;
use crate::deploy::DeployConfig;
use crate::error::{Error, Result};
use crate::overlay::ImageOverlay;
use crate::projection::{self, Classification};
use crate::source::GeoJsonSource;
use crate::template::{self, MapData, MapPage, PageOverlay};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
  /// Inline the GeoJSON into `index.html`.
  #[default]
  Embed,
  /// Write the GeoJSON next to `index.html` and fetch it.
  Reference,
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
  pub input: PathBuf,
  pub out_dir: PathBuf,
  pub config: MapConfig,
  pub data_mode: DataMode,
  pub overlay: Option<ImageOverlay>,
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
  pub index: PathBuf,
  pub deploy_config: PathBuf,
  /// Files written besides the page and the deploy config.
  pub assets: Vec<PathBuf>,
  pub classification: Classification,
  pub feature_count: usize,
}

// kelani_river.geojson -> "Kelani River Map"
fn default_title(input: &Path) -> String {
  let stem = input
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or("");
  let mut words: Vec<String> = stem
    .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
    .filter(|word| !word.is_empty())
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect();
  words.push("Map".to_string());
  words.join(" ")
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
  std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

pub fn check_source(source: &GeoJsonSource) -> Classification {
  if source.invalid_geometries > 0 {
    warn!(
      count = source.invalid_geometries,
      "some geometries are malformed and were not checked"
    );
  }
  let classification = projection::check_collection(&source.collection);
  match classification.warning() {
    Some(message) => warn!("{}", message),
    None => info!(result = %classification, "coordinate check"),
  }
  classification
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
  pub input: PathBuf,
  pub classification: Classification,
  pub warning: Option<String>,
}

impl fmt::Display for CheckReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.input.display(), self.classification)?;
    if let Some(warning) = &self.warning {
      write!(f, "\n{}", warning)?;
    }
    Ok(())
  }
}

/// Coordinate check without generating anything. Only a missing or non-JSON
/// input is an error; every classification is a successful result.
pub fn check_file(input: &Path) -> Result<CheckReport> {
  let source = GeoJsonSource::load(input)?;
  let classification = check_source(&source);
  Ok(CheckReport {
    input: input.to_path_buf(),
    classification,
    warning: classification.warning(),
  })
}

pub fn generate(options: &GenerateOptions) -> Result<GenerateReport> {
  info!(
    "Reading {} and writing to {}",
    options.input.display(),
    options.out_dir.display()
  );
  options.config.validate()?;

  let source = GeoJsonSource::load(&options.input)?;
  info!(
    features = source.feature_count(),
    kinds = ?source.summary(),
    "loaded GeoJSON"
  );
  let classification = check_source(&source);

  std::fs::create_dir_all(&options.out_dir).map_err(|e| Error::io(&options.out_dir, e))?;

  let mut assets = Vec::new();
  let json = source.to_json()?;
  let data = match options.data_mode {
    DataMode::Embed => MapData::Embedded(json),
    DataMode::Reference => {
      let file_name = source.file_name();
      let path = options.out_dir.join(&file_name);
      // the input may already live in the output directory
      if path.canonicalize().ok() != source.path.canonicalize().ok() {
        write_file(&path, &json)?;
      }
      assets.push(path);
      MapData::Referenced(file_name)
    }
  };

  let overlay = match &options.overlay {
    Some(overlay) => {
      let path = overlay.copy_into(&options.out_dir)?;
      assets.push(path);
      Some(PageOverlay {
        file_name: overlay.file_name()?,
        bounds: overlay.bounds,
        opacity: overlay.opacity,
      })
    }
    None => None,
  };

  let page = MapPage {
    title: options.config.title_or(&default_title(&options.input)),
    config: &options.config,
    data,
    overlay,
  };
  let index = options.out_dir.join(INDEX_FILE);
  write_file(&index, &template::render(&page)?)?;

  let asset_names: Vec<String> = assets
    .iter()
    .filter_map(|path| path.file_name())
    .map(|name| name.to_string_lossy().into_owned())
    .collect();
  let deploy_config = DeployConfig::for_site(INDEX_FILE, &asset_names).write(&options.out_dir)?;

  info!("{} generated", index.display());
  Ok(GenerateReport {
    index,
    deploy_config,
    assets,
    classification,
    feature_count: source.feature_count(),
  })
}
