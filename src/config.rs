use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LEAFLET_VERSION: &str = "1.9.4";
pub const DEFAULT_TILE_URL: &str =
  "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";

/// Base map tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileLayerConfig {
  pub url: String,
  pub attribution: String,
  pub max_zoom: u8,
}

impl Default for TileLayerConfig {
  fn default() -> Self {
    TileLayerConfig {
      url: DEFAULT_TILE_URL.to_string(),
      attribution: "Esri".to_string(),
      max_zoom: 19,
    }
  }
}

/// Leaflet path style applied to every feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
  pub color: String,
  pub weight: f64,
  pub fill_color: String,
  pub fill_opacity: f64,
}

impl Default for StyleConfig {
  fn default() -> Self {
    StyleConfig {
      color: "#00BFFF".to_string(),
      weight: 2.0,
      fill_color: "#00BFFF".to_string(),
      fill_opacity: 0.3,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
  /// Page title. Falls back to the input file stem when unset.
  pub title: Option<String>,
  pub background: Option<String>,
  pub leaflet_version: Option<String>,
  pub tile_layer: TileLayerConfig,
  pub style: StyleConfig,
  /// Show feature properties in a popup on click.
  pub popups: Option<bool>,
}

impl MapConfig {
  pub fn from_file(path: &Path) -> Result<MapConfig> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let config: MapConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if !(0.0..=1.0).contains(&self.style.fill_opacity) {
      return Err(Error::Config(format!(
        "style.fill_opacity must be between 0 and 1, got {}",
        self.style.fill_opacity
      )));
    }
    if self.style.weight < 0.0 {
      return Err(Error::Config(format!(
        "style.weight must not be negative, got {}",
        self.style.weight
      )));
    }
    if self.tile_layer.url.trim().is_empty() {
      return Err(Error::Config("tile_layer.url must not be empty".to_string()));
    }
    Ok(())
  }

  pub fn title_or(&self, fallback: &str) -> String {
    self
      .title
      .clone()
      .unwrap_or_else(|| fallback.to_string())
  }

  pub fn background(&self) -> &str {
    self.background.as_deref().unwrap_or("#222")
  }

  pub fn leaflet_version(&self) -> &str {
    self
      .leaflet_version
      .as_deref()
      .unwrap_or(DEFAULT_LEAFLET_VERSION)
  }

  pub fn popups(&self) -> bool {
    self.popups.unwrap_or(true)
  }
}
