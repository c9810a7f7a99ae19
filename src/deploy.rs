use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEPLOY_CONFIG_FILE: &str = "vercel.json";
const STATIC_BUILDER: &str = "@vercel/static";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
  pub src: String,
  #[serde(rename = "use")]
  pub builder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
  Handle { handle: String },
  Rewrite { src: String, dest: String },
}

/// Static hosting config for the generated site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
  pub version: u8,
  pub builds: Vec<Build>,
  pub routes: Vec<Route>,
}

impl DeployConfig {
  /// Every path is served by the page, except `assets` which are served as
  /// files when present.
  pub fn for_site(index: &str, assets: &[String]) -> DeployConfig {
    let builds = std::iter::once(index)
      .chain(assets.iter().map(|asset| asset.as_str()))
      .map(|src| Build {
        src: src.to_string(),
        builder: STATIC_BUILDER.to_string(),
      })
      .collect();

    let mut routes = Vec::new();
    if !assets.is_empty() {
      routes.push(Route::Handle {
        handle: "filesystem".to_string(),
      });
    }
    routes.push(Route::Rewrite {
      src: "/(.*)".to_string(),
      dest: format!("/{}", index),
    });

    DeployConfig {
      version: 2,
      builds,
      routes,
    }
  }

  pub fn write(&self, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(DEPLOY_CONFIG_FILE);
    let json = serde_json::to_string_pretty(self)?;
    std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_index_only() {
    let config = DeployConfig::for_site("index.html", &[]);
    assert_eq!(
      serde_json::to_value(&config).unwrap(),
      json!({
        "version": 2,
        "builds": [{ "src": "index.html", "use": "@vercel/static" }],
        "routes": [{ "src": "/(.*)", "dest": "/index.html" }]
      })
    );
  }

  #[test]
  fn test_with_assets() {
    let assets = vec!["kelani.geojson".to_string(), "flood.png".to_string()];
    let config = DeployConfig::for_site("index.html", &assets);
    assert_eq!(
      serde_json::to_value(&config).unwrap(),
      json!({
        "version": 2,
        "builds": [
          { "src": "index.html", "use": "@vercel/static" },
          { "src": "kelani.geojson", "use": "@vercel/static" },
          { "src": "flood.png", "use": "@vercel/static" }
        ],
        "routes": [
          { "handle": "filesystem" },
          { "src": "/(.*)", "dest": "/index.html" }
        ]
      })
    );
  }

  #[test]
  fn test_write_is_indented() {
    let dir = tempfile::tempdir().unwrap();
    let path = DeployConfig::for_site("index.html", &[])
      .write(dir.path())
      .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"version\": 2,"));
    let parsed: DeployConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, DeployConfig::for_site("index.html", &[]));
  }
}
