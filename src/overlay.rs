use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Geographic extent of a raster overlay, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
  pub south: f64,
  pub west: f64,
  pub north: f64,
  pub east: f64,
}

impl FromStr for Bounds {
  type Err = Error;

  /// Parses `south,west,north,east`.
  fn from_str(s: &str) -> Result<Bounds> {
    let invalid = |reason: &str| Error::InvalidBounds {
      input: s.to_string(),
      reason: reason.to_string(),
    };

    let parts = s
      .split(',')
      .map(|part| part.trim().parse::<f64>())
      .collect::<std::result::Result<Vec<f64>, _>>()
      .map_err(|_| invalid("expected four numbers"))?;
    let (south, west, north, east) = match parts[..] {
      [south, west, north, east] => (south, west, north, east),
      _ => return Err(invalid("expected four numbers")),
    };

    for lat in [south, north] {
      if !(-90.0..=90.0).contains(&lat) {
        return Err(invalid("latitude out of range [-90, 90]"));
      }
    }
    for lon in [west, east] {
      if !(-180.0..=180.0).contains(&lon) {
        return Err(invalid("longitude out of range [-180, 180]"));
      }
    }
    if south > north {
      return Err(invalid("south is greater than north"));
    }

    Ok(Bounds {
      south,
      west,
      north,
      east,
    })
  }
}

/// A local raster image to draw above the base layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOverlay {
  pub path: PathBuf,
  pub bounds: Bounds,
  pub opacity: f64,
}

pub const DEFAULT_OPACITY: f64 = 0.7;

impl ImageOverlay {
  pub fn new(path: PathBuf, bounds: Bounds, opacity: Option<f64>) -> Result<ImageOverlay> {
    let opacity = opacity.unwrap_or(DEFAULT_OPACITY);
    if !(0.0..=1.0).contains(&opacity) {
      return Err(Error::Config(format!(
        "image opacity must be between 0 and 1, got {}",
        opacity
      )));
    }
    Ok(ImageOverlay {
      path,
      bounds,
      opacity,
    })
  }

  pub fn file_name(&self) -> Result<String> {
    self
      .path
      .file_name()
      .and_then(|name| name.to_str())
      .map(|name| name.to_string())
      .ok_or_else(|| Error::Config(format!("bad image path {}", self.path.display())))
  }

  /// Copy the image into `out_dir`, returning the destination.
  pub fn copy_into(&self, out_dir: &Path) -> Result<PathBuf> {
    if !self.path.exists() {
      return Err(Error::MissingInput(self.path.clone()));
    }
    let dest = out_dir.join(self.file_name()?);
    // copying a file onto itself truncates it
    if dest.canonicalize().ok() != self.path.canonicalize().ok() {
      std::fs::copy(&self.path, &dest).map_err(|e| Error::io(&dest, e))?;
    }
    Ok(dest)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_bounds() {
    let bounds: Bounds = "6.9, 79.8, 7.1, 80.2".parse().unwrap();
    assert_eq!(
      bounds,
      Bounds {
        south: 6.9,
        west: 79.8,
        north: 7.1,
        east: 80.2
      }
    );
  }

  #[test]
  fn test_reject_bad_bounds() {
    assert!("1,2,3".parse::<Bounds>().is_err());
    assert!("1,2,3,4,5".parse::<Bounds>().is_err());
    assert!("a,b,c,d".parse::<Bounds>().is_err());
    assert!("-91,0,0,1".parse::<Bounds>().is_err());
    assert!("0,0,1,181".parse::<Bounds>().is_err());
    assert!("7,0,6,1".parse::<Bounds>().is_err());
  }

  #[test]
  fn test_opacity() {
    let bounds: Bounds = "0,0,1,1".parse().unwrap();
    let overlay = ImageOverlay::new(PathBuf::from("a.png"), bounds, None).unwrap();
    assert_eq!(overlay.opacity, DEFAULT_OPACITY);
    assert!(ImageOverlay::new(PathBuf::from("a.png"), bounds, Some(2.0)).is_err());
  }

  #[test]
  fn test_copy_into() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let image = src_dir.path().join("flood.png");
    std::fs::write(&image, b"\x89PNG fake").unwrap();

    let bounds: Bounds = "0,0,1,1".parse().unwrap();
    let overlay = ImageOverlay::new(image, bounds, Some(0.5)).unwrap();
    let dest = overlay.copy_into(out_dir.path()).unwrap();
    assert_eq!(dest, out_dir.path().join("flood.png"));
    assert_eq!(std::fs::read(dest).unwrap(), b"\x89PNG fake");
  }

  #[test]
  fn test_copy_onto_itself_keeps_content() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("flood.png");
    std::fs::write(&image, b"data").unwrap();
    let bounds: Bounds = "0,0,1,1".parse().unwrap();
    let overlay = ImageOverlay::new(image.clone(), bounds, None).unwrap();
    overlay.copy_into(dir.path()).unwrap();
    assert_eq!(std::fs::read(image).unwrap(), b"data");
  }
}
