use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("could not find input file {}", .0.display())]
  MissingInput(PathBuf),

  #[error("{}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The input is not JSON at all. Malformed GeoJSON inside valid JSON is
  /// not an error.
  #[error("invalid JSON in {}: {source}", .path.display())]
  InvalidJson {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("configuration error: {0}")]
  Config(String),

  #[error("invalid image bounds '{input}': {reason}")]
  InvalidBounds { input: String, reason: String },

  #[error("preview server error: {0}")]
  Server(std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
