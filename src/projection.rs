use geojson::{FeatureCollection, PointType, Value};
use std::fmt;

// beyond this a coordinate is taken to be in meters, not degrees
pub const MAX_DEGREES_MAGNITUDE: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
  Valid,
  SuspiciousProjection { value: f64 },
  /// Nothing to check: no features, no geometry or no coordinates.
  Inconclusive,
}

impl Classification {
  pub fn is_suspicious(&self) -> bool {
    matches!(self, Classification::SuspiciousProjection { .. })
  }

  pub fn warning(&self) -> Option<String> {
    match self {
      Classification::SuspiciousProjection { value } => Some(format!(
        "coordinates look projected (value found: {}). The map expects longitude/latitude \
         in degrees (WGS84). If the map is blank, re-export the data as EPSG:4326.",
        value
      )),
      _ => None,
    }
  }
}

impl fmt::Display for Classification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Classification::Valid => write!(f, "valid"),
      Classification::SuspiciousProjection { value } => {
        write!(f, "suspicious projection ({})", value)
      }
      Classification::Inconclusive => write!(f, "inconclusive"),
    }
  }
}

// the first position of a geometry, found at the nesting depth of its type
fn representative_position(value: &Value) -> Option<&PointType> {
  match value {
    Value::Point(position) => Some(position),
    Value::MultiPoint(positions) | Value::LineString(positions) => positions.first(),
    Value::MultiLineString(lines) | Value::Polygon(lines) => lines.first()?.first(),
    Value::MultiPolygon(polygons) => polygons.first()?.first()?.first(),
    Value::GeometryCollection(geometries) => representative_position(&geometries.first()?.value),
  }
}

pub fn classify_value(value: f64) -> Classification {
  if value.abs() > MAX_DEGREES_MAGNITUDE {
    Classification::SuspiciousProjection { value }
  } else {
    Classification::Valid
  }
}

/// Classify a feature collection by the first coordinate of its first feature.
pub fn check_collection(collection: &FeatureCollection) -> Classification {
  let value = collection
    .features
    .first()
    .and_then(|feature| feature.geometry.as_ref())
    .and_then(|geometry| representative_position(&geometry.value))
    .and_then(|position| position.first().copied());

  match value {
    Some(value) => classify_value(value),
    None => Classification::Inconclusive,
  }
}
