use crate::error::{Error, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const GEOMETRY_TYPES: [&str; 7] = [
  "Point",
  "MultiPoint",
  "LineString",
  "MultiLineString",
  "Polygon",
  "MultiPolygon",
  "GeometryCollection",
];

/// A GeoJSON input file. `document` is the JSON as read and is what gets
/// published; `collection` holds the features whose geometry parsed.
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
  pub path: PathBuf,
  pub document: JsonValue,
  pub collection: FeatureCollection,
  pub invalid_geometries: usize,
}

// malformed geometries become None instead of failing the whole document
fn lenient_feature(object: &JsonObject, invalid: &mut usize) -> Feature {
  let geometry = match object.get("geometry") {
    None | Some(JsonValue::Null) => None,
    Some(value) => match Geometry::from_json_value(value.clone()) {
      Ok(geometry) => Some(geometry),
      Err(err) => {
        debug!(error = %err, "skipping malformed geometry");
        *invalid += 1;
        None
      }
    },
  };
  Feature {
    bbox: None,
    geometry,
    id: None,
    properties: object
      .get("properties")
      .and_then(|properties| properties.as_object())
      .cloned(),
    foreign_members: None,
  }
}

fn lenient_collection(document: &JsonValue, invalid: &mut usize) -> FeatureCollection {
  let root_type = document.get("type").and_then(|t| t.as_str()).unwrap_or("");
  let features = match (root_type, document.as_object()) {
    ("FeatureCollection", _) => document
      .get("features")
      .and_then(|features| features.as_array())
      .map(|features| {
        features
          .iter()
          .filter_map(|feature| feature.as_object())
          .map(|feature| lenient_feature(feature, invalid))
          .collect()
      })
      .unwrap_or_default(),
    ("Feature", Some(object)) => vec![lenient_feature(object, invalid)],
    (kind, Some(_)) if GEOMETRY_TYPES.contains(&kind) => {
      let mut wrapper = JsonObject::new();
      wrapper.insert("geometry".to_string(), document.clone());
      vec![lenient_feature(&wrapper, invalid)]
    }
    _ => Vec::new(),
  };
  FeatureCollection {
    bbox: None,
    features,
    foreign_members: None,
  }
}

fn geometry_kind(value: &Value) -> &'static str {
  match value {
    Value::Point(_) => "Point",
    Value::MultiPoint(_) => "MultiPoint",
    Value::LineString(_) => "LineString",
    Value::MultiLineString(_) => "MultiLineString",
    Value::Polygon(_) => "Polygon",
    Value::MultiPolygon(_) => "MultiPolygon",
    Value::GeometryCollection(_) => "GeometryCollection",
  }
}

impl GeoJsonSource {
  /// Only invalid JSON is an error. Unknown roots, missing or malformed
  /// geometries are kept in the document and left out of the collection.
  pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<GeoJsonSource> {
    let path = path.into();
    let document: JsonValue = match serde_json::from_str(text) {
      Ok(document) => document,
      Err(source) => return Err(Error::InvalidJson { path, source }),
    };
    let mut invalid_geometries = 0;
    let collection = lenient_collection(&document, &mut invalid_geometries);
    Ok(GeoJsonSource {
      path,
      document,
      collection,
      invalid_geometries,
    })
  }

  pub fn load(path: &Path) -> Result<GeoJsonSource> {
    if !path.exists() {
      return Err(Error::MissingInput(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = text.len(), "read GeoJSON input");
    GeoJsonSource::parse(path, &text)
  }

  pub fn feature_count(&self) -> usize {
    self.collection.features.len()
  }

  /// Feature counts keyed by geometry type, "None" for missing or malformed.
  pub fn summary(&self) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for feature in &self.collection.features {
      let kind = match &feature.geometry {
        Some(geometry) => geometry_kind(&geometry.value),
        None => "None",
      };
      *counts.entry(kind).or_insert(0) += 1;
    }
    counts
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(&self.document)?)
  }

  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .and_then(|name| name.to_str())
      .filter(|name| !name.is_empty())
      .unwrap_or("data.geojson")
      .to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const COLLECTION: &str = r#"{
    "type": "FeatureCollection",
    "features": [
      {"type": "Feature", "properties": {"name": "a"}, "geometry": {"type": "Point", "coordinates": [79.86, 6.93]}},
      {"type": "Feature", "properties": {"name": "b"}, "geometry": {"type": "Point", "coordinates": [80.0, 7.0]}},
      {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[80.0, 7.0], [80.1, 7.0], [80.1, 7.1], [80.0, 7.0]]]}},
      {"type": "Feature", "properties": {}, "geometry": null}
    ]
  }"#;

  fn one_feature(geometry: &str) -> String {
    format!(
      r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature", "properties": {{"name": "x"}}{}}}]}}"#,
      geometry
    )
  }

  #[test]
  fn test_parse_feature_collection() {
    let source = GeoJsonSource::parse("kelani.geojson", COLLECTION).unwrap();
    assert_eq!(source.feature_count(), 4);
    assert_eq!(source.invalid_geometries, 0);
    let summary = source.summary();
    assert_eq!(summary.get("Point"), Some(&2));
    assert_eq!(summary.get("Polygon"), Some(&1));
    assert_eq!(summary.get("None"), Some(&1));
    assert_eq!(source.file_name(), "kelani.geojson");
    assert_eq!(
      source.collection.features[0].properties.as_ref().unwrap()["name"],
      "a"
    );
  }

  #[test]
  fn test_wraps_single_feature_and_geometry() {
    let feature = GeoJsonSource::parse(
      "f.json",
      r#"{"type": "Feature", "properties": null, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}"#,
    )
    .unwrap();
    assert_eq!(feature.feature_count(), 1);
    assert_eq!(feature.summary().get("Point"), Some(&1));

    let geometry = GeoJsonSource::parse(
      "g.json",
      r#"{"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}"#,
    )
    .unwrap();
    assert_eq!(geometry.feature_count(), 1);
    assert_eq!(geometry.summary().get("LineString"), Some(&1));
  }

  #[test]
  fn test_malformed_geometries_are_kept_out_of_collection() {
    for geometry in [
      "",
      r#", "geometry": {"type": "Point", "coordinates": []}"#,
      r#", "geometry": {"type": "Point", "coordinates": ["a", "b"]}"#,
      r#", "geometry": {"type": "Circle", "coordinates": [1.0, 2.0]}"#,
      r#", "geometry": {"type": "Polygon"}"#,
      r#", "geometry": 42"#,
    ] {
      let source = GeoJsonSource::parse("x.geojson", &one_feature(geometry)).unwrap();
      assert_eq!(source.feature_count(), 1, "{}", geometry);
      assert!(source.collection.features[0].geometry.is_none(), "{}", geometry);
    }

    let source = GeoJsonSource::parse(
      "x.geojson",
      &one_feature(r#", "geometry": {"type": "Circle", "coordinates": [1.0, 2.0]}"#),
    )
    .unwrap();
    assert_eq!(source.invalid_geometries, 1);
  }

  #[test]
  fn test_unknown_root_gives_empty_collection() {
    for text in [r#"{"type": "Nope"}"#, "[1, 2]", r#""text""#] {
      let source = GeoJsonSource::parse("x.geojson", text).unwrap();
      assert_eq!(source.feature_count(), 0);
    }
  }

  #[test]
  fn test_to_json_keeps_document() {
    let text = one_feature(r#", "geometry": {"type": "Circle", "coordinates": [1.0, 2.0]}"#);
    let source = GeoJsonSource::parse("x.geojson", &text).unwrap();
    let value: serde_json::Value = serde_json::from_str(&source.to_json().unwrap()).unwrap();
    assert_eq!(value["features"][0]["geometry"]["type"], "Circle");
    assert_eq!(value["features"][0]["properties"]["name"], "x");
  }

  #[test]
  fn test_invalid_json() {
    let err = GeoJsonSource::parse("bad.geojson", "not json").unwrap_err();
    assert!(matches!(err, Error::InvalidJson { .. }));
  }

  #[test]
  fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = GeoJsonSource::load(&dir.path().join("missing.geojson")).unwrap_err();
    assert!(matches!(err, Error::MissingInput(_)));
  }

  #[test]
  fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kelani.geojson");
    std::fs::write(&path, COLLECTION).unwrap();
    let source = GeoJsonSource::load(&path).unwrap();
    assert_eq!(source.path, path);
    assert_eq!(source.feature_count(), 4);
  }
}
