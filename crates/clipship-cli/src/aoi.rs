//! Area-of-interest loading from GeoJSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo::{LineString, Polygon};
use geojson::{GeoJson, Value};

use clipship_core::models::AreaOfInterest;

/// Read the AOI polygon from a GeoJSON file. The first polygon geometry in
/// the file wins; a MultiPolygon contributes its first part.
pub fn load_aoi(path: &Path) -> Result<AreaOfInterest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read AOI file: {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse AOI GeoJSON: {}", path.display()))?;
    let polygon = first_polygon(&geojson)
        .with_context(|| format!("No polygon geometry in AOI file: {}", path.display()))?;
    Ok(AreaOfInterest::from_polygon(polygon)?)
}

fn first_polygon(geojson: &GeoJson) -> Option<Polygon<f64>> {
    match geojson {
        GeoJson::Geometry(geometry) => polygon_from_value(&geometry.value),
        GeoJson::Feature(feature) => {
            feature.geometry.as_ref().and_then(|g| polygon_from_value(&g.value))
        }
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .find_map(|f| f.geometry.as_ref().and_then(|g| polygon_from_value(&g.value))),
    }
}

fn polygon_from_value(value: &Value) -> Option<Polygon<f64>> {
    match value {
        Value::Polygon(rings) => Some(polygon_from_rings(rings)),
        Value::MultiPolygon(polygons) => polygons.first().map(|rings| polygon_from_rings(rings)),
        _ => None,
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let to_line_string = |ring: &Vec<Vec<f64>>| -> LineString<f64> {
        ring.iter().filter(|pos| pos.len() >= 2).map(|pos| (pos[0], pos[1])).collect()
    };
    let exterior = rings.first().map(to_line_string).unwrap_or_else(|| LineString::new(vec![]));
    let interiors = rings.iter().skip(1).map(to_line_string).collect();
    Polygon::new(exterior, interiors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_aoi(tmp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = tmp.path().join("aoi.geojson");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_polygon_feature() {
        let tmp = TempDir::new().unwrap();
        let path = write_aoi(
            &tmp,
            r#"{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0], [0.0, 0.0]]]
                },
                "properties": {}
            }"#,
        );
        let aoi = load_aoi(&path).unwrap();
        assert_eq!(aoi.area(), 50.0);
    }

    #[test]
    fn test_load_first_polygon_from_collection() {
        let tmp = TempDir::new().unwrap();
        let path = write_aoi(
            &tmp,
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}, "properties": {}},
                    {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]]}, "properties": {}}
                ]
            }"#,
        );
        let aoi = load_aoi(&path).unwrap();
        assert_eq!(aoi.area(), 4.0);
    }

    #[test]
    fn test_file_without_polygon_errors() {
        let tmp = TempDir::new().unwrap();
        let path = write_aoi(
            &tmp,
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}, "properties": {}}"#,
        );
        assert!(load_aoi(&path).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(load_aoi(Path::new("/nonexistent/aoi.geojson")).is_err());
    }
}
