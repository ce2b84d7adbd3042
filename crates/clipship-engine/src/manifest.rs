//! TOML layer manifest for the in-memory engine.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use clipship_core::error::{ClipshipError, Result};
use clipship_core::models::LayerKind;

use crate::memory::FailureMode;

/// Declarative description of an in-memory engine session.
///
/// ```toml
/// interop = true
/// known_coordinate_systems = ["4326", "NAD 1983 StatePlane Vermont"]
///
/// [[layers]]
/// name = "roads"
/// kind = "feature"
/// spatial_reference = "EPSG:32145"
///
/// [[layers]]
/// name = "elevation"
/// kind = "raster"
/// failure = "unsupported_raster_format"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EngineManifest {
    #[serde(default = "default_interop")]
    pub interop: bool,

    #[serde(default)]
    pub known_coordinate_systems: Vec<String>,

    #[serde(default)]
    pub layers: Vec<LayerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerEntry {
    pub name: String,

    /// "feature", "raster", or "mosaic"; anything else is an unsupported
    /// data type the job will reject.
    pub kind: String,

    #[serde(default)]
    pub spatial_reference: Option<String>,

    #[serde(default)]
    pub failure: Option<FailureMode>,
}

impl LayerEntry {
    pub fn parsed_kind(&self) -> LayerKind {
        match self.kind.to_ascii_lowercase().as_str() {
            "feature" | "featurelayer" => LayerKind::Feature,
            "raster" | "rasterlayer" => LayerKind::Raster,
            "mosaic" | "mosaiclayer" => LayerKind::Mosaic,
            other => LayerKind::Other(other.to_string()),
        }
    }
}

fn default_interop() -> bool {
    true
}

impl EngineManifest {
    /// Parse a manifest file. Read and parse failures are configuration
    /// errors; there is no degraded fallback for a bad manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ClipshipError::ConfigInvalid {
            key: "manifest".to_string(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| ClipshipError::ConfigInvalid {
            key: "manifest".to_string(),
            reason: format!("failed to parse {}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parses_layers_and_failures() {
        let manifest: EngineManifest = toml::from_str(
            r#"
            interop = false
            known_coordinate_systems = ["4326"]

            [[layers]]
            name = "roads"
            kind = "feature"
            spatial_reference = "EPSG:32145"

            [[layers]]
            name = "elevation"
            kind = "raster"
            failure = "clip_failed"

            [[layers]]
            name = "contours"
            kind = "tin"
            "#,
        )
        .unwrap();

        assert!(!manifest.interop);
        assert_eq!(manifest.layers.len(), 3);
        assert_eq!(manifest.layers[0].parsed_kind(), LayerKind::Feature);
        assert_eq!(manifest.layers[1].failure, Some(FailureMode::ClipFailed));
        assert_eq!(manifest.layers[2].parsed_kind(), LayerKind::Other("tin".to_string()));
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest: EngineManifest = toml::from_str("").unwrap();
        assert!(manifest.interop);
        assert!(manifest.layers.is_empty());
    }
}
