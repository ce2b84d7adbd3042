//! In-memory scripted engine for development and testing.
//!
//! Layers are registered up front with their classification, spatial
//! reference, and an optional injected failure, so every degraded path the
//! orchestration core handles can be exercised without a real engine. Clip
//! and export operations write small placeholder files to the destination
//! so staging and archiving run against real filesystem state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use geo::Polygon;
use serde::{Deserialize, Serialize};

use clipship_core::error::EngineError;
use clipship_core::models::{
    base_name, BoundingBox, ContainerKind, LayerDescriptor, LayerKind, RasterStorageOptions,
};
use clipship_core::ports::GeoEngine;

use crate::manifest::EngineManifest;

/// Failure injected into a scripted layer to exercise a degraded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// The clip step itself fails
    ClipFailed,
    /// Raster output format rejects the source pixel type / bands / colormap
    UnsupportedRasterFormat,
    /// Raster output extension is invalid for the format
    InvalidExtension,
    /// The second export pass fails
    ExportFailed,
}

#[derive(Debug, Clone)]
struct ScriptedLayer {
    kind: LayerKind,
    spatial_reference: Option<String>,
    failure: Option<FailureMode>,
}

/// Scripted `GeoEngine` adapter holding all state in memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    layers: HashMap<String, ScriptedLayer>,
    known_systems: Vec<String>,
    output_coordinate_system: Option<String>,
    interop_available: bool,
    operations: Vec<String>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self { interop_available: true, ..Self::default() }
    }

    /// Build an engine from a TOML layer manifest.
    pub fn from_manifest(manifest: &EngineManifest) -> Self {
        let mut engine = Self::new();
        engine.interop_available = manifest.interop;
        for name in &manifest.known_coordinate_systems {
            engine = engine.with_known_system(name.clone());
        }
        for entry in &manifest.layers {
            engine.layers.insert(
                entry.name.clone(),
                ScriptedLayer {
                    kind: entry.parsed_kind(),
                    spatial_reference: entry.spatial_reference.clone(),
                    failure: entry.failure,
                },
            );
        }
        engine
    }

    /// Register a layer.
    pub fn with_layer(
        mut self,
        name: impl Into<String>,
        kind: LayerKind,
        spatial_reference: Option<&str>,
    ) -> Self {
        self.layers.insert(
            name.into(),
            ScriptedLayer {
                kind,
                spatial_reference: spatial_reference.map(str::to_string),
                failure: None,
            },
        );
        self
    }

    /// Inject a failure into a registered layer.
    pub fn with_failure(mut self, name: &str, failure: FailureMode) -> Self {
        if let Some(layer) = self.layers.get_mut(name) {
            layer.failure = Some(failure);
        }
        self
    }

    /// Add a named spatial reference (or code) to the built-in catalog.
    pub fn with_known_system(mut self, name: impl Into<String>) -> Self {
        self.known_systems.push(name.into());
        self
    }

    /// Toggle the interoperability capability.
    pub fn with_interop(mut self, available: bool) -> Self {
        self.interop_available = available;
        self
    }

    /// Journal of clip/export invocations, in order.
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    /// Session output coordinate system, if set.
    pub fn output_coordinate_system(&self) -> Option<&str> {
        self.output_coordinate_system.as_deref()
    }

    fn layer(&self, name: &str) -> Result<&ScriptedLayer, EngineError> {
        self.layers
            .get(name)
            .or_else(|| self.layers.get(base_name(name)))
            .ok_or_else(|| EngineError::MissingDataset { name: name.to_string() })
    }

    fn coordinate_system_known(&self, cs: &str) -> bool {
        if cs.to_ascii_lowercase().ends_with(".prj") {
            return true;
        }
        if self.known_systems.iter().any(|k| k.eq_ignore_ascii_case(cs)) {
            return true;
        }
        // spatial references the engine itself reported are always valid
        self.layers
            .values()
            .any(|l| l.spatial_reference.as_deref().is_some_and(|sr| sr.eq_ignore_ascii_case(cs)))
    }

    fn write_placeholder(output: &Path, content: &str) -> Result<(), EngineError> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::Other(e.to_string()))?;
        }
        fs::write(output, content).map_err(|e| EngineError::Other(e.to_string()))
    }

    fn name_taken(workspace: &Path, candidate: &str) -> bool {
        let Ok(entries) = fs::read_dir(workspace) else {
            return false;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name == candidate
                || file_name.strip_prefix(candidate).is_some_and(|rest| rest.starts_with('.'))
            {
                return true;
            }
        }
        false
    }
}

impl GeoEngine for MemoryEngine {
    fn describe_layer(&self, name: &str) -> Result<LayerDescriptor, EngineError> {
        let layer = self.layer(name)?;
        Ok(LayerDescriptor {
            name: name.to_string(),
            kind: layer.kind.clone(),
            spatial_reference: layer.spatial_reference.clone(),
        })
    }

    fn set_output_coordinate_system(&mut self, cs: Option<&str>) -> Result<(), EngineError> {
        match cs {
            None => {
                self.output_coordinate_system = None;
                Ok(())
            }
            Some(cs) if self.coordinate_system_known(cs) => {
                self.output_coordinate_system = Some(cs.to_string());
                Ok(())
            }
            Some(cs) => Err(EngineError::InvalidCoordinateSystem { code: cs.to_string() }),
        }
    }

    fn list_spatial_references(&self, name: &str) -> Vec<String> {
        let needle = name.to_ascii_lowercase();
        self.known_systems
            .iter()
            .filter(|k| k.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    fn create_unique_name(&self, base: &str, workspace: &Path) -> String {
        if !Self::name_taken(workspace, base) {
            return base.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}_{counter}");
            if !Self::name_taken(workspace, &candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn validate_table_name(&self, name: &str, _workspace: &Path) -> String {
        let mut validated: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if validated.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            validated.insert(0, '_');
        }
        validated
    }

    fn ensure_container(
        &mut self,
        folder: &Path,
        kind: ContainerKind,
    ) -> Result<PathBuf, EngineError> {
        let container = match kind {
            ContainerKind::FileGdb => folder.join("data.gdb"),
            ContainerKind::PersonalGdb => folder.join("data.mdb"),
            ContainerKind::Folder => return Ok(folder.to_path_buf()),
        };
        fs::create_dir_all(&container).map_err(|e| EngineError::Other(e.to_string()))?;
        Ok(container)
    }

    fn clip_raster(
        &mut self,
        layer: &str,
        extent: &BoundingBox,
        output: &Path,
        options: &RasterStorageOptions,
    ) -> Result<(), EngineError> {
        let scripted = self.layer(layer)?.clone();
        self.operations.push(format!("clip_raster({layer}, {})", extent.to_extent_string()));
        match scripted.failure {
            Some(FailureMode::ClipFailed) => {
                return Err(EngineError::ClipFailed {
                    layer: layer.to_string(),
                    detail: "ERROR 999999: error executing function".to_string(),
                })
            }
            Some(FailureMode::UnsupportedRasterFormat) => {
                return Err(EngineError::UnsupportedRasterFormat)
            }
            Some(FailureMode::InvalidExtension) => return Err(EngineError::InvalidExtension),
            Some(FailureMode::ExportFailed) | None => {}
        }
        Self::write_placeholder(
            output,
            &format!(
                "raster clip of {layer} extent {} pyramids {} statistics {}\n",
                extent.to_extent_string(),
                options.pyramids,
                options.statistics
            ),
        )
    }

    fn clip_features(
        &mut self,
        layer: &str,
        aoi: &Polygon<f64>,
        output: &Path,
    ) -> Result<(), EngineError> {
        let scripted = self.layer(layer)?.clone();
        self.operations.push(format!("clip_features({layer})"));
        if scripted.failure == Some(FailureMode::ClipFailed) {
            return Err(EngineError::ClipFailed {
                layer: layer.to_string(),
                detail: "ERROR 999999: error executing function".to_string(),
            });
        }
        let vertex_count = aoi.exterior().0.len();
        Self::write_placeholder(
            output,
            &format!("feature clip of {layer} against a {vertex_count}-vertex boundary\n"),
        )
    }

    fn export_cad(
        &mut self,
        input: &Path,
        format_short: &str,
        output: &Path,
    ) -> Result<(), EngineError> {
        self.operations.push(format!("export_cad({format_short})"));
        if !input.exists() {
            return Err(EngineError::MissingDataset { name: input.display().to_string() });
        }
        if self.export_failure_for(input) {
            return Err(EngineError::ExportFailed {
                detail: format!("failed to export to {format_short}"),
            });
        }
        Self::write_placeholder(output, &format!("CAD export ({format_short}) of clipped data\n"))
    }

    fn quick_export(
        &mut self,
        input: &Path,
        format_short: &str,
        output: &Path,
    ) -> Result<(), EngineError> {
        self.operations.push(format!("quick_export({format_short})"));
        if !input.exists() {
            return Err(EngineError::MissingDataset { name: input.display().to_string() });
        }
        if self.export_failure_for(input) {
            return Err(EngineError::ExportFailed {
                detail: "failed to execute quick export".to_string(),
            });
        }
        Self::write_placeholder(output, &format!("quick export ({format_short}) of clipped data\n"))
    }

    fn has_interop_capability(&self) -> bool {
        self.interop_available
    }
}

impl MemoryEngine {
    // Export failures are injected per layer; the intermediate dataset path
    // ends in the validated layer name, so match on that.
    fn export_failure_for(&self, input: &Path) -> bool {
        let Some(stem) = input.file_name().map(|n| n.to_string_lossy().to_string()) else {
            return false;
        };
        self.layers.iter().any(|(name, layer)| {
            layer.failure == Some(FailureMode::ExportFailed)
                && stem.starts_with(&self.validate_table_name(base_name(name), input))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use tempfile::TempDir;

    fn square_aoi() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_describe_layer_falls_back_to_base_name() {
        let engine = MemoryEngine::new().with_layer("roads", LayerKind::Feature, None);
        let descriptor = engine.describe_layer("services\\roads").unwrap();
        assert_eq!(descriptor.kind, LayerKind::Feature);
        assert!(matches!(
            engine.describe_layer("missing"),
            Err(EngineError::MissingDataset { .. })
        ));
    }

    #[test]
    fn test_unknown_coordinate_system_is_rejected() {
        let mut engine = MemoryEngine::new().with_known_system("4326");
        assert!(engine.set_output_coordinate_system(Some("4326")).is_ok());
        assert_eq!(engine.output_coordinate_system(), Some("4326"));
        assert!(matches!(
            engine.set_output_coordinate_system(Some("99999")),
            Err(EngineError::InvalidCoordinateSystem { .. })
        ));
        // rejection leaves the session state unchanged
        assert_eq!(engine.output_coordinate_system(), Some("4326"));
        assert!(engine.set_output_coordinate_system(None).is_ok());
        assert_eq!(engine.output_coordinate_system(), None);
    }

    #[test]
    fn test_layer_spatial_references_are_always_valid() {
        let mut engine =
            MemoryEngine::new().with_layer("roads", LayerKind::Feature, Some("EPSG:32145"));
        assert!(engine.set_output_coordinate_system(Some("EPSG:32145")).is_ok());
    }

    #[test]
    fn test_unique_name_appends_counter_on_collision() {
        let tmp = TempDir::new().unwrap();
        let engine = MemoryEngine::new();
        assert_eq!(engine.create_unique_name("roads", tmp.path()), "roads");

        fs::write(tmp.path().join("roads.shp"), b"x").unwrap();
        assert_eq!(engine.create_unique_name("roads", tmp.path()), "roads_1");

        fs::write(tmp.path().join("roads_1"), b"x").unwrap();
        assert_eq!(engine.create_unique_name("roads", tmp.path()), "roads_2");
    }

    #[test]
    fn test_validate_table_name_sanitizes() {
        let engine = MemoryEngine::new();
        let tmp = std::env::temp_dir();
        assert_eq!(engine.validate_table_name("town lines", &tmp), "town_lines");
        assert_eq!(engine.validate_table_name("a-b.c", &tmp), "a_b_c");
        assert_eq!(engine.validate_table_name("2020census", &tmp), "_2020census");
    }

    #[test]
    fn test_clip_features_writes_placeholder() {
        let tmp = TempDir::new().unwrap();
        let mut engine = MemoryEngine::new().with_layer("roads", LayerKind::Feature, None);
        let out = tmp.path().join("roads");
        engine.clip_features("roads", &square_aoi(), &out).unwrap();
        assert!(out.exists());
        assert_eq!(engine.operations(), ["clip_features(roads)"]);
    }

    #[test]
    fn test_injected_raster_failure() {
        let tmp = TempDir::new().unwrap();
        let mut engine = MemoryEngine::new()
            .with_layer("elevation", LayerKind::Raster, None)
            .with_failure("elevation", FailureMode::UnsupportedRasterFormat);
        let extent = BoundingBox { xmin: 0.0, ymin: 0.0, xmax: 1.0, ymax: 1.0 };
        let result = engine.clip_raster(
            "elevation",
            &extent,
            &tmp.path().join("elevation"),
            &RasterStorageOptions::clip_defaults(),
        );
        assert_eq!(result, Err(EngineError::UnsupportedRasterFormat));
        assert!(!tmp.path().join("elevation").exists());
    }
}
