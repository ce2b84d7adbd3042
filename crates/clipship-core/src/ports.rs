//! Port trait definitions for the external collaborators.
//!
//! These traits define the interfaces that adapters must implement. The
//! orchestration core only ever talks to the geoprocessing engine and the
//! policy table through them.

use std::path::{Path, PathBuf};

use geo::Polygon;

use crate::error::{EngineError, PolicyError};
use crate::models::{BoundingBox, ContainerKind, LayerDescriptor, RasterStorageOptions};

/// Session handle onto the geoprocessing engine.
///
/// The engine keeps mutable per-session environment state (the output
/// coordinate system, raster storage options), so operations that read or
/// write that state take `&mut self`. One session drives exactly one job;
/// operations must not be interleaved across threads.
pub trait GeoEngine {
    /// Fetch a layer's data-type classification and spatial reference.
    fn describe_layer(&self, name: &str) -> Result<LayerDescriptor, EngineError>;

    /// Set (`Some`) or clear (`None`) the session's output coordinate
    /// system. An unknown code or path is rejected with
    /// `InvalidCoordinateSystem`; the session state is left unchanged.
    fn set_output_coordinate_system(&mut self, cs: Option<&str>) -> Result<(), EngineError>;

    /// Look up a named spatial reference in the engine's built-in catalog.
    /// Returns matching catalog entries, best match first.
    fn list_spatial_references(&self, name: &str) -> Vec<String>;

    /// Produce a collision-free name for `base` within `workspace`.
    fn create_unique_name(&self, base: &str, workspace: &Path) -> String;

    /// Sanitize `name` against the workspace's table-naming rules.
    fn validate_table_name(&self, name: &str, workspace: &Path) -> String;

    /// Provision the destination container inside `folder` when the target
    /// format requires one; plain folders pass through unchanged. Returns
    /// the workspace path outputs are written into.
    fn ensure_container(&mut self, folder: &Path, kind: ContainerKind)
        -> Result<PathBuf, EngineError>;

    /// Extent-based raster clip, converting to the output format implied by
    /// the output path. The same call serves standalone rasters and mosaic
    /// layers.
    fn clip_raster(
        &mut self,
        layer: &str,
        extent: &BoundingBox,
        output: &Path,
        options: &RasterStorageOptions,
    ) -> Result<(), EngineError>;

    /// True-geometry feature clip against the AOI polygon.
    fn clip_features(
        &mut self,
        layer: &str,
        aoi: &Polygon<f64>,
        output: &Path,
    ) -> Result<(), EngineError>;

    /// CAD interchange export of a previously clipped dataset.
    fn export_cad(
        &mut self,
        input: &Path,
        format_short: &str,
        output: &Path,
    ) -> Result<(), EngineError>;

    /// Interoperability quick-export of a previously clipped dataset to a
    /// non-native format. Requires the interoperability capability.
    fn quick_export(
        &mut self,
        input: &Path,
        format_short: &str,
        output: &Path,
    ) -> Result<(), EngineError>;

    /// Whether the licensed data-interoperability capability is available
    /// in this session.
    fn has_interop_capability(&self) -> bool;
}

/// Keyed read onto the per-layer maximum extractable area table.
pub trait MaxAreaStore {
    /// Maximum extractable area for a layer, looked up by base name.
    /// `Ok(None)` means the layer has no entry (callers use the global
    /// default); `Err` means the table itself is unreachable (callers log
    /// an error and use the global default).
    fn max_area_for(&self, layer_base_name: &str) -> Result<Option<f64>, PolicyError>;
}
