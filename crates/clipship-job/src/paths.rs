//! Output path planning.
//!
//! Computes a validated, collision-free output name and path for a layer
//! and target format: picks the destination workspace, legalizes the name
//! for the target format, and places the file extension where the format
//! expects it. Uniqueness comes from the engine, so no retry loop is
//! needed here; planning is deterministic for identical filesystem state.

use std::path::Path;

use clipship_core::error::EngineError;
use clipship_core::models::{base_name, ContainerKind, FormatSpec, OutputArtifact};
use clipship_core::ports::GeoEngine;

pub struct PathPlanner<'a> {
    zip_folder: &'a Path,
    scratch_folder: &'a Path,
}

impl<'a> PathPlanner<'a> {
    pub fn new(zip_folder: &'a Path, scratch_folder: &'a Path) -> Self {
        Self { zip_folder, scratch_folder }
    }

    pub fn zip_folder(&self) -> &Path {
        self.zip_folder
    }

    /// Plan the output artifact for one layer.
    ///
    /// Conversion at clip time goes straight into the staging folder;
    /// otherwise the clip lands in a scratch file geodatabase and a second
    /// export pass moves it into staging.
    pub fn plan(
        &self,
        engine: &mut dyn GeoEngine,
        is_raster: bool,
        layer_name: &str,
        convert_during_clip: bool,
        format: &FormatSpec,
    ) -> Result<OutputArtifact, EngineError> {
        let workspace = if convert_during_clip {
            engine.ensure_container(self.zip_folder, format.container_kind())?
        } else {
            engine.ensure_container(self.scratch_folder, ContainerKind::FileGdb)?
        };

        let mut name = base_name(layer_name).to_string();

        // legacy grid rasters: at most 12 characters and no spaces
        if format.is_grid() {
            name = name.chars().take(12).collect();
            name = name.replace(' ', "_");
        }

        let unique = engine.create_unique_name(&name, &workspace);
        let mut validated = engine.validate_table_name(&unique, &workspace);

        if format.appends_extension(is_raster) {
            validated.push_str(&format.extension_lower());
        }

        let path = workspace.join(&validated);
        Ok(OutputArtifact { name: validated, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipship_engine::MemoryEngine;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        zip_folder: std::path::PathBuf,
        scratch_folder: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let zip_folder = tmp.path().join("zipfolder");
        let scratch_folder = tmp.path().join("scratchfolder");
        std::fs::create_dir_all(&zip_folder).unwrap();
        std::fs::create_dir_all(&scratch_folder).unwrap();
        Fixture { _tmp: tmp, zip_folder, scratch_folder }
    }

    #[test]
    fn test_direct_conversion_targets_staging_container() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        let artifact = planner
            .plan(&mut engine, false, "roads", true, &FormatSpec::file_geodatabase())
            .unwrap();
        assert_eq!(artifact.name, "roads");
        assert_eq!(artifact.path, fx.zip_folder.join("data.gdb").join("roads"));
        assert!(fx.zip_folder.join("data.gdb").is_dir());
    }

    #[test]
    fn test_second_pass_formats_stage_in_scratch_gdb() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        let dxf = FormatSpec::new("AutoCAD DXF", "DXF", ".dxf");
        let artifact = planner.plan(&mut engine, false, "roads", false, &dxf).unwrap();
        // intermediate output goes to the scratch geodatabase, no extension
        assert_eq!(artifact.path, fx.scratch_folder.join("data.gdb").join("roads"));
    }

    #[test]
    fn test_grid_names_are_truncated_and_despaced() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        let artifact = planner
            .plan(&mut engine, true, "hillshade model 2020", true, &FormatSpec::esri_grid())
            .unwrap();
        // 12 chars max, spaces replaced, no extension for grid
        assert_eq!(artifact.name, "hillshade_mo");
        assert_eq!(artifact.path, fx.zip_folder.join("hillshade_mo"));
    }

    #[test]
    fn test_raster_formats_carry_extension() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        let img = FormatSpec::new("Erdas Imagine", "IMG", ".IMG");
        let artifact = planner.plan(&mut engine, true, "elevation", true, &img).unwrap();
        assert_eq!(artifact.name, "elevation.img");
    }

    #[test]
    fn test_shapefile_carries_extension_in_plain_folder() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        let shp = FormatSpec::new("Shapefile", "SHP", ".shp");
        let artifact = planner.plan(&mut engine, false, "data/roads", true, &shp).unwrap();
        assert_eq!(artifact.name, "roads.shp");
        assert_eq!(artifact.path, fx.zip_folder.join("roads.shp"));
    }

    #[test]
    fn test_existing_output_gets_unique_name() {
        let fx = fixture();
        let mut engine = MemoryEngine::new();
        let planner = PathPlanner::new(&fx.zip_folder, &fx.scratch_folder);

        std::fs::write(fx.zip_folder.join("roads.shp"), b"x").unwrap();
        let shp = FormatSpec::new("Shapefile", "SHP", ".shp");
        let artifact = planner.plan(&mut engine, false, "roads", true, &shp).unwrap();
        assert_eq!(artifact.name, "roads_1.shp");
    }
}
