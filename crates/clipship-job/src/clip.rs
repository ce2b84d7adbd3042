//! Per-layer clip-and-convert dispatch.
//!
//! Rasters and mosaics clip by the AOI extent and convert to the target
//! format in the same step. Features clip by the true AOI geometry; formats
//! the clip cannot produce directly take a second export pass, through the
//! CAD exporter for CAD interchange extensions or the interoperability
//! quick-exporter for everything else. Every failure here is non-fatal:
//! it becomes log entries and a `Failed` outcome, and the job moves on.

use std::path::PathBuf;

use clipship_core::error::EngineError;
use clipship_core::models::{
    AreaOfInterest, FormatSpec, LayerDescriptor, LayerKind, RasterStorageOptions,
};
use clipship_core::ports::GeoEngine;

use crate::log::ProcessingLog;
use crate::paths::PathPlanner;

/// What happened to one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    Extracted { output: PathBuf },
    Skipped { reason: String },
    Failed { reason: String },
}

pub struct LayerClipper<'a> {
    paths: PathPlanner<'a>,
    interop_available: bool,
    log: &'a ProcessingLog,
}

impl<'a> LayerClipper<'a> {
    pub fn new(paths: PathPlanner<'a>, interop_available: bool, log: &'a ProcessingLog) -> Self {
        Self { paths, interop_available, log }
    }

    /// Extent-based clip for raster and mosaic layers, converting to the
    /// target raster format at clip time.
    pub fn clip_raster(
        &self,
        engine: &mut dyn GeoEngine,
        layer: &LayerDescriptor,
        aoi: &AreaOfInterest,
        format: &FormatSpec,
    ) -> LayerOutcome {
        let artifact = match self.paths.plan(engine, true, &layer.name, true, format) {
            Ok(artifact) => artifact,
            Err(err) => return self.staging_failure(&layer.name, err),
        };

        self.log.info(format!("-> Running clip operation on {}....", layer.name));
        if layer.kind == LayerKind::Mosaic {
            self.log.info("-> this is a mosaic layer....");
        } else {
            self.log.info("-> this is a raster layer....");
        }

        let extent = aoi.bounding_box();
        self.log.info(format!(
            "-> running raster clip({}, {}, {})",
            layer.name,
            extent.to_extent_string(),
            artifact.path.display()
        ));

        let options = RasterStorageOptions::clip_defaults();
        match engine.clip_raster(&layer.name, &extent, &artifact.path, &options) {
            Ok(()) => {
                self.log.info(format!("-> clipped {}", layer.name));
                LayerOutcome::Extracted { output: artifact.path }
            }
            Err(err) => {
                self.log.warning(format!("Failed to clip layer {}...", layer.name));
                let reason = raster_remediation(&err);
                self.log.warning(&reason);
                tracing::warn!(layer = %layer.name, %err, "raster clip failed");
                LayerOutcome::Failed { reason }
            }
        }
    }

    /// True-geometry clip for feature layers, with the second conversion
    /// pass for formats the clip cannot produce directly.
    pub fn clip_features(
        &self,
        engine: &mut dyn GeoEngine,
        layer: &LayerDescriptor,
        aoi: &AreaOfInterest,
        format: &FormatSpec,
    ) -> LayerOutcome {
        let convert_during_clip = format.converts_during_clip();
        let artifact =
            match self.paths.plan(engine, false, &layer.name, convert_during_clip, format) {
                Ok(artifact) => artifact,
                Err(err) => return self.staging_failure(&layer.name, err),
            };

        self.log.info(format!("-> Running clip operation on {}....", layer.name));
        self.log.info(format!(
            "-> running feature clip({}, aoi, {})",
            layer.name,
            artifact.path.display()
        ));
        if let Err(err) = engine.clip_features(&layer.name, aoi.polygon(), &artifact.path) {
            return self.feature_failure(&layer.name, err);
        }
        self.log.info(format!("-> Successfully clipped {}", layer.name));

        if convert_during_clip {
            return LayerOutcome::Extracted { output: artifact.path };
        }

        // second pass: move the clipped dataset into staging as the
        // requested format
        let staged = self
            .paths
            .zip_folder()
            .join(format!("{}{}", artifact.name, format.extension_lower()));

        if format.is_cad() {
            self.log.warning(
                "Using export to CAD; capabilities differ from the primary exporter.",
            );
            self.log.info(format!(
                "-> converting to {} using export to CAD...",
                format.short_code
            ));
            match engine.export_cad(&artifact.path, &format.short_code, &staged) {
                Ok(()) => LayerOutcome::Extracted { output: staged },
                Err(err) => self.feature_failure(&layer.name, err),
            }
        } else {
            if !self.interop_available {
                let reason = format!(
                    "Failed to export to {}. The requested format requires the Data \
                     Interoperability capability, which is currently unavailable.",
                    format.short_code
                );
                self.log.warning(&reason);
                tracing::warn!(layer = %layer.name, format = %format.short_code, "interoperability capability missing");
                return LayerOutcome::Failed { reason };
            }
            self.log.info(format!(
                "-> converting to {} using quick export...",
                format.short_code
            ));
            match engine.quick_export(&artifact.path, &format.short_code, &staged) {
                Ok(()) => LayerOutcome::Extracted { output: staged },
                Err(err) => self.feature_failure(&layer.name, err),
            }
        }
    }

    fn staging_failure(&self, layer: &str, err: EngineError) -> LayerOutcome {
        let reason = format!("Failed to stage output for {layer}: {err}");
        self.log.warning(&reason);
        tracing::warn!(layer, %err, "output staging failed");
        LayerOutcome::Failed { reason }
    }

    /// Map a feature clip/export diagnostic to its tailored log entry.
    fn feature_failure(&self, layer: &str, err: EngineError) -> LayerOutcome {
        let reason = match &err {
            EngineError::ExportFailed { .. } => format!(
                "Failed to export layer {layer} with quick export. Verify that the format \
                 specified is valid."
            ),
            EngineError::ClipFailed { .. } => format!("Failed to clip layer {layer}..."),
            other => format!("Failed to clip layer {layer}... {other}"),
        };
        self.log.warning(&reason);
        tracing::warn!(layer, %err, "feature clip failed");
        LayerOutcome::Failed { reason }
    }
}

/// Remediation text for known raster clip failures; unknown diagnostics are
/// reported raw.
fn raster_remediation(err: &EngineError) -> String {
    match err {
        EngineError::UnsupportedRasterFormat => {
            "Output file format with the specified pixel type, number of bands, or colormap \
             is not supported. Refer to the technical specifications for raster dataset formats."
                .to_string()
        }
        EngineError::InvalidExtension => {
            "Extension is invalid for the output raster format. Verify that the format you \
             have specified is valid."
                .to_string()
        }
        other => other.to_string(),
    }
}
