//! Top-level job sequencing.
//!
//! One run: provision staging folders, initialize the processing log,
//! resolve the AOI extent and area (the one fatal precondition), walk the
//! layer list in order through admission control and the clipper, then
//! archive whatever succeeded. Per-layer failures never abort the run.

use std::fs;
use std::path::{Path, PathBuf};

use clipship_core::error::Result;
use clipship_core::models::{strip_stray_quotes, AreaOfInterest, FormatSpec};
use clipship_core::ports::{GeoEngine, MaxAreaStore};

use crate::admission::{AdmissionControl, AdmissionDecision};
use crate::archive;
use crate::clip::LayerClipper;
use crate::coordsys;
use crate::log::{ProcessingLog, LOG_FILE_NAME};
use crate::paths::PathPlanner;

pub use crate::clip::LayerOutcome;

/// Everything a single extraction run needs.
#[derive(Debug, Clone)]
pub struct ExtractJob {
    /// Layer identifiers in processing order.
    pub layers: Vec<String>,
    pub aoi: AreaOfInterest,
    pub feature_format: FormatSpec,
    pub raster_format: FormatSpec,
    /// Requested output coordinate system; empty means "same as input".
    pub coordinate_system: String,
    /// Folder searched for custom coordinate-system definition files.
    pub custom_cs_folder: Option<PathBuf>,
    /// Path of the delivery archive to create.
    pub output_zip: PathBuf,
    /// Root under which the staging and scratch folders are provisioned.
    pub scratch_root: PathBuf,
    /// Threshold used when a layer has no policy entry.
    pub default_max_area: f64,
}

/// One layer's report in the job summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReport {
    pub layer: String,
    pub outcome: LayerOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub reports: Vec<LayerReport>,
    pub archive: PathBuf,
    pub log_path: PathBuf,
}

impl JobOutcome {
    pub fn extracted_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, LayerOutcome::Extracted { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports.iter().filter(|r| matches!(r.outcome, LayerOutcome::Skipped { .. })).count()
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| matches!(r.outcome, LayerOutcome::Failed { .. })).count()
    }
}

/// Run the whole batch.
///
/// The archive is always attempted, even when every layer failed; it then
/// contains only the processing log. Orchestration-level errors (AOI
/// description, staging setup, archive write) are logged with their full
/// diagnostic and propagated; they are the only fatal paths.
pub fn run(
    job: &ExtractJob,
    engine: &mut dyn GeoEngine,
    policies: &dyn MaxAreaStore,
) -> Result<JobOutcome> {
    let zip_folder = provision_staging_folder(&job.scratch_root, "zipfolder")?;
    let scratch_folder = provision_staging_folder(&job.scratch_root, "scratchfolder")?;
    let log = ProcessingLog::init(zip_folder.join(LOG_FILE_NAME));

    let reports = match run_layers(job, engine, policies, &zip_folder, &scratch_folder, &log) {
        Ok(reports) => reports,
        Err(err) => {
            log.error(format!("Failure in clip and convert: {err}"));
            tracing::error!(%err, "extraction job failed");
            return Err(err);
        }
    };

    let archive = match archive::archive_staging(&zip_folder, &job.output_zip, &log) {
        Ok(archive) => archive,
        Err(err) => {
            log.error(format!("Failed to create the delivery archive: {err}"));
            tracing::error!(%err, "archive creation failed");
            return Err(err);
        }
    };

    log.finish();
    tracing::info!(archive = %archive.display(), "data extract processing complete");
    Ok(JobOutcome { reports, archive, log_path: log.path().to_path_buf() })
}

fn run_layers(
    job: &ExtractJob,
    engine: &mut dyn GeoEngine,
    policies: &dyn MaxAreaStore,
    zip_folder: &Path,
    scratch_folder: &Path,
    log: &ProcessingLog,
) -> Result<Vec<LayerReport>> {
    log.section("--> Evaluating AOI extent...");
    let extent = job.aoi.bounding_box();
    log.info(format!("-> AOI xmin/ymin/xmax/ymax = {}", extent.to_extent_string()));
    log.info(format!("-> AOI area to extract = {} sq meters", job.aoi.area()));

    let resolved = coordsys::resolve(
        engine,
        &job.coordinate_system,
        job.custom_cs_folder.as_deref(),
        log,
    );
    tracing::info!(coordinate_system = %resolved, "output coordinate system resolved");

    let admission = AdmissionControl::new(policies, job.default_max_area);
    let clipper = LayerClipper::new(
        PathPlanner::new(zip_folder, scratch_folder),
        engine.has_interop_capability(),
        log,
    );

    let mut reports = Vec::new();
    for raw_name in &job.layers {
        let layer_name = strip_stray_quotes(raw_name);
        log.section(format!("--> Processing {layer_name}"));
        tracing::info!(layer = %layer_name, "processing layer");

        let descriptor = engine.describe_layer(&layer_name)?;
        let decision = admission.decide(&layer_name, job.aoi.area(), log);

        if !descriptor.kind.is_supported() {
            let reason = format!(
                "Cannot clip layer {layer_name}. This tool does not clip layers of type \
                 {}...",
                descriptor.kind.type_name()
            );
            log.warning(&reason);
            tracing::warn!(layer = %layer_name, kind = descriptor.kind.type_name(), "unsupported data type");
            reports.push(LayerReport { layer: layer_name, outcome: LayerOutcome::Skipped { reason } });
            continue;
        }

        // failsafe: with no explicit output coordinate system, pin the
        // session to the layer's own spatial reference before clipping
        if resolved.is_same_as_input() {
            if let Some(sr) = &descriptor.spatial_reference {
                if let Err(err) = engine.set_output_coordinate_system(Some(sr)) {
                    tracing::debug!(layer = %layer_name, %err, "could not pin layer spatial reference");
                }
            }
        }

        let outcome = match decision {
            AdmissionDecision::Rejected { max_area } => {
                let reason = format!(
                    "==> WARNING: AOI area ({}) exceeds the maximum area to extract \
                     ({max_area} sq meters). {layer_name} WILL BE SKIPPED!",
                    job.aoi.area()
                );
                log.warning(&reason);
                tracing::warn!(layer = %layer_name, max_area, "layer rejected by admission control");
                LayerOutcome::Skipped { reason }
            }
            AdmissionDecision::Accepted { .. } => {
                if descriptor.kind.is_raster() {
                    clipper.clip_raster(engine, &descriptor, &job.aoi, &job.raster_format)
                } else {
                    clipper.clip_features(engine, &descriptor, &job.aoi, &job.feature_format)
                }
            }
        };
        reports.push(LayerReport { layer: layer_name, outcome });
    }

    Ok(reports)
}

/// Provision a uniquely named folder under the scratch root.
fn provision_staging_folder(root: &Path, base: &str) -> Result<PathBuf> {
    let stage = |source| clipship_core::ClipshipError::StagingUnavailable {
        path: root.to_path_buf(),
        source,
    };
    fs::create_dir_all(root).map_err(stage)?;

    let mut candidate = root.join(base);
    let mut counter = 1;
    while candidate.exists() {
        candidate = root.join(format!("{base}_{counter}"));
        counter += 1;
    }
    fs::create_dir(&candidate).map_err(stage)?;
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_folders_get_unique_names() {
        let tmp = TempDir::new().unwrap();
        let first = provision_staging_folder(tmp.path(), "zipfolder").unwrap();
        let second = provision_staging_folder(tmp.path(), "zipfolder").unwrap();
        assert_eq!(first, tmp.path().join("zipfolder"));
        assert_eq!(second, tmp.path().join("zipfolder_1"));
        assert!(first.is_dir());
        assert!(second.is_dir());
    }
}
