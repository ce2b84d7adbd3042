//! Output coordinate system resolution.
//!
//! Resolution order: the "same as input" sentinel, then a direct
//! spatial-reference code, then a `.prj` definition file in the custom
//! folder, then the engine's built-in catalog. Anything unresolvable
//! degrades to "same as input" with a logged warning; this module never
//! fails the job.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use clipship_core::ports::GeoEngine;

use crate::log::ProcessingLog;

/// Where the session's output coordinate system came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCoordSys {
    /// Use each input layer's native spatial reference at clip time.
    SameAsInput,
    /// Direct spatial-reference code accepted by the engine.
    Code(String),
    /// Definition file found in the custom search folder.
    PrjFile(PathBuf),
    /// Entry from the engine's built-in catalog.
    Named(String),
}

impl ResolvedCoordSys {
    pub fn is_same_as_input(&self) -> bool {
        matches!(self, ResolvedCoordSys::SameAsInput)
    }
}

impl fmt::Display for ResolvedCoordSys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedCoordSys::SameAsInput => write!(f, "same as input"),
            ResolvedCoordSys::Code(code) => write!(f, "{code}"),
            ResolvedCoordSys::PrjFile(path) => write!(f, "{}", path.display()),
            ResolvedCoordSys::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Resolve the requested output coordinate system and set it into the
/// engine session so data gets projected when the clips run.
pub fn resolve(
    engine: &mut dyn GeoEngine,
    requested: &str,
    custom_folder: Option<&Path>,
    log: &ProcessingLog,
) -> ResolvedCoordSys {
    let requested = requested.trim();
    if requested.is_empty() || requested.eq_ignore_ascii_case("same as input") {
        return ResolvedCoordSys::SameAsInput;
    }

    // an alphanumeric request with no custom folder is a direct code
    if custom_folder.is_none() && requested.chars().all(|c| c.is_ascii_alphanumeric()) {
        match engine.set_output_coordinate_system(Some(requested)) {
            Ok(()) => return ResolvedCoordSys::Code(requested.to_string()),
            Err(err) => {
                tracing::warn!(code = requested, %err, "direct coordinate system code rejected");
                log.warning(format!(
                    "Coordinate system WKID {requested} is not valid. Output coordinate system \
                     will be the same as the input layer's coordinate system."
                ));
                let _ = engine.set_output_coordinate_system(None);
                return ResolvedCoordSys::SameAsInput;
            }
        }
    }

    // custom folder takes priority over the built-in catalog
    if let Some(folder) = custom_folder {
        if let Some(prj) = find_prj_file(requested, folder) {
            let prj_str = prj.to_string_lossy().to_string();
            if engine.set_output_coordinate_system(Some(&prj_str)).is_ok() {
                return ResolvedCoordSys::PrjFile(prj);
            }
        }
    }

    if let Some(entry) = engine.list_spatial_references(requested).into_iter().next() {
        if engine.set_output_coordinate_system(Some(&entry)).is_ok() {
            return ResolvedCoordSys::Named(entry);
        }
    }

    log.warning(format!(
        "Could not find the specified projection file {requested}. Output coordinate system \
         will be the same as the input layer's coordinate system."
    ));
    ResolvedCoordSys::SameAsInput
}

/// Recursive walk of `dir` for `<system>.prj`; first hit wins.
fn find_prj_file(system: &str, dir: &Path) -> Option<PathBuf> {
    let wanted = format!("{system}.prj");
    if !dir.exists() {
        return None;
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_file() && entry.file_name().to_string_lossy() == wanted.as_str()
        })
        .map(|entry| entry.into_path())
}
