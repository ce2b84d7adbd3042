//! Output artifact and raster storage settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A validated name and output path produced by the path planner for one
/// layer and format combination. The name satisfies the target format's
/// naming constraints and the path is collision-free within its workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub name: String,
    pub path: PathBuf,
}

/// Raster storage environment settings applied before a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterStorageOptions {
    pub pyramids: bool,
    pub statistics: bool,
}

impl RasterStorageOptions {
    /// Settings for clip outputs: no pyramids, no statistics. Downstream
    /// consumers do not need them and they inflate output size.
    pub fn clip_defaults() -> Self {
        Self { pyramids: false, statistics: false }
    }
}

impl Default for RasterStorageOptions {
    fn default() -> Self {
        Self::clip_defaults()
    }
}
