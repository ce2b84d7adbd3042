pub mod aoi;
pub mod format;
pub mod layer;
pub mod output;

pub use aoi::{AreaOfInterest, BoundingBox};
pub use format::{ContainerKind, FormatSpec};
pub use layer::{base_name, strip_stray_quotes, LayerDescriptor, LayerKind};
pub use output::{OutputArtifact, RasterStorageOptions};

/// Default maximum extractable area in square meters when no per-layer
/// policy entry exists: effectively "allow everything up to continental
/// scale".
pub const DEFAULT_MAX_AREA: f64 = 400_000_000_000.0;
