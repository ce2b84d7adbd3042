//! Error types for ClipShip

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipshipError {
    // Job preconditions
    #[error("Area of interest cannot be described: {reason}")]
    AoiUndescribable { reason: String },

    // Format descriptor errors
    #[error("Invalid format descriptor {input:?}: {reason}")]
    InvalidFormat { input: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Staging and delivery errors
    #[error("Staging folder could not be provisioned under {path}")]
    StagingUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive could not be written to {path}: {reason}")]
    ArchiveFailed { path: PathBuf, reason: String },

    // Engine errors that escape the per-layer boundary
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClipshipError>;

/// Structured diagnostics returned by the geoprocessing engine.
///
/// Known failure signatures are distinct variants so callers can map each
/// one to a specific remediation message with an exhaustive match;
/// everything else falls through as `Other` with the raw diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Output format does not support the source pixel type, number of bands, or colormap")]
    UnsupportedRasterFormat,

    #[error("Extension is invalid for the output raster format")]
    InvalidExtension,

    #[error("Failed to clip {layer}: {detail}")]
    ClipFailed { layer: String, detail: String },

    #[error("Export step failed: {detail}")]
    ExportFailed { detail: String },

    #[error("Dataset not found: {name}")]
    MissingDataset { name: String },

    #[error("Coordinate system {code:?} is not valid")]
    InvalidCoordinateSystem { code: String },

    #[error("{0}")]
    Other(String),
}

/// Failure to consult the maximum-area policy table at all.
///
/// A missing per-layer entry is not an error; this only covers the table
/// itself being unreachable, which callers degrade to the global default.
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("Maximum-area policy table unavailable: {reason}")]
    Unavailable { reason: String },
}
