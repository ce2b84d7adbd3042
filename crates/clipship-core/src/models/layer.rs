//! Layer metadata and name handling.

use serde::{Deserialize, Serialize};

/// Engine data-type classification for a layer.
///
/// Only feature, raster, and mosaic layers can be clipped; everything else
/// (group layers, TINs, ...) is rejected with a logged warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Feature,
    Raster,
    Mosaic,
    Other(String),
}

impl LayerKind {
    /// Raster and mosaic layers share the extent-based clip path.
    pub fn is_raster(&self) -> bool {
        matches!(self, LayerKind::Raster | LayerKind::Mosaic)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, LayerKind::Other(_))
    }

    /// Human-readable type name for log messages.
    pub fn type_name(&self) -> &str {
        match self {
            LayerKind::Feature => "feature layer",
            LayerKind::Raster => "raster layer",
            LayerKind::Mosaic => "mosaic layer",
            LayerKind::Other(name) => name,
        }
    }
}

/// Per-layer metadata fetched fresh from the engine at processing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    pub kind: LayerKind,
    pub spatial_reference: Option<String>,
}

/// Trailing path component of a layer name.
///
/// Server execution contexts prepend a directory prefix; policy lookup and
/// output naming use only the base name. Stripping is idempotent.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['\\', '/']).next().unwrap_or(name)
}

/// Legacy workaround for malformed identifiers: names containing spaces
/// sometimes arrive wrapped in stray single quotes; remove them.
pub fn strip_stray_quotes(name: &str) -> String {
    if name.contains(' ') {
        name.replace('\'', "")
    } else {
        name.to_string()
    }
}
