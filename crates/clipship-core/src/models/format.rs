//! Output format descriptors.
//!
//! A format is always a triple of long name, short code, and file
//! extension. The short code and extension jointly determine naming and
//! handling rules downstream: which formats convert at clip time, which
//! need a second export pass, and which live inside a container workspace.

use serde::{Deserialize, Serialize};

use crate::error::{ClipshipError, Result};

/// Workspace container the engine writes a format's output into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// File geodatabase (`data.gdb` inside the destination folder)
    FileGdb,
    /// Personal geodatabase (`data.mdb` inside the destination folder)
    PersonalGdb,
    /// Plain folder, no container
    Folder,
}

/// Output format: long name, short code, file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub long_name: String,
    pub short_code: String,
    pub extension: String,
}

impl FormatSpec {
    pub fn new(
        long_name: impl Into<String>,
        short_code: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            long_name: long_name.into(),
            short_code: short_code.into(),
            extension: extension.into(),
        }
    }

    /// Default feature format when none is requested.
    pub fn file_geodatabase() -> Self {
        Self::new("File Geodatabase", "GDB", ".gdb")
    }

    /// Default raster format when none is requested. The legacy grid format
    /// has no file extension.
    pub fn esri_grid() -> Self {
        Self::new("ESRI GRID", "GRID", "")
    }

    /// Parse a dash-delimited `"long name - short code - extension"`
    /// descriptor. Parts are trimmed; a missing extension defaults to the
    /// empty string. Fewer than two parts is a validation error.
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split('-').map(str::trim).collect();
        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(ClipshipError::InvalidFormat {
                input: input.to_string(),
                reason: "expected \"long name - short code - extension\"".to_string(),
            });
        }
        Ok(Self::new(parts[0], parts[1], *parts.get(2).unwrap_or(&"")))
    }

    /// Parse a requested feature format, defaulting to File Geodatabase
    /// when the request is empty.
    pub fn parse_feature(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            Ok(Self::file_geodatabase())
        } else {
            Self::parse(input)
        }
    }

    /// Parse a requested raster format, defaulting to ESRI GRID when the
    /// request is empty.
    pub fn parse_raster(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            Ok(Self::esri_grid())
        } else {
            Self::parse(input)
        }
    }

    /// Formats the feature clip step can produce directly, with no second
    /// export pass.
    pub fn converts_during_clip(&self) -> bool {
        matches!(self.short_lower().as_str(), "gdb" | "mdb" | "shp")
    }

    /// CAD interchange formats take the engine's CAD export path instead of
    /// the interoperability exporter.
    pub fn is_cad(&self) -> bool {
        matches!(self.extension_lower().as_str(), ".dxf" | ".dwg" | ".dgn")
    }

    /// The legacy single-band grid raster format, which carries its own
    /// naming constraints (12 characters, no spaces, no extension).
    pub fn is_grid(&self) -> bool {
        self.short_lower() == "grid"
    }

    /// Container workspace this format's output is written into.
    pub fn container_kind(&self) -> ContainerKind {
        match self.short_lower().as_str() {
            "gdb" => ContainerKind::FileGdb,
            "mdb" => ContainerKind::PersonalGdb,
            _ => ContainerKind::Folder,
        }
    }

    /// Whether output names carry the file extension. Rasters and simple
    /// feature files encode their type via the extension; container formats
    /// and grid do not.
    pub fn appends_extension(&self, is_raster: bool) -> bool {
        let short = self.short_lower();
        (is_raster || short == "shp") && !matches!(short.as_str(), "gdb" | "mdb" | "grid")
    }

    pub fn short_lower(&self) -> String {
        self.short_code.to_ascii_lowercase()
    }

    pub fn extension_lower(&self) -> String {
        self.extension.to_ascii_lowercase()
    }
}
