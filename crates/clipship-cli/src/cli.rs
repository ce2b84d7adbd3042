use clap::Parser;
use std::path::PathBuf;

/// ClipShip - clip, package, and ship map layers for delivery
#[derive(Parser, Debug)]
#[command(name = "clipship")]
#[command(about = "Clip map layers to an area of interest and ship them as a zip archive", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Semicolon-delimited list of layers to extract, in processing order
    pub layers: String,

    /// Area-of-interest polygon (GeoJSON file)
    #[arg(long)]
    pub aoi: PathBuf,

    /// Output feature format descriptor, "long name - short code - extension"
    /// (File Geodatabase when omitted)
    #[arg(long, default_value = "")]
    pub feature_format: String,

    /// Output raster format descriptor, same shape (ESRI GRID when omitted)
    #[arg(long, default_value = "")]
    pub raster_format: String,

    /// Output coordinate system: a code or a named system (same as input
    /// when omitted)
    #[arg(long, default_value = "")]
    pub coordinate_system: String,

    /// Folder searched recursively for custom coordinate-system .prj files
    #[arg(long)]
    pub cs_folder: Option<PathBuf>,

    /// Path of the delivery archive to create
    #[arg(long)]
    pub output: PathBuf,

    /// Root folder for staging and scratch workspaces (system temp when
    /// omitted)
    #[arg(long)]
    pub scratch: Option<PathBuf>,

    /// Maximum-area policy table (TOML)
    #[arg(long)]
    pub policy_table: Option<PathBuf>,

    /// Default maximum extractable area in square meters for layers with
    /// no policy entry
    #[arg(long)]
    pub default_max_area: Option<f64>,

    /// Layer manifest for the in-memory engine (TOML)
    #[arg(long)]
    pub manifest: PathBuf,
}
