//! Command execution: wire the adapters to the job runner and report.

use anyhow::{bail, Context, Result};
use console::style;

use clipship_core::models::{FormatSpec, DEFAULT_MAX_AREA};
use clipship_engine::{EngineManifest, MemoryEngine, TomlPolicyStore};
use clipship_job::{ExtractJob, JobOutcome, LayerOutcome};

use crate::aoi;
use crate::cli::Cli;

pub fn execute(cli: Cli) -> Result<()> {
    let layers = parse_layers(&cli.layers);
    if layers.is_empty() {
        bail!("No layers requested. Pass a semicolon-delimited layer list.");
    }

    let feature_format = FormatSpec::parse_feature(&cli.feature_format)
        .context("Invalid --feature-format descriptor")?;
    let raster_format =
        FormatSpec::parse_raster(&cli.raster_format).context("Invalid --raster-format descriptor")?;
    let aoi = aoi::load_aoi(&cli.aoi)?;

    let manifest = EngineManifest::load(&cli.manifest)?;
    let mut engine = MemoryEngine::from_manifest(&manifest);

    let policies = match &cli.policy_table {
        Some(path) => TomlPolicyStore::load(path),
        None => TomlPolicyStore::empty(),
    };
    let default_max_area = cli
        .default_max_area
        .or_else(|| policies.default_max_area())
        .unwrap_or(DEFAULT_MAX_AREA);

    let job = ExtractJob {
        layers,
        aoi,
        feature_format,
        raster_format,
        coordinate_system: cli.coordinate_system,
        custom_cs_folder: cli.cs_folder,
        output_zip: cli.output,
        scratch_root: cli.scratch.unwrap_or_else(std::env::temp_dir),
        default_max_area,
    };

    let outcome =
        clipship_job::run(&job, &mut engine, &policies).context("Extraction job failed")?;
    print_summary(&outcome);
    Ok(())
}

/// Split the semicolon-delimited layer list, preserving order.
fn parse_layers(input: &str) -> Vec<String> {
    input.split(';').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn print_summary(outcome: &JobOutcome) {
    println!();
    for report in &outcome.reports {
        match &report.outcome {
            LayerOutcome::Extracted { output } => {
                println!("{} {} -> {}", style("✓").green().bold(), report.layer, output.display());
            }
            LayerOutcome::Skipped { .. } => {
                println!("{} {} skipped", style("⚠").yellow().bold(), report.layer);
            }
            LayerOutcome::Failed { .. } => {
                println!("{} {} failed", style("✗").red().bold(), report.layer);
            }
        }
    }
    println!();
    println!(
        "{} {} extracted, {} skipped, {} failed",
        style("Summary:").bold(),
        outcome.extracted_count(),
        outcome.skipped_count(),
        outcome.failed_count()
    );
    println!("{} {}", style("Archive:").bold(), outcome.archive.display());
    println!("{} {}", style("Processing log:").bold(), outcome.log_path.display());
}
