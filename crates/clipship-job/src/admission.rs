//! Per-layer maximum-area admission control.
//!
//! Each layer carries (or inherits) a maximum extractable area; an AOI at
//! or above that threshold gets the layer skipped rather than processed.

use clipship_core::models::base_name;
use clipship_core::ports::MaxAreaStore;

use crate::log::ProcessingLog;

/// Outcome of the area gate for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionDecision {
    Accepted { max_area: f64 },
    Rejected { max_area: f64 },
}

impl AdmissionDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionDecision::Accepted { .. })
    }

    pub fn max_area(&self) -> f64 {
        match self {
            AdmissionDecision::Accepted { max_area } | AdmissionDecision::Rejected { max_area } => {
                *max_area
            }
        }
    }
}

pub struct AdmissionControl<'a> {
    policies: &'a dyn MaxAreaStore,
    default_max_area: f64,
}

impl<'a> AdmissionControl<'a> {
    pub fn new(policies: &'a dyn MaxAreaStore, default_max_area: f64) -> Self {
        Self { policies, default_max_area }
    }

    /// Resolve the layer's threshold and compare the AOI area against it.
    ///
    /// The lookup uses the layer's base name (server execution contexts
    /// prepend a directory prefix). An unreachable policy table logs an
    /// error and falls back to the global default; a missing entry falls
    /// back silently.
    pub fn decide(&self, layer: &str, aoi_area: f64, log: &ProcessingLog) -> AdmissionDecision {
        let base = base_name(layer);
        log.info(format!("-> Checking maximum-area policy for {base}"));

        let max_area = match self.policies.max_area_for(base) {
            Ok(Some(area)) => area,
            Ok(None) => self.default_max_area,
            Err(err) => {
                tracing::error!(layer = base, %err, "policy table lookup failed");
                log.error(format!("==> ERROR: {err}"));
                self.default_max_area
            }
        };
        log.info(format!(
            "-> maximum area to extract for this layer is {max_area} sq meters"
        ));

        if aoi_area >= max_area {
            AdmissionDecision::Rejected { max_area }
        } else {
            AdmissionDecision::Accepted { max_area }
        }
    }
}
