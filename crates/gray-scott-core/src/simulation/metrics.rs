use super::Simulation;
use crate::field::FieldStats;
use crate::seed::SeedPatch;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub reagent: FieldStats,
    pub activator: FieldStats,
    /// Share of cells whose activator lies strictly inside (0, 1).
    pub activator_transition_fraction: f32,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    /// Seed actually used, even when none was configured.
    pub rng_seed: u64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub seeds: Vec<SeedPatch>,
    pub samples: Vec<StepMetrics>,
    pub final_reagent: FieldStats,
    pub final_activator: FieldStats,
}

impl Simulation {
    pub(crate) fn collect_step_metrics(&self, step: usize) -> StepMetrics {
        let activator = self.grid.activator().as_slice();
        let transition = activator.iter().filter(|&&b| b > 0.0 && b < 1.0).count();
        StepMetrics {
            step,
            reagent: self.grid.reagent().stats(),
            activator: FieldStats::of(activator),
            activator_transition_fraction: transition as f32 / activator.len().max(1) as f32,
        }
    }
}
