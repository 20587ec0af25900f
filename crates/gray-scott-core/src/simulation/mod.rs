pub mod metrics;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::config::SimulationParameters;
use crate::error::SimulationError;
use crate::field::FieldGrid;
use crate::integrator::{Integrator, StepTimings};
use crate::seed::{self, SeedInitializer, SeedPatch};
use crate::stop::{NeverStop, StopSignal};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::fmt;
use tracing::{error, info, warn};

/// Lifecycle of one simulation. Transitions only move forward:
/// `Uninitialized → Seeded → Stepping → Finalized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Uninitialized,
    Seeded,
    Stepping { completed: usize },
    Finalized,
}

impl SimulationState {
    fn name(&self) -> &'static str {
        match self {
            SimulationState::Uninitialized => "uninitialized",
            SimulationState::Seeded => "seeded",
            SimulationState::Stepping { .. } => "stepping",
            SimulationState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationState::Stepping { completed } => write!(f, "stepping ({completed} steps)"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// One reaction-diffusion run: the field pair, the integrator that evolves it,
/// and the seeding record needed to replay it.
pub struct Simulation {
    params: SimulationParameters,
    grid: FieldGrid,
    integrator: Integrator,
    state: SimulationState,
    rng_seed: u64,
    seeds: Vec<SeedPatch>,
}

impl Simulation {
    pub fn new(params: SimulationParameters) -> Result<Self, SimulationError> {
        params.validate()?;
        let rng_seed = params.rng_seed.unwrap_or_else(|| rand::rng().random());
        let grid = FieldGrid::new(params.width, params.height)?;
        let integrator = Integrator::new(&params)?;
        Ok(Self {
            params,
            grid,
            integrator,
            state: SimulationState::Uninitialized,
            rng_seed,
            seeds: Vec::new(),
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// The seed that drives placement, resolved at construction.
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    pub fn seeds(&self) -> &[SeedPatch] {
        &self.seeds
    }

    pub fn fields(&self) -> &FieldGrid {
        &self.grid
    }

    pub fn into_fields(self) -> FieldGrid {
        self.grid
    }

    pub fn steps_completed(&self) -> usize {
        self.integrator.steps_taken()
    }

    fn require_uninitialized(&self, operation: &'static str) -> Result<(), SimulationError> {
        if self.state != SimulationState::Uninitialized {
            return Err(SimulationError::InvalidState {
                operation,
                state: self.state.name(),
            });
        }
        Ok(())
    }

    /// Draw `seed_count` random patches from the resolved rng seed and paint them.
    pub fn seed(&mut self) -> Result<&[SeedPatch], SimulationError> {
        self.require_uninitialized("seed")?;
        let mut rng = ChaCha12Rng::seed_from_u64(self.rng_seed);
        let (grid, patches) = SeedInitializer::new(&self.params)?.initialize(&mut rng)?;
        info!(
            rng_seed = self.rng_seed,
            patches = patches.len(),
            width = self.params.width,
            height = self.params.height,
            "seeded simulation"
        );
        self.grid = grid;
        self.seeds = patches;
        self.state = SimulationState::Seeded;
        Ok(self.seeds.as_slice())
    }

    /// Paint caller-chosen patches instead of random ones.
    pub fn seed_with(&mut self, patches: Vec<SeedPatch>) -> Result<(), SimulationError> {
        self.require_uninitialized("seed")?;
        let (width, height) = self.grid.shape();
        if let Some(p) = patches.iter().find(|p| p.cx >= width || p.cy >= height) {
            return Err(SimulationError::OutOfBounds {
                x: p.cx,
                y: p.cy,
                width,
                height,
            });
        }
        let max_radius = self.params.max_seed_radius();
        if let Some(p) = patches.iter().find(|p| p.radius > max_radius) {
            return Err(SimulationError::invalid_parameter(
                "radius",
                format!("must not exceed width + height ({} > {max_radius})", p.radius),
            ));
        }
        for patch in &patches {
            seed::paint(&mut self.grid, patch);
        }
        info!(patches = patches.len(), "seeded simulation with explicit patches");
        self.seeds = patches;
        self.state = SimulationState::Seeded;
        Ok(())
    }

    fn begin_stepping(&mut self, operation: &'static str) -> Result<usize, SimulationError> {
        match self.state {
            SimulationState::Seeded => {
                self.state = SimulationState::Stepping { completed: 0 };
                Ok(0)
            }
            SimulationState::Stepping { completed } => Ok(completed),
            SimulationState::Uninitialized | SimulationState::Finalized => {
                Err(SimulationError::InvalidState {
                    operation,
                    state: self.state.name(),
                })
            }
        }
    }

    pub fn step(&mut self) -> Result<StepTimings, SimulationError> {
        let completed = self.begin_stepping("step")?;
        let timings = match self.integrator.step(&mut self.grid) {
            Ok(timings) => timings,
            Err(e) => {
                error!(error = %e, "step failed");
                return Err(e);
            }
        };
        let completed = completed + 1;
        self.state = SimulationState::Stepping { completed };
        if self.params.log_every > 0 && completed % self.params.log_every == 0 {
            let stats = self.grid.activator().stats();
            info!(
                step = completed,
                activator_mean = stats.mean,
                activator_max = stats.max,
                "patterns forming"
            );
        }
        Ok(timings)
    }

    pub fn run(&mut self, steps: usize) -> Result<&FieldGrid, SimulationError> {
        self.run_until(steps, &NeverStop)
    }

    /// Like [`run`](Self::run), polling `stop` before every step. When it
    /// fires, the fields hold the state after the last completed step and the
    /// run can be resumed.
    pub fn run_until<S: StopSignal + ?Sized>(
        &mut self,
        steps: usize,
        stop: &S,
    ) -> Result<&FieldGrid, SimulationError> {
        self.begin_stepping("run")?;
        for _ in 0..steps {
            self.check_stop(stop)?;
            self.step()?;
        }
        Ok(&self.grid)
    }

    fn check_stop<S: StopSignal + ?Sized>(&self, stop: &S) -> Result<(), SimulationError> {
        if stop.should_stop() {
            let completed_steps = self.steps_completed();
            warn!(completed_steps, "run cancelled");
            return Err(SimulationError::Cancelled { completed_steps });
        }
        Ok(())
    }

    /// Freeze the fields. Further stepping is rejected.
    pub fn finalize(&mut self) -> Result<&FieldGrid, SimulationError> {
        if self.state != SimulationState::Finalized {
            self.begin_stepping("finalize")?;
            self.state = SimulationState::Finalized;
        }
        Ok(&self.grid)
    }

    pub fn run_experiment(&mut self, sample_every: usize) -> Result<RunSummary, SimulationError> {
        self.run_experiment_until(sample_every, &NeverStop)
    }

    /// Seed (if not yet seeded), run the configured iteration count while
    /// sampling metrics every `sample_every` steps and at the final step, then
    /// finalize. Sample steps count from the initial state, so a simulation
    /// that has already taken steps is rejected.
    pub fn run_experiment_until<S: StopSignal + ?Sized>(
        &mut self,
        sample_every: usize,
        stop: &S,
    ) -> Result<RunSummary, SimulationError> {
        if sample_every == 0 {
            return Err(SimulationError::invalid_parameter(
                "sample_every",
                "must be positive",
            ));
        }
        match self.state {
            SimulationState::Uninitialized => {
                self.seed()?;
            }
            SimulationState::Stepping { completed } if completed > 0 => {
                return Err(SimulationError::InvalidState {
                    operation: "run experiment",
                    state: self.state.name(),
                });
            }
            _ => {}
        }
        self.begin_stepping("run experiment")?;

        let steps = self.params.iterations;
        info!(
            steps,
            sample_every,
            rng_seed = self.rng_seed,
            execution = ?self.params.execution,
            "starting run"
        );
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.check_stop(stop)?;
            self.step()?;
            if step % sample_every == 0 || step == steps {
                samples.push(self.collect_step_metrics(step));
            }
        }
        self.finalize()?;

        let final_activator = self.grid.activator().stats();
        info!(
            steps,
            activator_mean = final_activator.mean,
            activator_std = final_activator.std_dev,
            "run finished"
        );
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            rng_seed: self.rng_seed,
            width: self.params.width,
            height: self.params.height,
            seeds: self.seeds.clone(),
            samples,
            final_reagent: self.grid.reagent().stats(),
            final_activator,
        })
    }
}
