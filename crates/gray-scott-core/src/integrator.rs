use crate::config::SimulationParameters;
use crate::error::SimulationError;
use crate::exec::{self, ExecutionMode};
use crate::field::{ConcentrationField, FieldGrid, Species};
use crate::laplacian::LaplacianOperator;
use crate::reaction::ReactionModel;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct StepTimings {
    pub laplacian_us: u64,
    pub reaction_us: u64,
    pub update_us: u64,
    pub total_us: u64,
}

/// Rate constants used by the update rule.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Rates {
    diffusion_a: f32,
    diffusion_b: f32,
    feed: f32,
    kill: f32,
    damping: f32,
}

/// Advances a [`FieldGrid`] one explicit step at a time.
///
/// Scratch fields are allocated once. A step writes the complete new
/// reagent and activator into scratch before swapping them into the grid, so
/// the activator update always sees the pre-step reagent and a failed step
/// leaves the grid untouched.
pub struct Integrator {
    rates: Rates,
    laplacian: LaplacianOperator,
    reaction: ReactionModel,
    mode: ExecutionMode,
    lap_a: ConcentrationField,
    lap_b: ConcentrationField,
    reaction_buf: ConcentrationField,
    next_a: ConcentrationField,
    next_b: ConcentrationField,
    steps_taken: usize,
}

/// First non-finite value found in a row, before clamping.
#[derive(Clone, Copy, Debug)]
struct Blowup {
    species: Species,
    x: usize,
}

impl Integrator {
    pub fn new(params: &SimulationParameters) -> Result<Self, SimulationError> {
        params.validate()?;
        let scratch = ConcentrationField::filled(params.width, params.height, 0.0)?;
        Ok(Self {
            rates: Rates {
                diffusion_a: params.diffusion_a,
                diffusion_b: params.diffusion_b,
                feed: params.feed,
                kill: params.kill,
                damping: params.damping,
            },
            laplacian: LaplacianOperator::new(params.kernel),
            reaction: ReactionModel,
            mode: params.execution,
            lap_a: scratch.clone(),
            lap_b: scratch.clone(),
            reaction_buf: scratch.clone(),
            next_a: scratch.clone(),
            next_b: scratch,
            steps_taken: 0,
        })
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn step(&mut self, grid: &mut FieldGrid) -> Result<StepTimings, SimulationError> {
        let total_start = Instant::now();
        grid.reagent().ensure_shape(self.next_a.shape())?;

        // 1. Diffusion terms
        let t0 = Instant::now();
        self.laplacian
            .apply_into(grid.reagent(), &mut self.lap_a, self.mode)?;
        self.laplacian
            .apply_into(grid.activator(), &mut self.lap_b, self.mode)?;
        let laplacian_us = t0.elapsed().as_micros() as u64;

        // 2. Reaction term
        let t1 = Instant::now();
        self.reaction.apply_into(
            grid.reagent(),
            grid.activator(),
            &mut self.reaction_buf,
            self.mode,
        )?;
        let reaction_us = t1.elapsed().as_micros() as u64;

        // 3. Update into scratch, then commit
        let t2 = Instant::now();
        let Rates {
            diffusion_a,
            diffusion_b,
            feed,
            kill,
            damping,
        } = self.rates;
        let width = grid.width();
        let (a, b) = (grid.reagent(), grid.activator());
        let (lap_a, lap_b, reaction) = (&self.lap_a, &self.lap_b, &self.reaction_buf);
        let blowups = exec::map_row_pairs(
            self.mode,
            self.next_a.as_mut_slice(),
            self.next_b.as_mut_slice(),
            width,
            |y, out_a, out_b| {
                let mut first: Option<Blowup> = None;
                let cells = a
                    .row(y)
                    .iter()
                    .zip(b.row(y))
                    .zip(lap_a.row(y))
                    .zip(lap_b.row(y))
                    .zip(reaction.row(y));
                for (x, ((((&a, &b), &la), &lb), &r)) in cells.enumerate() {
                    let a_new = a + (diffusion_a * la - r + feed * (1.0 - a)) * damping;
                    let b_new = b + (diffusion_b * lb + r - (kill + feed) * b) * damping;
                    if first.is_none() {
                        if !a_new.is_finite() {
                            first = Some(Blowup {
                                species: Species::Reagent,
                                x,
                            });
                        } else if !b_new.is_finite() {
                            first = Some(Blowup {
                                species: Species::Activator,
                                x,
                            });
                        }
                    }
                    out_a[x] = a_new.clamp(0.0, 1.0);
                    out_b[x] = b_new.clamp(0.0, 1.0);
                }
                first
            },
        );

        if let Some((y, blowup)) = blowups
            .into_iter()
            .enumerate()
            .find_map(|(y, blowup)| blowup.map(|b| (y, b)))
        {
            return Err(SimulationError::NumericInstability {
                step: self.steps_taken + 1,
                species: blowup.species,
                x: blowup.x,
                y,
            });
        }

        grid.commit(&mut self.next_a, &mut self.next_b);
        self.steps_taken += 1;
        let update_us = t2.elapsed().as_micros() as u64;

        Ok(StepTimings {
            laplacian_us,
            reaction_us,
            update_us,
            total_us: total_start.elapsed().as_micros() as u64,
        })
    }

    /// Apply `steps` consecutive steps, stopping at the first failure.
    pub fn run(&mut self, grid: &mut FieldGrid, steps: usize) -> Result<(), SimulationError> {
        for _ in 0..steps {
            self.step(grid)?;
        }
        Ok(())
    }
}
