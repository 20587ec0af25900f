use crate::config::SimulationParameters;
use crate::error::SimulationError;
use crate::field::{FieldGrid, Species};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// A disc of activator painted into the initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPatch {
    pub cx: usize,
    pub cy: usize,
    pub radius: usize,
}

impl SeedPatch {
    /// Euclidean disc test, exact for any `usize` inputs.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        let dx = x.abs_diff(self.cx) as u128;
        let dy = y.abs_diff(self.cy) as u128;
        let r = self.radius as u128;
        (dx * dx).saturating_add(dy * dy) <= r * r
    }
}

/// Draws seed placements and paints them into a fresh [`FieldGrid`].
#[derive(Clone, Debug)]
pub struct SeedInitializer {
    width: usize,
    height: usize,
    count: usize,
    radius: (usize, usize),
    margin: usize,
}

impl SeedInitializer {
    pub fn new(params: &SimulationParameters) -> Result<Self, SimulationError> {
        params.validate()?;
        Ok(Self {
            width: params.width,
            height: params.height,
            count: params.seed_count,
            radius: (params.seed_radius_min, params.seed_radius_max),
            margin: params.seed_margin,
        })
    }

    fn centre_range(dim: usize, margin: usize) -> Range<usize> {
        if dim > margin.saturating_mul(2) {
            margin..dim - margin
        } else {
            0..dim
        }
    }

    /// Draw `count` patches. The same rng state yields the same patches.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SeedPatch> {
        let xs = Self::centre_range(self.width, self.margin);
        let ys = Self::centre_range(self.height, self.margin);
        (0..self.count)
            .map(|_| SeedPatch {
                cx: rng.random_range(xs.clone()),
                cy: rng.random_range(ys.clone()),
                radius: rng.random_range(self.radius.0..=self.radius.1),
            })
            .collect()
    }

    /// Reagent at 1.0, activator at 0.0 except inside the drawn patches.
    pub fn initialize<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(FieldGrid, Vec<SeedPatch>), SimulationError> {
        let mut grid = FieldGrid::new(self.width, self.height)?;
        let patches = self.plan(rng);
        for patch in &patches {
            paint(&mut grid, patch);
        }
        Ok((grid, patches))
    }
}

/// Set every activator cell within `patch.radius` of the centre to 1.0.
/// Overwrites; overlapping patches do not accumulate.
pub fn paint(grid: &mut FieldGrid, patch: &SeedPatch) {
    debug!(
        cx = patch.cx,
        cy = patch.cy,
        radius = patch.radius,
        "painting seed"
    );
    let (width, height) = grid.shape();
    let x_end = patch.cx.saturating_add(patch.radius).saturating_add(1).min(width);
    let y_end = patch.cy.saturating_add(patch.radius).saturating_add(1).min(height);
    let data = grid.field_mut(Species::Activator).as_mut_slice();
    for y in patch.cy.saturating_sub(patch.radius)..y_end {
        for x in patch.cx.saturating_sub(patch.radius)..x_end {
            if patch.contains(x, y) {
                data[y * width + x] = 1.0;
            }
        }
    }
}
