//! Discrete diffusion term over a concentration field.

use crate::error::SimulationError;
use crate::exec::{self, ExecutionMode};
use crate::field::ConcentrationField;
use serde::{Deserialize, Serialize};

const ZERO_SUM_TOLERANCE: f32 = 1e-6;

/// Fixed 3×3 weights, indexed `[row][col]` with the centre at `[1][1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f32; 3]; 3]", into = "[[f32; 3]; 3]")]
pub struct StencilKernel {
    weights: [[f32; 3]; 3],
}

impl StencilKernel {
    /// Nine-point kernel with 0.2 on edges and 0.05 on corners.
    pub const GRAY_SCOTT: StencilKernel = StencilKernel {
        weights: [[0.05, 0.2, 0.05], [0.2, -1.0, 0.2], [0.05, 0.2, 0.05]],
    };

    /// Weights must be finite and sum to zero within 1e-6.
    ///
    /// [`LaplacianOperator`] sums `w * (neighbour - centre)` over the eight
    /// off-centre weights, so the centre weight acts as the negated sum of the
    /// others. For a kernel whose weights sum to a small nonzero `s`, the
    /// output differs from the plain weighted sum by `s * centre`.
    pub fn new(weights: [[f32; 3]; 3]) -> Result<Self, SimulationError> {
        if weights.iter().flatten().any(|w| !w.is_finite()) {
            return Err(SimulationError::invalid_parameter(
                "kernel",
                "weights must be finite",
            ));
        }
        let sum: f32 = weights.iter().flatten().sum();
        if sum.abs() > ZERO_SUM_TOLERANCE {
            return Err(SimulationError::invalid_parameter(
                "kernel",
                format!("weights must sum to zero (got {sum})"),
            ));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &[[f32; 3]; 3] {
        &self.weights
    }
}

impl Default for StencilKernel {
    fn default() -> Self {
        Self::GRAY_SCOTT
    }
}

impl TryFrom<[[f32; 3]; 3]> for StencilKernel {
    type Error = SimulationError;

    fn try_from(weights: [[f32; 3]; 3]) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<StencilKernel> for [[f32; 3]; 3] {
    fn from(kernel: StencilKernel) -> Self {
        kernel.weights
    }
}

/// Applies a [`StencilKernel`] with edge-replicated boundaries.
#[derive(Clone, Debug, Default)]
pub struct LaplacianOperator {
    kernel: StencilKernel,
}

impl LaplacianOperator {
    pub fn new(kernel: StencilKernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &StencilKernel {
        &self.kernel
    }

    pub fn apply(&self, field: &ConcentrationField) -> ConcentrationField {
        let mut out = field.clone();
        self.fill(field, &mut out, ExecutionMode::Sequential);
        out
    }

    /// Write the Laplacian of `field` into `out`, which must have the same shape.
    pub fn apply_into(
        &self,
        field: &ConcentrationField,
        out: &mut ConcentrationField,
        mode: ExecutionMode,
    ) -> Result<(), SimulationError> {
        out.ensure_shape(field.shape())?;
        self.fill(field, out, mode);
        Ok(())
    }

    fn fill(&self, field: &ConcentrationField, out: &mut ConcentrationField, mode: ExecutionMode) {
        let width = field.width();
        exec::map_rows(mode, out.as_mut_slice(), width, |y, row| {
            self.fill_row(field, y, row)
        });
    }

    // Each neighbour contributes w * (n - centre). Since the weights sum to
    // zero this equals the plain weighted sum, and a uniform neighbourhood
    // yields exactly 0.0.
    fn fill_row(&self, field: &ConcentrationField, y: usize, out: &mut [f32]) {
        let (width, height) = field.shape();
        let src = field.as_slice();
        let rows = [y.saturating_sub(1), y, (y + 1).min(height - 1)];
        for (x, cell) in out.iter_mut().enumerate() {
            let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];
            let centre = src[y * width + x];
            let mut acc = 0.0f32;
            for (i, &ny) in rows.iter().enumerate() {
                for (j, &nx) in cols.iter().enumerate() {
                    if i == 1 && j == 1 {
                        continue;
                    }
                    acc += self.kernel.weights[i][j] * (src[ny * width + nx] - centre);
                }
            }
            *cell = acc;
        }
    }
}
