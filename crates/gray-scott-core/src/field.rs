use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two reacting substances a field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Background reagent `A`, fed from outside.
    Reagent,
    /// Activator `B`, consumed by the kill term.
    Activator,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Reagent => write!(f, "reagent"),
            Species::Activator => write!(f, "activator"),
        }
    }
}

/// 2D grid of concentration values, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcentrationField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ConcentrationField {
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self, SimulationError> {
        if width == 0 || height == 0 {
            return Err(SimulationError::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![value; width * height],
        })
    }

    /// Build a field from row-major values. `data.len()` must equal `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self, SimulationError> {
        if width == 0 || height == 0 {
            return Err(SimulationError::InvalidDimension { width, height });
        }
        if data.len() != width * height {
            return Err(SimulationError::ShapeMismatch {
                expected: (width, height),
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.width)
    }

    /// Value at `(x, y)`, with out-of-range coordinates replicated from the
    /// nearest edge cell.
    pub fn get(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) -> Result<(), SimulationError> {
        if x >= self.width || y >= self.height {
            return Err(SimulationError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.data[y * self.width + x] = value;
        Ok(())
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    pub(crate) fn ensure_shape(&self, expected: (usize, usize)) -> Result<(), SimulationError> {
        if self.shape() != expected {
            return Err(SimulationError::ShapeMismatch {
                expected,
                actual: self.shape(),
            });
        }
        Ok(())
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats::of(&self.data)
    }
}

/// Summary statistics of one field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FieldStats {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
}

impl FieldStats {
    pub fn of(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }
        let mean = sum / values.len() as f64;
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            let var = values
                .iter()
                .map(|&v| (v as f64 - mean).powi(2))
                .sum::<f64>()
                / (values.len() - 1) as f64;
            var.sqrt()
        };
        Self {
            min,
            max,
            mean,
            std_dev,
        }
    }
}

/// The reagent/activator pair of one simulation. Both fields share one shape,
/// fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldGrid {
    reagent: ConcentrationField,
    activator: ConcentrationField,
}

impl FieldGrid {
    /// Reagent at 1.0 everywhere, activator at 0.0 everywhere.
    pub fn new(width: usize, height: usize) -> Result<Self, SimulationError> {
        Ok(Self {
            reagent: ConcentrationField::filled(width, height, 1.0)?,
            activator: ConcentrationField::filled(width, height, 0.0)?,
        })
    }

    pub fn from_fields(
        reagent: ConcentrationField,
        activator: ConcentrationField,
    ) -> Result<Self, SimulationError> {
        activator.ensure_shape(reagent.shape())?;
        Ok(Self { reagent, activator })
    }

    pub fn width(&self) -> usize {
        self.reagent.width
    }

    pub fn height(&self) -> usize {
        self.reagent.height
    }

    pub fn shape(&self) -> (usize, usize) {
        self.reagent.shape()
    }

    pub fn field(&self, species: Species) -> &ConcentrationField {
        match species {
            Species::Reagent => &self.reagent,
            Species::Activator => &self.activator,
        }
    }

    pub(crate) fn field_mut(&mut self, species: Species) -> &mut ConcentrationField {
        match species {
            Species::Reagent => &mut self.reagent,
            Species::Activator => &mut self.activator,
        }
    }

    pub fn reagent(&self) -> &ConcentrationField {
        &self.reagent
    }

    pub fn activator(&self) -> &ConcentrationField {
        &self.activator
    }

    /// Edge-replicated read, see [`ConcentrationField::get`].
    pub fn get(&self, species: Species, x: isize, y: isize) -> f32 {
        self.field(species).get(x, y)
    }

    /// Raw write. Range clamping is the integrator's job, not the container's.
    pub fn set(
        &mut self,
        species: Species,
        x: usize,
        y: usize,
        value: f32,
    ) -> Result<(), SimulationError> {
        self.field_mut(species).set(x, y, value)
    }

    /// Replace both fields at once. Shapes must match the grid.
    pub(crate) fn commit(
        &mut self,
        reagent: &mut ConcentrationField,
        activator: &mut ConcentrationField,
    ) {
        std::mem::swap(&mut self.reagent, reagent);
        std::mem::swap(&mut self.activator, activator);
    }

    pub fn into_fields(self) -> (ConcentrationField, ConcentrationField) {
        (self.reagent, self.activator)
    }
}
