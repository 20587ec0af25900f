use crate::error::SimulationError;
use crate::exec::{self, ExecutionMode};
use crate::field::ConcentrationField;

/// Gray-Scott coupling term `A * B²`, evaluated pointwise with no clamping.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReactionModel;

impl ReactionModel {
    #[inline]
    pub fn rate(&self, a: f32, b: f32) -> f32 {
        a * b * b
    }

    pub fn apply(
        &self,
        reagent: &ConcentrationField,
        activator: &ConcentrationField,
    ) -> Result<ConcentrationField, SimulationError> {
        let mut out = reagent.clone();
        self.apply_into(reagent, activator, &mut out, ExecutionMode::Sequential)?;
        Ok(out)
    }

    pub fn apply_into(
        &self,
        reagent: &ConcentrationField,
        activator: &ConcentrationField,
        out: &mut ConcentrationField,
        mode: ExecutionMode,
    ) -> Result<(), SimulationError> {
        activator.ensure_shape(reagent.shape())?;
        out.ensure_shape(reagent.shape())?;
        exec::map_rows(mode, out.as_mut_slice(), reagent.width(), |y, row| {
            for ((cell, &a), &b) in row
                .iter_mut()
                .zip(reagent.row(y))
                .zip(activator.row(y))
            {
                *cell = self.rate(a, b);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_activator_means_no_reaction() {
        let data: Vec<f32> = (0..20).map(|i| i as f32 / 19.0).collect();
        let reagent = ConcentrationField::from_vec(5, 4, data).unwrap();
        let activator = ConcentrationField::filled(5, 4, 0.0).unwrap();
        let reaction = ReactionModel.apply(&reagent, &activator).unwrap();
        assert!(reaction.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rate_is_reagent_times_activator_squared() {
        let reagent = ConcentrationField::filled(2, 2, 0.5).unwrap();
        let activator = ConcentrationField::filled(2, 2, 0.4).unwrap();
        let reaction = ReactionModel.apply(&reagent, &activator).unwrap();
        assert!(reaction
            .as_slice()
            .iter()
            .all(|&v| (v - 0.08).abs() < 1e-7));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let reagent = ConcentrationField::filled(3, 3, 1.0).unwrap();
        let activator = ConcentrationField::filled(3, 2, 1.0).unwrap();
        assert!(matches!(
            ReactionModel.apply(&reagent, &activator),
            Err(SimulationError::ShapeMismatch { .. })
        ));
    }
}
