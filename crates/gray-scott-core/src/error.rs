use crate::field::Species;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidDimension {
        width: usize,
        height: usize,
    },
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// A non-finite value was produced before clamping. `step` is the 1-based
    /// index of the step that failed.
    NumericInstability {
        step: usize,
        species: Species,
        x: usize,
        y: usize,
    },
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    Cancelled {
        completed_steps: usize,
    },
}

impl SimulationError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidDimension { width, height } => {
                write!(f, "grid dimensions must be positive (got {width}x{height})")
            }
            SimulationError::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            SimulationError::ShapeMismatch { expected, actual } => write!(
                f,
                "field shape {}x{} does not match expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            SimulationError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) is outside the {width}x{height} grid"),
            SimulationError::NumericInstability {
                step,
                species,
                x,
                y,
            } => write!(
                f,
                "non-finite {species} concentration at ({x}, {y}) during step {step}"
            ),
            SimulationError::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while simulation is {state}")
            }
            SimulationError::Cancelled { completed_steps } => {
                write!(f, "run cancelled after {completed_steps} completed steps")
            }
        }
    }
}

impl Error for SimulationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_cell() {
        let err = SimulationError::NumericInstability {
            step: 3,
            species: Species::Activator,
            x: 7,
            y: 9,
        };
        assert_eq!(
            err.to_string(),
            "non-finite activator concentration at (7, 9) during step 3"
        );
    }

    #[test]
    fn invalid_parameter_helper_keeps_reason() {
        let err = SimulationError::invalid_parameter("feed", "must be non-negative");
        assert_eq!(
            err,
            SimulationError::InvalidParameter {
                name: "feed",
                reason: "must be non-negative".to_string(),
            }
        );
    }
}
