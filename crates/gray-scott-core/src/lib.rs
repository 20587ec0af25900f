//! Gray-Scott reaction-diffusion engine.
//!
//! A [`Simulation`] owns a reagent/activator [`FieldGrid`], seeds it with
//! random discs of activator, and advances it with an explicit, damped update
//! whose values are clamped to `[0, 1]` after every step. Rendering the final
//! activator field is left to the caller.

pub mod config;
pub mod error;
pub mod exec;
pub mod field;
pub mod integrator;
pub mod laplacian;
pub mod reaction;
pub mod seed;
pub mod simulation;
pub mod stop;

pub use config::{Preset, SimulationParameters};
pub use error::SimulationError;
pub use exec::ExecutionMode;
pub use field::{ConcentrationField, FieldGrid, FieldStats, Species};
pub use integrator::{Integrator, StepTimings};
pub use laplacian::{LaplacianOperator, StencilKernel};
pub use reaction::ReactionModel;
pub use seed::{SeedInitializer, SeedPatch};
pub use simulation::{RunSummary, Simulation, SimulationState, StepMetrics};
pub use stop::{Deadline, NeverStop, StopSignal};
