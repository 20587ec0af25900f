use crate::error::SimulationError;
use crate::exec::ExecutionMode;
use crate::laplacian::StencilKernel;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub width: usize,
    pub height: usize,
    /// Diffusion rate of the reagent (`DA`).
    pub diffusion_a: f32,
    /// Diffusion rate of the activator (`DB`).
    pub diffusion_b: f32,
    pub feed: f32,
    pub kill: f32,
    /// Multiplier applied to the whole per-step update.
    pub damping: f32,
    pub iterations: usize,
    pub seed_count: usize,
    pub seed_radius_min: usize,
    pub seed_radius_max: usize,
    /// Seed centres are drawn at least this far from every edge, unless the
    /// grid is too small for it on that axis.
    pub seed_margin: usize,
    /// `None` draws a fresh seed per run.
    pub rng_seed: Option<u64>,
    pub kernel: StencilKernel,
    pub execution: ExecutionMode,
    /// Progress log cadence in steps; 0 disables progress lines.
    pub log_every: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            diffusion_a: 1.0,
            diffusion_b: 0.5,
            feed: 0.055,
            kill: 0.062,
            damping: 0.9,
            iterations: 1000,
            seed_count: 20,
            seed_radius_min: 5,
            seed_radius_max: 14,
            seed_margin: 20,
            rng_seed: Some(42),
            kernel: StencilKernel::default(),
            execution: ExecutionMode::default(),
            log_every: 200,
        }
    }
}

impl SimulationParameters {
    pub const MAX_CELLS: usize = 1 << 26;

    /// Largest accepted seed radius. A disc this wide already covers the whole
    /// grid from any centre inside it.
    pub fn max_seed_radius(&self) -> usize {
        self.width.saturating_add(self.height)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::invalid_parameter("config", e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationError::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        let cells = self.width.checked_mul(self.height);
        if cells.map_or(true, |c| c > Self::MAX_CELLS) {
            return Err(SimulationError::invalid_parameter(
                "width * height",
                format!("grid exceeds supported maximum of {} cells", Self::MAX_CELLS),
            ));
        }
        for (name, value) in [
            ("diffusion_a", self.diffusion_a),
            ("diffusion_b", self.diffusion_b),
            ("feed", self.feed),
            ("kill", self.kill),
            ("damping", self.damping),
        ] {
            if !value.is_finite() {
                return Err(SimulationError::invalid_parameter(
                    name,
                    format!("must be finite (got {value})"),
                ));
            }
            if value < 0.0 {
                return Err(SimulationError::invalid_parameter(
                    name,
                    format!("must be non-negative (got {value})"),
                ));
            }
        }
        if self.seed_radius_min == 0 {
            return Err(SimulationError::invalid_parameter(
                "seed_radius_min",
                "must be positive",
            ));
        }
        if self.seed_radius_min > self.seed_radius_max {
            return Err(SimulationError::invalid_parameter(
                "seed_radius_min",
                format!(
                    "must not exceed seed_radius_max ({} > {})",
                    self.seed_radius_min, self.seed_radius_max
                ),
            ));
        }
        if self.seed_radius_max > self.max_seed_radius() {
            return Err(SimulationError::invalid_parameter(
                "seed_radius_max",
                format!(
                    "must not exceed width + height ({} > {})",
                    self.seed_radius_max,
                    self.max_seed_radius()
                ),
            ));
        }
        // Deserialization goes through `StencilKernel::new`, but struct
        // literals can still carry a bad kernel.
        StencilKernel::new(*self.kernel.weights())?;
        Ok(())
    }
}

/// Parameter sets tuned for particular looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Full-resolution coral growth from twenty spots.
    OrganicMetamorphosis,
    /// Quarter-resolution substrate with a lower feed rate.
    BiomorphicDreams,
    /// Small undamped grid with a handful of large seeds.
    EmergenceSymphony,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::OrganicMetamorphosis,
        Preset::BiomorphicDreams,
        Preset::EmergenceSymphony,
    ];

    pub fn parameters(self) -> SimulationParameters {
        let base = SimulationParameters::default();
        match self {
            Preset::OrganicMetamorphosis => SimulationParameters {
                width: 1080,
                height: 1080,
                feed: 0.055,
                iterations: 2000,
                seed_count: 20,
                seed_radius_min: 5,
                seed_radius_max: 14,
                seed_margin: 20,
                ..base
            },
            Preset::BiomorphicDreams => SimulationParameters {
                width: 270,
                height: 270,
                feed: 0.045,
                iterations: 1000,
                seed_count: 20,
                seed_radius_min: 5,
                seed_radius_max: 11,
                seed_margin: 10,
                ..base
            },
            Preset::EmergenceSymphony => SimulationParameters {
                width: 100,
                height: 100,
                damping: 1.0,
                iterations: 100,
                seed_count: 5,
                seed_radius_min: 10,
                seed_radius_max: 10,
                seed_margin: 20,
                rng_seed: None,
                ..base
            },
        }
    }
}
