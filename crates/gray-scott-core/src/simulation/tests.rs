use super::*;
use crate::exec::ExecutionMode;
use crate::field::Species;
use crate::stop::Deadline;
use std::sync::atomic::AtomicBool;

fn scenario_params() -> SimulationParameters {
    SimulationParameters {
        width: 64,
        height: 64,
        diffusion_a: 1.0,
        diffusion_b: 0.5,
        feed: 0.055,
        kill: 0.062,
        damping: 0.9,
        iterations: 200,
        seed_count: 1,
        seed_radius_min: 5,
        seed_radius_max: 5,
        rng_seed: Some(42),
        ..SimulationParameters::default()
    }
}

fn centre_seed() -> SeedPatch {
    SeedPatch {
        cx: 32,
        cy: 32,
        radius: 5,
    }
}

fn all_in_unit_interval(grid: &FieldGrid) -> bool {
    [Species::Reagent, Species::Activator].iter().all(|&s| {
        grid.field(s)
            .as_slice()
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    })
}

#[test]
fn centred_seed_grows_a_pattern() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    let grid = sim.run(200).unwrap();

    let activator = grid.activator();
    assert!(activator.stats().std_dev > 0.0);
    assert!(all_in_unit_interval(grid));

    let seed = centre_seed();
    let mut grew = false;
    for y in 0..64 {
        for x in 0..64 {
            let b = activator.get(x as isize, y as isize);
            if !seed.contains(x, y) && b > 0.0 && b < 1.0 {
                grew = true;
            }
        }
    }
    assert!(grew, "no intermediate activator outside the initial seed");
    assert_eq!(sim.state(), SimulationState::Stepping { completed: 200 });
}

#[test]
fn clamp_invariant_holds_after_every_step() {
    let mut sim = Simulation::new(SimulationParameters {
        width: 40,
        height: 40,
        seed_count: 6,
        seed_radius_min: 2,
        seed_radius_max: 6,
        seed_margin: 5,
        damping: 1.0,
        ..scenario_params()
    })
    .unwrap();
    sim.seed().unwrap();
    for _ in 0..100 {
        sim.step().unwrap();
        assert!(all_in_unit_interval(sim.fields()));
    }
}

#[test]
fn same_rng_seed_reproduces_seeds_and_fields() {
    let params = SimulationParameters {
        width: 48,
        height: 48,
        seed_count: 4,
        seed_radius_min: 2,
        seed_radius_max: 5,
        seed_margin: 6,
        rng_seed: Some(1234),
        ..scenario_params()
    };
    let mut first = Simulation::new(params.clone()).unwrap();
    let mut second = Simulation::new(params).unwrap();
    first.seed().unwrap();
    second.seed().unwrap();
    assert_eq!(first.seeds(), second.seeds());
    assert_eq!(first.fields(), second.fields());

    first.run(60).unwrap();
    second.run(60).unwrap();
    assert_eq!(first.fields(), second.fields());
}

#[test]
fn unset_rng_seed_is_resolved_and_replayable() {
    let params = SimulationParameters {
        rng_seed: None,
        seed_count: 3,
        ..scenario_params()
    };
    let mut sim = Simulation::new(params.clone()).unwrap();
    sim.seed().unwrap();

    let mut replay = Simulation::new(SimulationParameters {
        rng_seed: Some(sim.rng_seed()),
        ..params
    })
    .unwrap();
    replay.seed().unwrap();
    assert_eq!(sim.seeds(), replay.seeds());
}

#[test]
fn seeded_disc_is_exact() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    let grid = sim.fields();
    for y in 0..64usize {
        for x in 0..64usize {
            let dx = x as f64 - 32.0;
            let dy = y as f64 - 32.0;
            if (dx * dx + dy * dy).sqrt() <= 5.0 {
                assert_eq!(grid.get(Species::Activator, x as isize, y as isize), 1.0);
            }
        }
    }
    assert_eq!(grid.get(Species::Activator, 38, 32), 0.0);
    assert_eq!(grid.get(Species::Activator, 32, 26), 0.0);
}

#[test]
fn divergent_parameters_raise_numeric_instability() {
    let mut sim = Simulation::new(SimulationParameters {
        diffusion_a: 1e38,
        diffusion_b: 1e38,
        damping: 10.0,
        ..scenario_params()
    })
    .unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    let before = sim.fields().clone();
    let err = sim.run(10).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::NumericInstability { step: 1, .. }
    ));
    assert_eq!(sim.fields(), &before);
    assert!(sim
        .fields()
        .activator()
        .as_slice()
        .iter()
        .all(|v| v.is_finite()));
}

#[test]
fn stepping_before_seeding_is_rejected() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    assert!(matches!(
        sim.step(),
        Err(SimulationError::InvalidState {
            operation: "step",
            state: "uninitialized"
        })
    ));
    assert!(sim.finalize().is_err());
    sim.seed().unwrap();
    assert!(matches!(
        sim.seed(),
        Err(SimulationError::InvalidState { operation: "seed", .. })
    ));
}

#[test]
fn finalized_simulation_is_read_only() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed().unwrap();
    sim.run(3).unwrap();
    let frozen = sim.finalize().unwrap().clone();
    assert_eq!(sim.state(), SimulationState::Finalized);
    assert!(matches!(
        sim.step(),
        Err(SimulationError::InvalidState {
            state: "finalized",
            ..
        })
    ));
    assert!(sim.run(1).is_err());
    assert_eq!(sim.fields(), &frozen);
    assert!(sim.finalize().is_ok());
}

#[test]
fn zero_step_run_enters_stepping() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed().unwrap();
    assert_eq!(sim.state(), SimulationState::Seeded);
    sim.run(0).unwrap();
    assert_eq!(sim.state(), SimulationState::Stepping { completed: 0 });
}

#[test]
fn raised_flag_cancels_between_steps() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    sim.run(5).unwrap();
    let flag = AtomicBool::new(true);
    assert_eq!(
        sim.run_until(10, &flag).unwrap_err(),
        SimulationError::Cancelled { completed_steps: 5 }
    );
    // Cancellation does not disturb the numbers: resuming matches a straight run.
    sim.run(5).unwrap();
    let mut straight = Simulation::new(scenario_params()).unwrap();
    straight.seed_with(vec![centre_seed()]).unwrap();
    straight.run(10).unwrap();
    assert_eq!(sim.fields(), straight.fields());
}

#[test]
fn expired_deadline_stops_experiment() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    let err = sim
        .run_experiment_until(10, &Deadline(std::time::Instant::now()))
        .unwrap_err();
    assert_eq!(err, SimulationError::Cancelled { completed_steps: 0 });
    assert_eq!(sim.state(), SimulationState::Stepping { completed: 0 });
}

#[test]
fn experiment_samples_and_summarises() {
    let mut sim = Simulation::new(SimulationParameters {
        iterations: 25,
        seed_count: 3,
        seed_radius_min: 3,
        seed_radius_max: 6,
        seed_margin: 8,
        execution: ExecutionMode::Sequential,
        ..scenario_params()
    })
    .unwrap();
    let summary = sim.run_experiment(10).unwrap();
    assert_eq!(summary.schema_version, 1);
    assert_eq!(summary.steps, 25);
    assert_eq!(
        summary.samples.iter().map(|s| s.step).collect::<Vec<_>>(),
        vec![10, 20, 25]
    );
    assert_eq!(summary.rng_seed, 42);
    assert_eq!(summary.seeds.len(), 3);
    assert_eq!(summary.final_activator, sim.fields().activator().stats());
    assert_eq!(sim.state(), SimulationState::Finalized);

    let json = serde_json::to_string(&summary).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.samples.len(), 3);
    assert_eq!(back.seeds, summary.seeds);
}

#[test]
fn experiment_rejects_zero_sample_interval() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    assert!(matches!(
        sim.run_experiment(0),
        Err(SimulationError::InvalidParameter {
            name: "sample_every",
            ..
        })
    ));
}

#[test]
fn explicit_seed_outside_grid_is_rejected() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    let err = sim
        .seed_with(vec![SeedPatch {
            cx: 64,
            cy: 10,
            radius: 3,
        }])
        .unwrap_err();
    assert!(matches!(err, SimulationError::OutOfBounds { x: 64, .. }));
    assert_eq!(sim.state(), SimulationState::Uninitialized);
}

#[test]
fn explicit_seed_with_huge_radius_is_rejected() {
    let mut sim = Simulation::new(SimulationParameters {
        width: 16,
        height: 16,
        ..scenario_params()
    })
    .unwrap();
    let err = sim
        .seed_with(vec![SeedPatch {
            cx: 8,
            cy: 8,
            radius: 5_000_000_000,
        }])
        .unwrap_err();
    assert!(matches!(
        err,
        SimulationError::InvalidParameter { name: "radius", .. }
    ));
    assert_eq!(sim.state(), SimulationState::Uninitialized);
}

#[test]
fn experiment_after_manual_steps_is_rejected() {
    let mut sim = Simulation::new(scenario_params()).unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    sim.run(3).unwrap();
    assert_eq!(
        sim.run_experiment(10).unwrap_err(),
        SimulationError::InvalidState {
            operation: "run experiment",
            state: "stepping",
        }
    );
    assert_eq!(sim.steps_completed(), 3);
}

#[test]
fn experiment_after_zero_step_run_counts_from_start() {
    let mut sim = Simulation::new(SimulationParameters {
        iterations: 4,
        ..scenario_params()
    })
    .unwrap();
    sim.seed_with(vec![centre_seed()]).unwrap();
    sim.run(0).unwrap();
    let summary = sim.run_experiment(2).unwrap();
    assert_eq!(summary.steps, 4);
    assert_eq!(
        summary.samples.iter().map(|s| s.step).collect::<Vec<_>>(),
        vec![2, 4]
    );
}

#[test]
fn invalid_parameters_fail_construction() {
    assert!(matches!(
        Simulation::new(SimulationParameters {
            width: 0,
            ..scenario_params()
        }),
        Err(SimulationError::InvalidDimension { .. })
    ));
    assert!(matches!(
        Simulation::new(SimulationParameters {
            kill: -0.5,
            ..scenario_params()
        }),
        Err(SimulationError::InvalidParameter { name: "kill", .. })
    ));
}
