use gray_scott_core::{
    ExecutionMode, SeedInitializer, SeedPatch, Simulation, SimulationParameters,
};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::{Duration, Instant};

fn create_patches(params: &SimulationParameters) -> anyhow::Result<Vec<SeedPatch>> {
    let mut rng = ChaCha12Rng::seed_from_u64(params.rng_seed.unwrap_or(42));
    Ok(SeedInitializer::new(params)?.plan(&mut rng))
}

fn time_steps(params: SimulationParameters, steps: usize) -> anyhow::Result<(Duration, u64)> {
    let patches = create_patches(&params)?;
    let mut sim = Simulation::new(params)?;
    sim.seed_with(patches)?;
    let mut laplacian_us = 0;
    let start = Instant::now();
    for _ in 0..steps {
        laplacian_us += sim.step()?.laplacian_us;
    }
    Ok((start.elapsed(), laplacian_us))
}

fn main() -> anyhow::Result<()> {
    let base = SimulationParameters {
        width: 1080,
        height: 1080,
        log_every: 0,
        ..SimulationParameters::default()
    };
    let steps = 50;
    println!(
        "Benchmarking {} steps on a {}x{} grid",
        steps, base.width, base.height
    );

    let (seq, seq_lap) = time_steps(
        SimulationParameters {
            execution: ExecutionMode::Sequential,
            ..base.clone()
        },
        steps,
    )?;
    println!("Sequential: {:?} total, {:?} per step", seq, seq / steps as u32);
    println!("  laplacian share: {} us", seq_lap);

    let (par, par_lap) = time_steps(
        SimulationParameters {
            execution: ExecutionMode::Parallel,
            ..base
        },
        steps,
    )?;
    println!("Parallel:   {:?} total, {:?} per step", par, par / steps as u32);
    println!("  laplacian share: {} us", par_lap);

    if !par.is_zero() {
        println!("Speedup: {:.2}x", seq.as_secs_f64() / par.as_secs_f64());
    }
    Ok(())
}
