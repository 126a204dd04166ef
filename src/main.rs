use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use green_wave_sim::{
    config::SimulationConfig,
    engine::{EmergencyPhase, EventLevel, SimulationEngine},
    scenario::ScenarioDirector,
    simulation::{LightState, PerformanceTracker, StateSnapshot},
};

#[derive(Parser)]
#[command(name = "green-wave-sim")]
#[command(about = "Grid city traffic simulation with emergency-vehicle signal preemption")]
struct Args {
    /// Simulation configuration file
    #[arg(short, long, default_value = "greenwave.toml")]
    config: String,

    /// Random seed for reproducible simulations
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Trigger the emergency manually at this tick instead of the random auto trigger
    #[arg(short, long)]
    manual_trigger_at: Option<u64>,

    /// Sleep for the configured tick interval between steps
    #[arg(short, long)]
    realtime: bool,

    /// Write the final state snapshot to this TOML file
    #[arg(long)]
    dump_snapshot: Option<String>,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting Green Wave Simulator (Console Mode)");

    let mut config = SimulationConfig::load_from_file(&args.config)?;
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    info!(
        "Loaded configuration: {}x{} grid, {} civilians, {} delivery bots, {}ms ticks",
        config.city.grid_size,
        config.city.grid_size,
        config.fleet.civilian_count,
        config.fleet.delivery_bot_count,
        config.simulation.tick_interval_ms
    );

    let tick_interval = Duration::from_millis(config.simulation.tick_interval_ms);
    let mut scheduler_rng = match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let mut director = ScenarioDirector::new(&config);
    let mut engine = SimulationEngine::new(config)?;
    let mut performance_tracker = PerformanceTracker::new(120);

    if args.manual_trigger_at.is_none() {
        if let Some(fire_at) = director.arm(&engine, &mut scheduler_rng) {
            info!("Emergency Scenario Scheduler: trigger set for tick {}", fire_at);
        }
    }

    let mut last_phase = engine.phase();
    let mut snapshot = engine.get_state();

    for _ in 0..args.ticks {
        performance_tracker.start_step();
        snapshot = engine.step();
        performance_tracker.end_step();

        if args.manual_trigger_at == Some(engine.tick_count()) {
            director.trigger_now(&mut engine)?;
        }
        director.advance(&mut engine)?;

        for event in engine.drain_events() {
            match event.level {
                EventLevel::Warning => warn!("{}", event),
                _ => info!("{}", event),
            }
        }

        if engine.phase() != last_phase {
            info!("Phase {} -> {} at tick {}", last_phase, engine.phase(), engine.tick_count());
            last_phase = engine.phase();
        }

        if engine.tick_count() % 100 == 0 {
            report(&snapshot, &performance_tracker);
        }

        if args.realtime {
            std::thread::sleep(tick_interval);
        }
    }

    info!("Simulation completed after {} ticks", engine.tick_count());
    report(&snapshot, &performance_tracker);
    if engine.phase() == EmergencyPhase::Resolved {
        info!("Emergency resolved, ambulance parked");
    }

    if let Some(path) = &args.dump_snapshot {
        let content = toml::to_string_pretty(&snapshot).context("failed to serialize snapshot")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write snapshot to {}", path))?;
        info!("Final snapshot written to {}", path);
    }

    Ok(())
}

fn report(snapshot: &StateSnapshot, performance_tracker: &PerformanceTracker) {
    info!(
        "Tick {}: phase {}, {} vehicles ({} held), lights green {} / warned {}, step avg {:.3}ms max {:.3}ms",
        snapshot.tick_count,
        snapshot.phase,
        snapshot.vehicles.len(),
        snapshot.stopped_vehicles(),
        snapshot.count_lights(LightState::GreenWave),
        snapshot.count_lights(LightState::PreemptionHighlight),
        performance_tracker.average_step_time().as_secs_f64() * 1000.0,
        performance_tracker.max_step_time().as_secs_f64() * 1000.0
    );
}
