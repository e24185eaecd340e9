//! Run the Koramangala dispatch cycle for a few minutes of simulated time and
//! print the narrative stream plus resolved incidents.
//!
//! Run with: cargo run -p dispatch_core --example scenario_run
//! Verbose:  RUST_LOG=dispatch_core=debug cargo run -p dispatch_core --example scenario_run

use dispatch_core::scenario::EngineParams;
use dispatch_core::DispatchEngine;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    const CYCLES: u64 = 6;
    let params = EngineParams::default().with_seed(123);
    let cycle_ms = params.stage_dwell.cycle_ms();

    let mut engine = match DispatchEngine::new(params) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("engine failed to start: {err}");
            std::process::exit(1);
        }
    };

    let steps = engine.run_until(CYCLES * cycle_ms);

    println!("--- Dispatch run ({CYCLES} cycles, seed 123) ---");
    println!("Events processed: {steps}");
    println!("Simulation time: {:.1} s", engine.now() as f64 / 1000.0);
    println!();

    for entry in engine.narrative().entries() {
        println!(
            "[{:>7.1}s] {:<7} {}",
            entry.timestamp_ms as f64 / 1000.0,
            format!("{:?}", entry.severity),
            entry.message
        );
    }

    println!();
    let telemetry = engine.telemetry();
    println!(
        "Dispatches: {}  Resolved: {}  Unfilled: {}  Expired: {}",
        telemetry.dispatches,
        telemetry.resolved.len(),
        telemetry.unfilled,
        telemetry.expired
    );
    for record in &telemetry.resolved {
        println!(
            "  {}  {:<18} by {:<3}  dispatch after {:>5} ms  travel {:>5} ms  on scene {:>5} ms",
            record.incident_id,
            record.incident_kind.label(),
            record.responder_id,
            record.time_to_dispatch(),
            record.travel_time(),
            record.time_on_scene(),
        );
    }
}
