use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use log::{info, warn, debug};

// Define modules used by main
mod export;
mod peak;
mod simulation;
mod state_space;
mod system;

use response_common::{ResponseConfig, RESPONSE_FILE};
use export::{build_response_data, report_peak};
use peak::{sampled_peak, PeakMetrics};
use simulation::ResponseSimulation;
use system::{DampingClass, SecondOrderSystem};

/// Optional overrides for the built-in system constants.
const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Step Response Engine...");
    run(Path::new("."), &mut io::stdout().lock())?;
    info!("Step Response Complete.");
    Ok(())
}

/// Runs the whole pipeline inside `work_dir`: reads the optional config,
/// writes the response file, then prints the peak report to `out`.
fn run<W: Write>(work_dir: &Path, out: &mut W) -> Result<PeakMetrics> {
    // --- Load Configuration ---
    let config = ResponseConfig::load_or_default(work_dir.join(CONFIG_PATH))?;
    let params = config.get_sim_params();
    debug!("Run parameters: {:#?}", params);

    // --- Build System ---
    let system = SecondOrderSystem::new(params.natural_frequency, params.damping_ratio)?;
    info!(
        "System: wn = {} rad/s, zeta = {} ({:?}), H(s) = {}",
        system.natural_frequency(),
        system.damping_ratio(),
        system.damping_class(),
        system.transfer_function()
    );
    if system.damping_class() == DampingClass::Undamped {
        warn!("Damping ratio is zero; the response oscillates without settling.");
    }

    // --- Step Response ---
    info!(
        "Simulating unit step over [0, {}] s with {} samples...",
        params.duration_s, params.num_samples
    );
    let start_time = Instant::now();
    let mut sim = ResponseSimulation::new(&system, &params)?;
    sim.run()?;
    let samples = sim.into_samples();
    info!(
        "Computed {} samples in {:.3} ms.",
        samples.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    // --- Peak Metrics ---
    let metrics = PeakMetrics::closed_form(&system);
    debug!("Peak metrics: {:?} ({:.2}% overshoot)", metrics, metrics.percent_overshoot());
    if let Some(peak) = sampled_peak(&samples) {
        debug!(
            "Largest sample: y = {:.6} at t = {:.4} s (closed form: {:.6} at {:.4} s)",
            peak.amplitude, peak.time, metrics.peak_value, metrics.peak_time
        );
    }

    // --- Save Response Data ---
    let data = build_response_data(&samples, &metrics);
    let output_path = work_dir.join(RESPONSE_FILE);
    let bytes = data.save(&output_path)?;
    info!("Response saved to {} ({} points, {} KB)", output_path.display(), data.points.len(), bytes / 1024);

    report_peak(&metrics, out)?;
    Ok(metrics)
}
