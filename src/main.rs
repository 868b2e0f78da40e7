use anyhow::Result;
use log::{debug, error, info};
use msd_common::{EnsembleSeries, RunSummary, SimulationConfig};
use msd_engine::fit::{fit_power_law, FitOptions, ZeroHandling};
use msd_engine::particle::Particle;
use msd_engine::simulation::EnsembleSimulation;
use msd_engine::stats;
use std::fs::File;
use std::time::Instant;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Brownian MSD engine...");

    // --- Load Configuration ---
    let config = SimulationConfig::load("config.toml")?;
    let params = config.to_run_params();

    info!("Using {} Rayon threads.", rayon::current_num_threads());
    debug!("Run parameters: {:#?}", params);

    if (params.total_time / params.dt).fract() != 0.0 {
        info!(
            "total_time is not a whole number of steps; truncating to {} steps.",
            params.steps_count
        );
    }

    // --- Run Simulation ---
    let mut sim = EnsembleSimulation::new(params.clone())?;
    info!(
        "Stepping {} particles for {} steps (dt = {})...",
        params.num_particles, params.steps_count, params.dt
    );

    let start_time = Instant::now();
    let progress_stride = (params.num_particles / 10).max(1);
    sim.run_with_observer(Some(&|done, total| {
        if done % progress_stride == 0 || done == total {
            info!("{} out of {} particles calculated", done, total);
        }
    }));
    info!(
        "Simulation finished in {:.3} seconds.",
        start_time.elapsed().as_secs_f64()
    );

    // --- Aggregate Statistics ---
    let series = stats::aggregate(&sim)?;

    // --- Fit Power Law ---
    let options = FitOptions {
        already_log_space: config.sampling.fit_in_log_space,
        zero_handling: if config.sampling.exclude_zero_samples {
            ZeroHandling::Exclude
        } else {
            ZeroHandling::SubstituteOrigin
        },
    };
    let fit = fit_power_law(&series.msd, &series.time, options)?;
    info!("Power-law fit: A = {}, n = {}", fit.amplitude, fit.exponent);

    // --- Save Recorded Data ---
    if config.output.save_series {
        let filename = format!("{}_series.csv", config.output.base_filename);
        if let Err(e) = save_series_csv(&filename, &series) {
            error!("Error saving series CSV '{}': {}", filename, e);
        } else {
            info!("MSD series saved to {}", filename);
        }

        let summary = RunSummary {
            params: params.clone(),
            series: series.clone(),
            fit,
        };
        save_summary(&config, &summary);
    } else {
        info!("Skipping series export as per config (save_series is false).");
    }

    if config.output.save_trajectories {
        let count = (config.output.trajectory_count as usize).min(sim.particles().len());
        let filename = format!("{}_trajectories.csv", config.output.base_filename);
        if let Err(e) = save_trajectories_csv(&filename, &series.time, &sim.particles()[..count]) {
            error!("Error saving trajectory CSV '{}': {}", filename, e);
        } else {
            info!("First {} trajectories saved to {}", count, filename);
        }
    } else {
        info!("Skipping trajectory export as per config.");
    }

    info!("Run complete.");
    Ok(())
}

/// Writes the aligned time/MSD/error series as CSV columns.
fn save_series_csv(path: &str, series: &EnsembleSeries) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time", "msd", "error"])?;
    for k in 0..series.time.len() {
        writer.write_record(&[
            format!("{:.9e}", series.time[k]),
            format!("{:.9e}", series.msd[k]),
            format!("{:.9e}", series.error[k]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the sample trajectories side by side, one step per row.
fn save_trajectories_csv(path: &str, time: &[f64], particles: &[Particle]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["step".to_string(), "time".to_string()];
    for i in 0..particles.len() {
        header.push(format!("x{}", i));
        header.push(format!("y{}", i));
    }
    writer.write_record(&header)?;

    for (k, t) in time.iter().enumerate() {
        let mut record = vec![k.to_string(), format!("{:.9e}", t)];
        for particle in particles {
            let pos = particle.position_at(k)?;
            record.push(format!("{:.9e}", pos.x));
            record.push(format!("{:.9e}", pos.y));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the run summary in the configured format.
fn save_summary(config: &SimulationConfig, summary: &RunSummary) {
    let output_format = config.output.format.as_deref().unwrap_or("json");
    let base = &config.output.base_filename;

    match output_format {
        "bincode" => {
            // Binary format (compact)
            let filename = format!("{}_summary.bin", base);
            match File::create(&filename) {
                Ok(file) => match bincode::serialize_into(file, summary) {
                    Ok(_) => info!("Summary saved to {} (binary format)", filename),
                    Err(e) => error!("Error serializing summary to bincode: {}", e),
                },
                Err(e) => error!("Error creating summary file '{}': {}", filename, e),
            }
        }
        "messagepack" => {
            // MessagePack format (compact and cross-platform)
            let filename = format!("{}_summary.msgpack", base);
            match File::create(&filename) {
                Ok(mut file) => match rmp_serde::encode::write(&mut file, summary) {
                    Ok(_) => info!("Summary saved to {} (MessagePack format)", filename),
                    Err(e) => error!("Error serializing summary to MessagePack: {}", e),
                },
                Err(e) => error!("Error creating summary file '{}': {}", filename, e),
            }
        }
        other => {
            if other != "json" {
                error!("Unknown output format: {}. Using JSON instead.", other);
            }
            let filename = format!("{}_summary.json", base);
            match File::create(&filename) {
                Ok(file) => match serde_json::to_writer(file, summary) {
                    Ok(_) => info!("Summary saved to {}", filename),
                    Err(e) => error!("Error serializing summary to JSON: {}", e),
                },
                Err(e) => error!("Error creating summary file '{}': {}", filename, e),
            }
        }
    }
}
