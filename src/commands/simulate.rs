//! Simulate command: run a session on an accelerated clock.
//!
//! The simulated clock is registered with the logger before anything is
//! printed, so every line carries the simulated time. The session starts
//! the light immediately and ends when the clock reaches the end instant.

use anyhow::{Result, bail};
use std::sync::Arc;

use crate::NightLightApp;
use crate::logger::{Log, LoggerGuard};
use crate::time::source::{SimulatedTimeSource, parse_datetime};

/// Options of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub start_time: String,
    pub end_time: String,
    /// Acceleration factor; 0.0 fast-forwards
    pub multiplier: f64,
    pub log_file: Option<String>,
    pub config_dir: Option<String>,
    pub debug_enabled: bool,
}

/// Handle the simulate command
pub fn handle_simulate_command(params: SimulationParams) -> Result<()> {
    let clock = Arc::new(build_clock(&params)?);

    // Before any logging so the first line is already stamped
    Log::set_simulation_clock(clock.clone());
    let _log_guard: Option<LoggerGuard> = match &params.log_file {
        Some(file) => Some(Log::start_file_logging(file.clone())?),
        None => None,
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        params.start_time,
        params.end_time
    );

    let duration = clock.total_duration();
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if params.multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward");
    } else {
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            params.multiplier,
            duration.num_seconds() as f64 / params.multiplier
        );
    }
    if let Some(file) = &params.log_file {
        log_indented!("Writing output to {}", file);
    }

    NightLightApp::new(params.debug_enabled)
        .with_config_dir(params.config_dir.clone())
        .with_clock(clock)
        .without_headers()
        .without_stdin()
        .run()
}

fn build_clock(params: &SimulationParams) -> Result<SimulatedTimeSource> {
    let start = parse_datetime(&params.start_time)?;
    let end = parse_datetime(&params.end_time)?;
    if end <= start {
        bail!("End time must be after start time");
    }
    Ok(SimulatedTimeSource::new(start, end, params.multiplier))
}

/// Display help for the simulate command
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run a session on an accelerated clock");
    log_block_start!(
        "Usage: nightlight simulate <start> <end> [multiplier | --fast-forward] [--log <file>]"
    );
    log_block_start!("Arguments:");
    log_indented!("start, end    \"YYYY-MM-DD HH:MM:SS\" in local time");
    log_indented!("multiplier    Simulated seconds per real second (0.1-3600, default 60)");
    log_block_start!("Options:");
    log_indented!("--fast-forward  Run the whole span as fast as possible");
    log_indented!("--log <file>    Write the session output to a file");
    log_block_start!("Examples:");
    log_indented!("nightlight simulate \"2025-01-15 05:00:00\" \"2025-01-15 08:00:00\" 600");
    log_indented!(
        "nightlight simulate \"2025-01-15 23:00:00\" \"2025-01-16 08:00:00\" --fast-forward"
    );
    log_end!();
}
