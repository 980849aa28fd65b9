//! Status command: show the schedule for the current moment.
//!
//! Runs the engine once against the persisted settings, as if the light
//! were switched on now, and prints the resulting phase, color and timing.
//! Nothing is written back to the store.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::common::constants::MAXIMUM_BRIGHTNESS;
use crate::core::engine::NightLight;
use crate::logger::Log;
use crate::settings::Settings;
use crate::state::timer::TimerInfo;
use crate::time::source::{RealTimeSource, TimeSource};

/// Everything `status` reports, flattened for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub timer: TimerInfo,
    pub status_message: String,
    pub time_remaining: String,
    pub next_wake: String,
    pub brightness_percent: u32,
    pub wake_time: String,
    pub wake_duration: u32,
}

/// Handle the status command.
///
/// # Arguments
/// * `config_dir` - Custom configuration directory, if any
/// * `json` - Output in JSON format
pub fn handle_status_command(config_dir: Option<&str>, json: bool) -> Result<()> {
    if json {
        Log::set_enabled(false);
    }

    let model = super::open_settings(config_dir)?;
    let report = build_report(model.settings(), Arc::new(RealTimeSource))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_human_readable(&report);
    }
    Ok(())
}

/// Start a throwaway engine on `clock` and capture its state.
pub fn build_report(settings: &Settings, clock: Arc<dyn TimeSource>) -> Result<StatusReport> {
    let mut engine = NightLight::new(clock);
    engine.start(&settings.wake_time, settings)?;

    let brightness = engine.current_brightness(settings) * MAXIMUM_BRIGHTNESS as f32;
    Ok(StatusReport {
        timer: engine.timer_info(),
        status_message: engine.status_message(),
        time_remaining: engine.format_time_remaining(),
        next_wake: engine.format_next_wake_time(),
        brightness_percent: brightness.round() as u32,
        wake_time: settings.wake_time.clone(),
        wake_duration: settings.wake_duration,
    })
}

fn display_human_readable(report: &StatusReport) {
    println!("        Status: {}", report.status_message);
    println!(
        " Current phase: {} {}",
        report.timer.current_phase.symbol(),
        report.timer.current_phase.display_name()
    );
    println!(
        "         Color: {} at {}%",
        report.timer.current_color, report.brightness_percent
    );
    println!("     Next wake: {}", report.next_wake);
    println!("Time remaining: {}", report.time_remaining);
    println!(
        "   Wake window: {} for {} minutes",
        report.wake_time, report.wake_duration
    );
}

/// Display help for the status command
pub fn display_help() {
    log_version!();
    log_block_start!("status - Show the schedule for the current moment");
    log_block_start!("Usage: nightlight status [--json]");
    log_block_start!("Description:");
    log_indented!("Shows the phase, color and brightness the light would have if it");
    log_indented!("were switched on now, and the time left until the next wake.");
    log_block_start!("Options:");
    log_indented!("--json     Output the report in JSON format");
    log_end!();
}
