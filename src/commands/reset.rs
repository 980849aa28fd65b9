//! Reset command: restore the default settings.

use anyhow::Result;

use super::open_settings;

/// Handle the reset command
pub fn handle_reset_command(config_dir: Option<&str>) -> Result<()> {
    log_version!();

    let mut model = open_settings(config_dir)?;
    model.reset_settings();

    log_block_start!("Settings reset to defaults");
    model.settings().log_summary();
    log_end!();
    Ok(())
}

/// Display help for the reset command
pub fn display_help() {
    log_version!();
    log_block_start!("reset - Restore the default settings");
    log_block_start!("Usage: nightlight reset");
    log_block_start!("Defaults:");
    crate::settings::Settings::default().log_summary();
    log_end!();
}
