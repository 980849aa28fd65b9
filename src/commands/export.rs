//! Export command: write the settings as JSON.
//!
//! Without a file the JSON goes to stdout, so it can be piped elsewhere.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::open_settings;
use crate::common::utils::private_path;
use crate::logger::Log;

/// Handle the export command
pub fn handle_export_command(config_dir: Option<&str>, file: Option<&str>) -> Result<()> {
    let Some(file) = file else {
        Log::set_enabled(false);
        let model = open_settings(config_dir)?;
        println!("{}", model.export_settings());
        return Ok(());
    };

    log_version!();
    let model = open_settings(config_dir)?;
    write_export(&model.export_settings(), Path::new(file))?;

    log_block_start!("Settings exported to {}", private_path(Path::new(file)));
    log_end!();
    Ok(())
}

pub(crate) fn write_export(payload: &str, path: &Path) -> Result<()> {
    fs::write(path, format!("{payload}\n"))
        .with_context(|| format!("Failed to write {}", private_path(path)))
}

/// Display help for the export command
pub fn display_help() {
    log_version!();
    log_block_start!("export - Write the settings as JSON");
    log_block_start!("Usage: nightlight export [FILE]");
    log_block_start!("Arguments:");
    log_indented!("FILE  Destination file; stdout when omitted");
    log_block_start!("Examples:");
    log_indented!("nightlight export backup.json");
    log_indented!("nightlight export > backup.json");
    log_end!();
}
