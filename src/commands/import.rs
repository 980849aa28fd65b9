//! Import command: replace the settings with an exported JSON file.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use super::open_settings;
use crate::common::utils::private_path;
use crate::settings::SettingsModel;

/// Handle the import command
pub fn handle_import_command(config_dir: Option<&str>, file: &str) -> Result<()> {
    log_version!();

    let mut model = open_settings(config_dir)?;
    import_file(&mut model, Path::new(file))?;

    log_block_start!("Settings imported from {}", private_path(Path::new(file)));
    model.settings().log_summary();
    log_end!();
    Ok(())
}

pub(crate) fn import_file(model: &mut SettingsModel, path: &Path) -> Result<()> {
    let payload = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", private_path(path)))?;
    if !model.import_settings(&payload) {
        bail!("{} is not a valid settings export", private_path(path));
    }
    Ok(())
}

/// Display help for the import command
pub fn display_help() {
    log_version!();
    log_block_start!("import - Replace the settings from a JSON file");
    log_block_start!("Usage: nightlight import <FILE>");
    log_block_start!("Description:");
    log_indented!("The file must hold a settings object as written by 'export'.");
    log_indented!("Missing fields take their default; invalid files change nothing.");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::export::write_export;
    use crate::light::LightColor;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_export_then_import_file() {
        crate::logger::Log::set_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let mut source = SettingsModel::detached();
        source.update_wake_time("05:45");
        source.update_brightness(LightColor::White, 10);
        write_export(&source.export_settings(), &path).unwrap();

        let mut target = SettingsModel::detached();
        import_file(&mut target, &path).unwrap();
        assert_eq!(target.settings(), source.settings());
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    #[serial]
    fn test_invalid_file_changes_nothing() {
        crate::logger::Log::set_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        let mut model = SettingsModel::detached();
        assert!(import_file(&mut model, &path).is_err());
        assert!(import_file(&mut model, &dir.path().join("missing.json")).is_err());
        assert_eq!(model.settings(), &crate::settings::Settings::default());
        crate::logger::Log::set_enabled(true);
    }
}
