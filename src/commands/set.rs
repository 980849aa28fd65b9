//! Set command: update persisted settings fields.
//!
//! Every `field=value` pair is validated before anything is written, so a
//! single bad value leaves the stored settings untouched.

use anyhow::{Context, Result};
use serde_json::Value;

use super::{SettingsField, open_settings};
use crate::settings::SettingsModel;

/// Handle the set command - update settings fields
pub fn handle_set_command(config_dir: Option<&str>, fields: &[(String, String)]) -> Result<()> {
    log_version!();

    let mut model = open_settings(config_dir)?;
    let changes = match apply_fields(&mut model, fields) {
        Ok(changes) => changes,
        Err(e) => {
            log_pipe!();
            log_error!("{:#}", e);
            anyhow::bail!("Settings validation failed, nothing was changed");
        }
    };

    if changes.is_empty() {
        log_block_start!("Settings unchanged");
        log_indented!("All fields already have the specified values");
    } else {
        log_block_start!("Updated settings");
        for (field, before, after) in &changes {
            log_indented!("{}: {} → {}", field, before, after);
        }
        log_block_start!("Send SIGUSR2 to a running session to apply them");
    }

    log_end!();
    Ok(())
}

/// Validate all pairs, then push the changed fields through the model.
///
/// Returns `(field, old value, new value)` for every field that changed.
pub(crate) fn apply_fields(
    model: &mut SettingsModel,
    fields: &[(String, String)],
) -> Result<Vec<(SettingsField, Value, Value)>> {
    let current = model.settings().clone();
    let mut candidate = current.clone();
    let mut touched: Vec<SettingsField> = Vec::new();

    for (name, raw) in fields {
        let field: SettingsField = name.parse()?;
        field
            .assign(&mut candidate, raw)
            .with_context(|| format!("Invalid value for {field}"))?;
        if !touched.contains(&field) {
            touched.push(field);
        }
    }

    let mut changes = Vec::new();
    for field in touched {
        let before = field.value_of(&current);
        let after = field.value_of(&candidate);
        if before != after && field.commit(model, &candidate) {
            changes.push((field, before, after));
        }
    }

    Ok(changes)
}

/// Display help for the set command
pub fn display_help() {
    log_version!();
    log_block_start!("set - Update settings fields");
    log_block_start!("Usage: nightlight set <field>=<value> [<field>=<value>...]");
    log_block_start!("Fields:");
    log_indented!("wake_time=HH:MM           24-hour wake time");
    log_indented!("wake_duration=1-60        Length of the wake phase in minutes");
    log_indented!("brightness.<color>=0-100  Brightness of white, blue or pink");
    log_indented!("sound_enabled=true|false  Sound preference for the host");
    log_block_start!("Examples:");
    log_indented!("nightlight set wake_time=07:15");
    log_indented!("nightlight set wake_duration=45 brightness.blue=50");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::SETTINGS_STORE_KEY;
    use crate::io::store::MockKeyValueStore;
    use crate::light::LightColor;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_apply_fields_writes_each_change() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, _| key == SETTINGS_STORE_KEY)
            .times(2)
            .returning(|_, _| Ok(()));
        let mut model = SettingsModel::new(Box::new(store));

        let changes = apply_fields(
            &mut model,
            &pairs(&[
                ("wake_time", "07:15"),
                ("wake_duration", "30"),
                ("brightness.blue", "50"),
            ]),
        )
        .unwrap();

        // wake_duration already 30
        assert_eq!(changes.len(), 2);
        assert_eq!(model.settings().wake_time, "07:15");
        assert_eq!(model.settings().brightness.get(LightColor::Blue), 50);
    }

    #[test]
    fn test_one_bad_value_changes_nothing() {
        let mut store = MockKeyValueStore::new();
        store.expect_set().times(0);
        let mut model = SettingsModel::new(Box::new(store));

        let result = apply_fields(
            &mut model,
            &pairs(&[("wake_time", "07:15"), ("brightness.pink", "150")]),
        );

        assert!(result.is_err());
        assert_eq!(model.settings().wake_time, "06:30");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut model = SettingsModel::detached();
        assert!(apply_fields(&mut model, &pairs(&[("volume", "3")])).is_err());
    }

    #[test]
    fn test_repeated_field_uses_last_value() {
        let mut model = SettingsModel::detached();
        let changes = apply_fields(
            &mut model,
            &pairs(&[("wake_duration", "10"), ("wake_duration", "20")]),
        )
        .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(model.settings().wake_duration, 20);
    }
}
