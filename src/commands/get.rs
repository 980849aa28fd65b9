//! Get command: read settings fields.
//!
//! Plain output prints one `field = value` line per field, JSON output a
//! single object keyed by field name. Both go to stdout without the log
//! diagram so scripts can consume them.

use anyhow::Result;
use serde_json::{Map, Value};

use super::{SettingsField, open_settings};
use crate::logger::Log;
use crate::settings::Settings;

/// Handle the get command.
///
/// # Arguments
/// * `config_dir` - Custom configuration directory, if any
/// * `fields` - Field names to print; all fields when empty
/// * `json` - Whether to print a JSON object instead of plain lines
pub fn handle_get_command(config_dir: Option<&str>, fields: &[String], json: bool) -> Result<()> {
    // Keep stdout clean for scripts
    Log::set_enabled(false);

    let requested = resolve_fields(fields)?;
    let model = open_settings(config_dir)?;
    let values = collect_values(model.settings(), &requested);

    if json {
        println!("{}", serde_json::to_string_pretty(&Value::Object(values))?);
    } else {
        for (name, value) in values {
            match value {
                Value::String(text) => println!("{name} = {text}"),
                other => println!("{name} = {other}"),
            }
        }
    }

    Ok(())
}

fn resolve_fields(fields: &[String]) -> Result<Vec<SettingsField>> {
    if fields.is_empty() {
        return Ok(SettingsField::ALL.to_vec());
    }
    fields.iter().map(|name| name.parse::<SettingsField>()).collect()
}

fn collect_values(settings: &Settings, fields: &[SettingsField]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| (field.to_string(), field.value_of(settings)))
        .collect()
}

/// Display help for the get command
pub fn display_help() {
    log_version!();
    log_block_start!("get - Read settings fields");
    log_block_start!("Usage: nightlight get [--json] [<field>...]");
    log_block_start!("Fields:");
    log_indented!("wake_time, wake_duration, sound_enabled");
    log_indented!("brightness.white, brightness.blue, brightness.pink");
    log_indented!("Without fields, every field is printed");
    log_block_start!("Examples:");
    log_indented!("nightlight get wake_time");
    log_indented!("nightlight get --json brightness.blue brightness.pink");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightColor;
    use serde_json::json;

    #[test]
    fn test_resolve_fields() {
        assert_eq!(resolve_fields(&[]).unwrap().len(), SettingsField::ALL.len());
        assert_eq!(
            resolve_fields(&["brightness.pink".to_string()]).unwrap(),
            vec![SettingsField::Brightness(LightColor::Pink)]
        );
        assert!(resolve_fields(&["night_temp".to_string()]).is_err());
    }

    #[test]
    fn test_collect_values_by_name() {
        let values = collect_values(
            &Settings::default(),
            &[SettingsField::WakeDuration, SettingsField::WakeTime],
        );
        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, vec!["wake_duration", "wake_time"]);
        assert_eq!(values["wake_duration"], json!(30));
    }
}
