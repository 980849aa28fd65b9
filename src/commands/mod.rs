//! One-shot command handlers.
//!
//! Each command lives in its own submodule and works on the persisted
//! settings directly. A running session picks up changes on SIGUSR2.

pub mod export;
pub mod get;
pub mod help;
pub mod import;
pub mod reset;
pub mod set;
pub mod simulate;
pub mod status;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::utils::private_path;
use crate::io::store::FileStore;
use crate::light::LightColor;
use crate::settings::{
    Settings, SettingsModel, is_valid_brightness, is_valid_duration, is_valid_wake_time,
};

/// Open the settings persisted in `config_dir` (or the default directory).
pub(crate) fn open_settings(config_dir: Option<&str>) -> Result<SettingsModel> {
    let store = FileStore::in_config_dir(config_dir.map(Path::new))?;
    if !store.path().exists() {
        log_pipe!();
        log_info!(
            "No settings stored at {} yet, using defaults",
            private_path(store.path())
        );
    }
    Ok(SettingsModel::open(Box::new(store)))
}

/// A settings field addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    WakeTime,
    WakeDuration,
    Brightness(LightColor),
    SoundEnabled,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        SettingsField::WakeTime,
        SettingsField::WakeDuration,
        SettingsField::Brightness(LightColor::White),
        SettingsField::Brightness(LightColor::Blue),
        SettingsField::Brightness(LightColor::Pink),
        SettingsField::SoundEnabled,
    ];

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(ToString::to_string).collect()
    }

    /// Current value of this field as JSON.
    pub fn value_of(&self, settings: &Settings) -> Value {
        match self {
            Self::WakeTime => json!(settings.wake_time),
            Self::WakeDuration => json!(settings.wake_duration),
            Self::Brightness(color) => json!(settings.brightness.get(*color)),
            Self::SoundEnabled => json!(settings.sound_enabled),
        }
    }

    /// Parse `raw` and write it into `settings`, rejecting invalid values.
    pub fn assign(&self, settings: &mut Settings, raw: &str) -> Result<()> {
        match self {
            Self::WakeTime => {
                if !is_valid_wake_time(raw) {
                    bail!("'{raw}' is not a wake time (expected HH:MM, 24-hour)");
                }
                settings.wake_time = raw.to_string();
            }
            Self::WakeDuration => {
                let minutes: u32 = raw
                    .parse()
                    .with_context(|| format!("'{raw}' is not a number of minutes"))?;
                if !is_valid_duration(minutes) {
                    bail!("{minutes} minutes is outside 1-60");
                }
                settings.wake_duration = minutes;
            }
            Self::Brightness(color) => {
                let percent: u32 = raw
                    .parse()
                    .with_context(|| format!("'{raw}' is not a percentage"))?;
                if !is_valid_brightness(percent) {
                    bail!("{percent}% is outside 0-100");
                }
                settings.brightness.set(*color, percent);
            }
            Self::SoundEnabled => {
                settings.sound_enabled = match raw.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => bail!("'{raw}' is not true or false"),
                };
            }
        }
        Ok(())
    }

    /// Push this field's value from `settings` through the model's update.
    pub fn commit(&self, model: &mut SettingsModel, settings: &Settings) -> bool {
        match self {
            Self::WakeTime => model.update_wake_time(&settings.wake_time),
            Self::WakeDuration => model.update_wake_duration(settings.wake_duration),
            Self::Brightness(color) => {
                model.update_brightness(*color, settings.brightness.get(*color))
            }
            Self::SoundEnabled => model.update_sound_enabled(settings.sound_enabled),
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WakeTime => f.write_str("wake_time"),
            Self::WakeDuration => f.write_str("wake_duration"),
            Self::Brightness(color) => write!(f, "brightness.{color}"),
            Self::SoundEnabled => f.write_str("sound_enabled"),
        }
    }
}

impl FromStr for SettingsField {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "wake_time" => Ok(Self::WakeTime),
            "wake_duration" => Ok(Self::WakeDuration),
            "sound_enabled" => Ok(Self::SoundEnabled),
            other => match other.strip_prefix("brightness.") {
                Some(color) => Ok(Self::Brightness(color.parse()?)),
                None => bail!(
                    "Unknown settings field '{other}'. Available: {}",
                    Self::names().join(", ")
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip() {
        for field in SettingsField::ALL {
            assert_eq!(field.to_string().parse::<SettingsField>().unwrap(), field);
        }
        assert!("brightness.green".parse::<SettingsField>().is_err());
        assert!("wakeTime".parse::<SettingsField>().is_err());
    }

    #[test]
    fn test_assign_validates() {
        let mut settings = Settings::default();

        SettingsField::WakeTime.assign(&mut settings, "07:15").unwrap();
        SettingsField::Brightness(LightColor::Pink)
            .assign(&mut settings, "15")
            .unwrap();
        SettingsField::SoundEnabled.assign(&mut settings, "on").unwrap();
        assert_eq!(settings.wake_time, "07:15");
        assert_eq!(settings.brightness.pink, 15);
        assert!(settings.sound_enabled);

        assert!(SettingsField::WakeTime.assign(&mut settings, "7:5").is_err());
        assert!(SettingsField::WakeDuration.assign(&mut settings, "0").is_err());
        assert!(SettingsField::WakeDuration.assign(&mut settings, "ten").is_err());
        assert!(
            SettingsField::Brightness(LightColor::White)
                .assign(&mut settings, "101")
                .is_err()
        );
        assert_eq!(settings.wake_duration, 30);
        assert_eq!(settings.brightness.white, 80);
    }

    #[test]
    fn test_value_of() {
        let settings = Settings::default();
        assert_eq!(SettingsField::WakeTime.value_of(&settings), json!("06:30"));
        assert_eq!(
            SettingsField::Brightness(LightColor::Blue).value_of(&settings),
            json!(70)
        );
        assert_eq!(SettingsField::SoundEnabled.value_of(&settings), json!(false));
    }
}
