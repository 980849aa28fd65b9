//! User settings for the night light: wake schedule and brightness levels.
//!
//! The [`SettingsModel`] owns the single validated [`Settings`] value. Every
//! accepted mutation is written to the key-value store immediately and
//! announced on the model's event bus; rejected mutations change nothing.
//!
//! ## Serialized form
//!
//! Settings are stored and exported as JSON with camelCase field names:
//!
//! ```json
//! {
//!   "wakeTime": "06:30",
//!   "wakeDuration": 30,
//!   "brightness": { "white": 80, "blue": 70, "pink": 60 },
//!   "soundEnabled": false
//! }
//! ```
//!
//! Payloads are merged over the defaults, so fields missing from older
//! payloads keep their default value and unknown fields are ignored.

pub mod validation;


use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

use crate::common::constants::*;
use crate::io::store::KeyValueStore;
use crate::light::LightColor;
use crate::state::events::{EventBus, NightLightEvent};

pub use validation::{
    is_valid_brightness, is_valid_duration, is_valid_wake_time, parse_wake_time,
    validate_settings,
};

/// Brightness percentage for each light color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessLevels {
    pub white: u32,
    pub blue: u32,
    pub pink: u32,
}

impl Default for BrightnessLevels {
    fn default() -> Self {
        Self {
            white: DEFAULT_WHITE_BRIGHTNESS,
            blue: DEFAULT_BLUE_BRIGHTNESS,
            pink: DEFAULT_PINK_BRIGHTNESS,
        }
    }
}

impl BrightnessLevels {
    pub fn get(&self, color: LightColor) -> u32 {
        match color {
            LightColor::White => self.white,
            LightColor::Blue => self.blue,
            LightColor::Pink => self.pink,
        }
    }

    pub(crate) fn set(&mut self, color: LightColor, percent: u32) {
        match color {
            LightColor::White => self.white = percent,
            LightColor::Blue => self.blue = percent,
            LightColor::Pink => self.pink = percent,
        }
    }
}

/// The user's wake schedule and light preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Wake time of day, `HH:MM` 24-hour
    pub wake_time: String,
    /// Length of the wake phase in minutes (1-60)
    pub wake_duration: u32,
    /// Brightness percentage (0-100) per color
    pub brightness: BrightnessLevels,
    /// Carried for the host; the schedule ignores it
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wake_time: DEFAULT_WAKE_TIME.to_string(),
            wake_duration: DEFAULT_WAKE_DURATION,
            brightness: BrightnessLevels::default(),
            sound_enabled: DEFAULT_SOUND_ENABLED,
        }
    }
}

impl Settings {
    /// Parse a serialized payload, merge it over the defaults and validate it.
    ///
    /// Fails for malformed JSON, for anything other than a JSON object, for
    /// fields of the wrong type, and for out-of-range values.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(payload).context("Settings payload is not valid JSON")?;

        if !value.is_object() {
            anyhow::bail!("Settings payload must be a JSON object");
        }

        let settings: Settings =
            serde_json::from_value(value).context("Settings payload has a field of the wrong type")?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Wake time as a time of day.
    pub fn wake_time_of_day(&self) -> NaiveTime {
        parse_wake_time(&self.wake_time)
            .or_else(|_| parse_wake_time(DEFAULT_WAKE_TIME))
            .unwrap_or(NaiveTime::MIN)
    }

    /// Brightness of `color` as a fraction in [0, 1].
    pub fn brightness_fraction(&self, color: LightColor) -> f32 {
        self.brightness.get(color) as f32 / 100.0
    }

    /// Log the settings as an indented block.
    pub fn log_summary(&self) {
        log_indented!("Wake time: {}", self.wake_time);
        log_indented!("Wake duration: {} minutes", self.wake_duration);
        log_indented!(
            "Brightness: white {}%, blue {}%, pink {}%",
            self.brightness.white,
            self.brightness.blue,
            self.brightness.pink
        );
        log_indented!(
            "Sound: {}",
            if self.sound_enabled { "on" } else { "off" }
        );
    }
}

/// Owner of the single settings value.
///
/// Built without a store (see [`SettingsModel::detached`]) the model still
/// validates and applies updates, but loading and saving do nothing.
pub struct SettingsModel {
    settings: Settings,
    store: Option<Box<dyn KeyValueStore>>,
    events: EventBus,
}

impl SettingsModel {
    /// Model with default settings backed by `store`. Nothing is read yet.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            settings: Settings::default(),
            store: Some(store),
            events: EventBus::new(),
        }
    }

    /// Model backed by `store`, initialized from its persisted payload.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut model = Self::new(store);
        model.load();
        model
    }

    /// Model without persistence.
    pub fn detached() -> Self {
        Self {
            settings: Settings::default(),
            store: None,
            events: EventBus::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Receive a `SettingsChanged` event for every accepted change.
    pub fn subscribe(&mut self) -> Receiver<NightLightEvent> {
        self.events.subscribe()
    }

    /// Replace the current settings with the persisted payload, if there is
    /// a valid one. Failures are logged and leave the settings untouched.
    pub fn load(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let stored = match store.get(SETTINGS_STORE_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to read stored settings: {:#}", e);
                return;
            }
        };

        match Settings::from_payload(&stored) {
            Ok(settings) => {
                if settings != self.settings {
                    self.settings = settings;
                    self.announce();
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to parse stored settings: {:#}", e);
                log_indented!("Keeping current settings");
            }
        }
    }

    /// Write the current settings to the store. Failures are logged.
    pub fn save(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };

        let result = serde_json::to_string(&self.settings)
            .context("Failed to serialize settings")
            .and_then(|payload| store.set(SETTINGS_STORE_KEY, &payload));

        if let Err(e) = result {
            log_pipe!();
            log_warning!("Failed to save settings: {:#}", e);
        }
    }

    pub fn update_wake_time(&mut self, time: &str) -> bool {
        if !is_valid_wake_time(time) {
            return false;
        }
        self.settings.wake_time = time.to_string();
        self.commit();
        true
    }

    pub fn update_wake_duration(&mut self, minutes: u32) -> bool {
        if !is_valid_duration(minutes) {
            return false;
        }
        self.settings.wake_duration = minutes;
        self.commit();
        true
    }

    pub fn update_brightness(&mut self, color: LightColor, percent: u32) -> bool {
        if !is_valid_brightness(percent) {
            return false;
        }
        self.settings.brightness.set(color, percent);
        self.commit();
        true
    }

    pub fn update_sound_enabled(&mut self, enabled: bool) -> bool {
        self.settings.sound_enabled = enabled;
        self.commit();
        true
    }

    /// Restore the defaults and persist them.
    pub fn reset_settings(&mut self) {
        self.settings = Settings::default();
        self.commit();
    }

    /// Pretty-printed JSON of the current settings, for backups.
    pub fn export_settings(&self) -> String {
        // Plain strings, integers and booleans always serialize
        serde_json::to_string_pretty(&self.settings).unwrap_or_default()
    }

    /// Replace the settings with an exported payload.
    ///
    /// Returns `false` and changes nothing when the payload is not a valid
    /// settings object.
    pub fn import_settings(&mut self, payload: &str) -> bool {
        match Settings::from_payload(payload) {
            Ok(settings) => {
                self.settings = settings;
                self.commit();
                true
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to import settings: {:#}", e);
                false
            }
        }
    }

    pub fn wake_time_hour(&self) -> u32 {
        self.settings.wake_time_of_day().hour()
    }

    pub fn wake_time_minute(&self) -> u32 {
        self.settings.wake_time_of_day().minute()
    }

    fn commit(&mut self) {
        self.save();
        self.announce();
    }

    fn announce(&mut self) {
        self.events.publish(NightLightEvent::SettingsChanged {
            settings: self.settings.clone(),
        });
    }
}
