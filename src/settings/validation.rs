//! Settings validation.
//!
//! Every value entering the settings model passes through these checks,
//! whether it comes from an update call, the persisted store or an import.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Settings;
use crate::common::constants::*;
use crate::light::LightColor;

/// `H:MM` or `HH:MM`, 24-hour, minutes always two digits
static WAKE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("wake time pattern is valid")
});

pub fn is_valid_wake_time(time: &str) -> bool {
    WAKE_TIME_PATTERN.is_match(time)
}

pub fn is_valid_duration(minutes: u32) -> bool {
    (MINIMUM_WAKE_DURATION..=MAXIMUM_WAKE_DURATION).contains(&minutes)
}

pub fn is_valid_brightness(percent: u32) -> bool {
    (MINIMUM_BRIGHTNESS..=MAXIMUM_BRIGHTNESS).contains(&percent)
}

/// Parse a wake time string into a time of day.
pub fn parse_wake_time(time: &str) -> Result<NaiveTime> {
    if !is_valid_wake_time(time) {
        anyhow::bail!("wake time '{time}' must be HH:MM between 00:00 and 23:59");
    }
    let (hour, minute) = time
        .split_once(':')
        .and_then(|(h, m)| Some((h.parse().ok()?, m.parse().ok()?)))
        .with_context(|| format!("wake time '{time}' could not be parsed"))?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .with_context(|| format!("wake time '{time}' is out of range"))
}

/// Validate a complete settings value, reporting the first offending field.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if !is_valid_wake_time(&settings.wake_time) {
        anyhow::bail!(
            "wakeTime ({:?}) must be HH:MM between 00:00 and 23:59",
            settings.wake_time
        );
    }

    if !is_valid_duration(settings.wake_duration) {
        anyhow::bail!(
            "wakeDuration ({} minutes) must be between {} and {} minutes",
            settings.wake_duration,
            MINIMUM_WAKE_DURATION,
            MAXIMUM_WAKE_DURATION
        );
    }

    for color in LightColor::ALL {
        let percent = settings.brightness.get(color);
        if !is_valid_brightness(percent) {
            anyhow::bail!(
                "brightness.{} ({}%) must be between {}% and {}%",
                color,
                percent,
                MINIMUM_BRIGHTNESS,
                MAXIMUM_BRIGHTNESS
            );
        }
    }

    Ok(())
}
