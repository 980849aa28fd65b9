//! Light colors and schedule phases.
//!
//! The night light cycles through three colors, one per phase of the wake
//! schedule: white through the night, blue while waking, pink once awake.
//! `Inactive` is the phase reported while the light is switched off.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three colors the light can show.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    /// Night light, also the color shown while inactive
    White,
    /// Wake window light
    Blue,
    /// Awake light
    Pink,
}

impl LightColor {
    pub const ALL: [LightColor; 3] = [LightColor::White, LightColor::Blue, LightColor::Pink];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Blue => "blue",
            Self::Pink => "pink",
        }
    }
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "blue" => Ok(Self::Blue),
            "pink" => Ok(Self::Pink),
            other => bail!("Unknown light color '{other}' (expected white, blue or pink)"),
        }
    }
}

/// Segment of the wake schedule the light is currently in.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightPhase {
    /// Light switched off
    Inactive,
    /// Before the wake time
    Night,
    /// Inside the wake window
    Wake,
    /// After the wake window has ended
    Awake,
}

impl LightPhase {
    /// The color the schedule shows in this phase.
    pub fn color(&self) -> LightColor {
        match self {
            Self::Inactive | Self::Night => LightColor::White,
            Self::Wake => LightColor::Blue,
            Self::Awake => LightColor::Pink,
        }
    }

    /// Returns the display name for this phase.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Night => "Night",
            Self::Wake => "Wake",
            Self::Awake => "Awake",
        }
    }

    /// Returns the icon/symbol for this phase.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Inactive => "○",
            Self::Night => "☾",
            Self::Wake => "◐",
            Self::Awake => "☀",
        }
    }
}

impl fmt::Display for LightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
