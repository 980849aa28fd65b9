//! Snapshot of the engine's live values.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::light::{LightColor, LightPhase};

/// Projection of the engine state at one instant.
///
/// Rebuilt from the engine on every read; holding one does not keep it
/// up to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerInfo {
    /// Clock reading taken by the last tick or control operation
    pub current_time: DateTime<Local>,

    /// Wake instant fixed when the light was started, absent before the first start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_wake_time: Option<DateTime<Local>>,

    /// Time until the next phase boundary, in milliseconds
    pub time_remaining_ms: u64,

    pub current_phase: LightPhase,
    pub current_color: LightColor,
    pub is_active: bool,
}

impl TimerInfo {
    pub fn time_remaining(&self) -> Duration {
        Duration::from_millis(self.time_remaining_ms)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
