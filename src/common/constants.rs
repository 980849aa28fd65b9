//! Application-wide constants: defaults, validation ranges and timing.
//!
//! Values here mirror what a freshly unboxed night light ships with. Ranges
//! are inclusive on both ends.

use std::time::Duration;

// # Settings defaults

/// Wake time used until the user configures one (HH:MM, 24-hour)
pub const DEFAULT_WAKE_TIME: &str = "06:30";
/// Length of the wake (blue light) phase in minutes
pub const DEFAULT_WAKE_DURATION: u32 = 30;
/// Brightness percentage for the white (night) light
pub const DEFAULT_WHITE_BRIGHTNESS: u32 = 80;
/// Brightness percentage for the blue (wake) light
pub const DEFAULT_BLUE_BRIGHTNESS: u32 = 70;
/// Brightness percentage for the pink (awake) light
pub const DEFAULT_PINK_BRIGHTNESS: u32 = 60;
pub const DEFAULT_SOUND_ENABLED: bool = false;

// # Validation ranges

pub const MINIMUM_WAKE_DURATION: u32 = 1;
pub const MAXIMUM_WAKE_DURATION: u32 = 60;
pub const MINIMUM_BRIGHTNESS: u32 = 0;
pub const MAXIMUM_BRIGHTNESS: u32 = 100;

// # Persistence

/// Key under which the serialized settings live in the key-value store
pub const SETTINGS_STORE_KEY: &str = "nightlight-settings";
/// Directory name below the platform config directory
pub const CONFIG_DIR_NAME: &str = "nightlight";
/// File backing the key-value store
pub const STORE_FILE_NAME: &str = "store.toml";

// # Timing

/// Interval between engine ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Longest real wait between cancellation checks of a simulated tick
pub const TICK_CANCEL_POLL: Duration = Duration::from_millis(50);
/// How long the core loop waits for a message before checking the clock
pub const MESSAGE_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Ticks between status lines in debug mode
pub const DEBUG_STATUS_TICKS: u64 = 60;
/// Default acceleration for `simulate` (one simulated minute per real second)
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 60.0;
pub const MINIMUM_SIMULATION_MULTIPLIER: f64 = 0.1;
pub const MAXIMUM_SIMULATION_MULTIPLIER: f64 = 3600.0;

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;
