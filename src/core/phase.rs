//! Wake schedule arithmetic.
//!
//! Pure functions: given the current instant, the fixed wake instant and the
//! wake duration, decide which phase the light is in and how long until the
//! next boundary. Nothing here reads a clock.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime, TimeZone};
use std::time::Duration;

use crate::light::LightPhase;

/// Result of evaluating the schedule at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReading {
    pub phase: LightPhase,
    /// Time until the next phase boundary, zero once awake
    pub time_remaining: Duration,
}

impl PhaseReading {
    /// Reading reported while the light is switched off.
    pub const INACTIVE: PhaseReading = PhaseReading {
        phase: LightPhase::Inactive,
        time_remaining: Duration::ZERO,
    };
}

/// The next instant strictly after `now` whose local time of day is `wake`.
///
/// Today's occurrence is used when it is still ahead, otherwise the one on
/// the following calendar day.
pub fn next_wake_after(now: DateTime<Local>, wake: NaiveTime) -> DateTime<Local> {
    let today = now.date_naive();
    let candidate = resolve_local(today.and_time(wake));
    if candidate > now {
        return candidate;
    }

    today
        .succ_opt()
        .map(|tomorrow| resolve_local(tomorrow.and_time(wake)))
        .unwrap_or(candidate + ChronoDuration::days(1))
}

/// Map a local wall-clock reading to an instant.
///
/// Ambiguous readings (clocks turned back) take the earlier instant. Readings
/// inside a gap (clocks turned forward) move one hour later.
fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + ChronoDuration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Evaluate the schedule at `now` for a wake window starting at `next_wake`
/// and lasting `wake_duration_minutes`.
///
/// Boundaries are half-open: the wake phase includes `next_wake` and ends
/// just before `next_wake + duration`.
pub fn calculate_phase(
    now: DateTime<Local>,
    next_wake: DateTime<Local>,
    wake_duration_minutes: u32,
) -> PhaseReading {
    let wake_end = next_wake + ChronoDuration::minutes(i64::from(wake_duration_minutes));

    let (phase, boundary) = if now < next_wake {
        (LightPhase::Night, Some(next_wake))
    } else if now < wake_end {
        (LightPhase::Wake, Some(wake_end))
    } else {
        (LightPhase::Awake, None)
    };

    let time_remaining = boundary
        .and_then(|boundary| (boundary - now).to_std().ok())
        .unwrap_or(Duration::ZERO);

    PhaseReading {
        phase,
        time_remaining,
    }
}
