//! Time source abstraction for real, simulated and manually driven clocks.
//!
//! A time source is handed to the engine (and the ticker) at construction
//! time, so tests and the `simulate` command can run the schedule without
//! waiting for the wall clock.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Real time a `sleep(duration)` takes on this clock
    fn real_duration(&self, duration: StdDuration) -> StdDuration {
        duration
    }

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time source for time-accelerated runs.
///
/// Two modes:
/// - Linear acceleration: simulated time flows at `multiplier` times real time
/// - Fast-forward (multiplier = 0.0): every sleep jumps the clock instantly
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    multiplier: f64,
    /// Simulated time consumed by completed sleeps
    elapsed: Mutex<StdDuration>,
    /// Sleep in progress: (real start, simulated length), for smooth `now()`
    sleeping: Mutex<Option<(Instant, StdDuration)>>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// Negative multipliers fall back to one simulated hour per real second.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let multiplier = if multiplier < 0.0 { 3600.0 } else { multiplier };
        Self {
            start_time,
            end_time,
            multiplier,
            elapsed: Mutex::new(StdDuration::ZERO),
            sleeping: Mutex::new(None),
        }
    }

    /// Simulated span from start to end
    pub fn total_duration(&self) -> ChronoDuration {
        self.end_time - self.start_time
    }

    fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    fn current_time(&self) -> DateTime<Local> {
        let mut simulated = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((started, length)) = *self.sleeping.lock().unwrap_or_else(|e| e.into_inner()) {
            let progressed = started.elapsed().mul_f64(self.multiplier);
            simulated += progressed.min(length);
        }

        ChronoDuration::from_std(simulated)
            .ok()
            .and_then(|offset| self.start_time.checked_add_signed(offset))
            .map_or(self.end_time, |simulated| simulated.min(self.end_time))
    }

    /// Simulated time left before the end instant
    fn remaining(&self) -> StdDuration {
        (self.end_time - self.current_time())
            .to_std()
            .unwrap_or(StdDuration::ZERO)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let step = duration.min(self.remaining());
        if step.is_zero() {
            // Let other threads observe the end of the simulation
            std::thread::sleep(StdDuration::from_millis(1));
            return;
        }

        if self.is_fast_forward() {
            std::thread::sleep(StdDuration::from_millis(1));
        } else {
            *self.sleeping.lock().unwrap_or_else(|e| e.into_inner()) = Some((Instant::now(), step));
            std::thread::sleep(step.div_f64(self.multiplier));
            *self.sleeping.lock().unwrap_or_else(|e| e.into_inner()) = None;
        }

        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn real_duration(&self, duration: StdDuration) -> StdDuration {
        if self.is_fast_forward() {
            StdDuration::ZERO
        } else {
            duration.div_f64(self.multiplier)
        }
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Manually driven clock for tests.
///
/// Time only moves through [`set`](Self::set), [`advance`](Self::advance)
/// or `sleep`, which advances instantly.
#[cfg(any(test, feature = "testing-support"))]
pub struct ManualTimeSource {
    current: Mutex<DateTime<Local>>,
}

#[cfg(any(test, feature = "testing-support"))]
impl ManualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Convenience constructor for a local wall-clock time.
    ///
    /// # Panics
    /// Panics if the local time does not exist (DST gap); tests pick dates
    /// away from transitions.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self::new(local_datetime(year, month, day, hour, minute, second))
    }

    pub fn set(&self, instant: DateTime<Local>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    pub fn advance(&self, duration: ChronoDuration) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) += duration;
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        self.advance(ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero()));
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn real_duration(&self, _duration: StdDuration) -> StdDuration {
        StdDuration::ZERO
    }
}

/// Build a local instant from wall-clock fields, for tests and fixtures.
///
/// # Panics
/// Panics when the fields do not name a single local instant.
#[cfg(any(test, feature = "testing-support"))]
pub fn local_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("test datetime must map to a single local instant")
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Invalid datetime '{s}'. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("'{s}' is ambiguous or does not exist in the local timezone"))
}
