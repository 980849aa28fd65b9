//! The night light engine.
//!
//! Holds the live simulation state and applies controls and ticks to it.
//! The displayed phase and color are written by whichever control ran last:
//! a preview shows its color in the night phase, while `start`, `stop` and
//! `stop_preview` show the schedule. Ticks leave the display alone while a
//! preview is on.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crate::common::utils::format_hms;
use crate::core::phase::{PhaseReading, calculate_phase, next_wake_after};
use crate::core::ticker::Ticker;
use crate::io::signals::SignalMessage;
use crate::light::{LightColor, LightPhase};
use crate::settings::{Settings, parse_wake_time};
use crate::state::events::{EventBus, NightLightEvent};
use crate::state::timer::TimerInfo;
use crate::time::source::TimeSource;

/// Live state of one night light.
pub struct NightLight {
    clock: Arc<dyn TimeSource>,
    ticker: Ticker,
    events: EventBus,
    is_active: bool,
    current_time: DateTime<Local>,
    /// Fixed when started, kept after stop
    next_wake: Option<DateTime<Local>>,
    schedule: PhaseReading,
    preview: Option<LightColor>,
    phase: LightPhase,
    color: LightColor,
}

impl NightLight {
    /// Inactive engine reading time from `clock`.
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            ticker: Ticker::new(Arc::clone(&clock)),
            current_time: clock.now(),
            clock,
            events: EventBus::new(),
            is_active: false,
            next_wake: None,
            schedule: PhaseReading::INACTIVE,
            preview: None,
            phase: LightPhase::Inactive,
            color: LightColor::White,
        }
    }

    /// Have the ticker post `Tick` messages to `sink` while running.
    pub fn set_tick_sink(&mut self, sink: Sender<SignalMessage>) {
        self.ticker.set_sink(sink);
    }

    pub fn subscribe(&mut self) -> Receiver<NightLightEvent> {
        self.events.subscribe()
    }

    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        &self.clock
    }

    // # Controls

    /// Start the schedule with the wake time `wake_time` (`H:MM` or `HH:MM`).
    ///
    /// The next wake instant is fixed here, anchored to the current clock
    /// reading, and stays fixed until the next start. A malformed wake time
    /// leaves the engine untouched. A running preview stays flagged but the
    /// display switches to the schedule.
    pub fn start(&mut self, wake_time: &str, settings: &Settings) -> Result<()> {
        let wake = parse_wake_time(wake_time)?;
        let before = self.current_phase();

        self.current_time = self.clock.now();
        self.next_wake = Some(next_wake_after(self.current_time, wake));
        self.is_active = true;
        self.recompute(settings);
        self.show_schedule();
        self.ticker.start();

        self.announce(before);
        Ok(())
    }

    /// Switch the schedule off and cancel the tick. The display goes to
    /// inactive and white even while a preview is flagged.
    pub fn stop(&mut self) {
        let before = self.current_phase();

        self.is_active = false;
        self.schedule = PhaseReading::INACTIVE;
        self.show_schedule();
        self.ticker.cancel();

        self.announce(before);
    }

    pub fn toggle(&mut self, wake_time: &str, settings: &Settings) -> Result<()> {
        if self.is_active {
            self.stop();
            Ok(())
        } else {
            self.start(wake_time, settings)
        }
    }

    /// Show `color` regardless of the schedule until [`stop_preview`](Self::stop_preview).
    pub fn start_preview(&mut self, color: LightColor) {
        let before = self.current_phase();
        self.preview = Some(color);
        self.phase = LightPhase::Night;
        self.color = color;

        self.events
            .publish(NightLightEvent::PreviewChanged { color: Some(color) });
        self.announce(before);
    }

    /// Leave preview mode and show the schedule again right away.
    pub fn stop_preview(&mut self, settings: &Settings) {
        let before = self.current_phase();
        let was_previewing = self.preview.take().is_some();

        if self.is_active {
            self.recompute(settings);
        } else {
            self.schedule = PhaseReading::INACTIVE;
        }
        self.show_schedule();

        if was_previewing {
            self.events
                .publish(NightLightEvent::PreviewChanged { color: None });
        }
        self.announce(before);
    }

    /// Recompute the schedule from the stored wake instant and the last
    /// clock reading, without waiting for a tick. A preview keeps the display.
    pub fn refresh(&mut self, settings: &Settings) {
        let before = self.current_phase();
        self.recompute(settings);
        if self.preview.is_none() {
            self.show_schedule();
        }
        self.announce(before);
    }

    /// Apply one tick: read the clock, then recompute unless stopped or
    /// previewing.
    pub fn tick(&mut self, settings: &Settings) {
        let before = self.current_phase();

        self.current_time = self.clock.now();
        if self.is_active && self.preview.is_none() {
            self.recompute(settings);
            self.show_schedule();
        }

        self.announce(before);
    }

    /// Apply a tick posted by the ticker. Ticks from a cancelled or
    /// restarted ticker are dropped; returns whether the tick was applied.
    pub fn handle_tick(&mut self, generation: u64, settings: &Settings) -> bool {
        if !self.ticker.is_current(generation) {
            return false;
        }
        self.tick(settings);
        true
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_armed()
    }

    fn recompute(&mut self, settings: &Settings) {
        self.schedule = match (self.is_active, self.next_wake) {
            (true, Some(next_wake)) => {
                calculate_phase(self.current_time, next_wake, settings.wake_duration)
            }
            _ => PhaseReading::INACTIVE,
        };
    }

    fn show_schedule(&mut self) {
        self.phase = self.schedule.phase;
        self.color = self.schedule.phase.color();
    }

    fn announce(&mut self, before: LightPhase) {
        let after = self.current_phase();
        if after != before {
            self.events
                .publish(NightLightEvent::phase_changed(before, after));
        }
        self.events
            .publish(NightLightEvent::state_changed(self.timer_info()));
    }

    // # Read accessors

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_preview_mode(&self) -> bool {
        self.preview.is_some()
    }

    pub fn preview_color(&self) -> Option<LightColor> {
        self.preview
    }

    pub fn current_time(&self) -> DateTime<Local> {
        self.current_time
    }

    pub fn next_wake_time(&self) -> Option<DateTime<Local>> {
        self.next_wake
    }

    pub fn current_phase(&self) -> LightPhase {
        self.phase
    }

    pub fn current_color(&self) -> LightColor {
        self.color
    }

    pub fn time_remaining(&self) -> Duration {
        self.schedule.time_remaining
    }

    pub fn timer_info(&self) -> TimerInfo {
        TimerInfo {
            current_time: self.current_time,
            next_wake_time: self.next_wake,
            time_remaining_ms: u64::try_from(self.schedule.time_remaining.as_millis())
                .unwrap_or(u64::MAX),
            current_phase: self.current_phase(),
            current_color: self.current_color(),
            is_active: self.is_active,
        }
    }

    // # Formatted views

    /// Remaining time as `HH:MM:SS`.
    pub fn format_time_remaining(&self) -> String {
        format_hms(self.schedule.time_remaining)
    }

    /// Brightness of the displayed color as a fraction in [0, 1].
    pub fn current_brightness(&self, settings: &Settings) -> f32 {
        settings.brightness_fraction(self.current_color())
    }

    /// Wake instant as `HH:MM AM/PM`, empty while stopped.
    pub fn format_next_wake_time(&self) -> String {
        match self.next_wake {
            Some(next_wake) if self.is_active => next_wake.format("%I:%M %p").to_string(),
            _ => String::new(),
        }
    }

    pub fn status_message(&self) -> String {
        if let Some(color) = self.preview {
            return format!("Preview: {color} light");
        }
        if !self.is_active {
            return "Night light is off".to_string();
        }

        match self.schedule.phase {
            LightPhase::Night => format!("Night mode until {}", self.format_next_wake_time()),
            LightPhase::Wake => format!("Wake mode - {} remaining", self.format_time_remaining()),
            LightPhase::Awake => "Awake mode - ready to start your day!".to_string(),
            LightPhase::Inactive => "Night light is off".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::test_constants::*;
    use crate::time::source::{ManualTimeSource, local_datetime};
    use chrono::Duration as ChronoDuration;

    fn engine_at(hour: u32, minute: u32) -> (NightLight, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::at(2025, 3, 10, hour, minute, 0));
        (NightLight::new(clock.clone()), clock)
    }

    #[test]
    fn test_new_engine_is_inactive() {
        let (engine, _) = engine_at(22, 0);
        assert!(!engine.is_active());
        assert_eq!(engine.current_phase(), LightPhase::Inactive);
        assert_eq!(engine.current_color(), LightColor::White);
        assert_eq!(engine.format_time_remaining(), "00:00:00");
        assert_eq!(engine.format_next_wake_time(), "");
        assert_eq!(engine.status_message(), "Night light is off");
        assert!(engine.timer_info().next_wake_time.is_none());
    }

    #[test]
    fn test_start_in_the_night() {
        let (mut engine, _) = engine_at(5, 0);
        engine.start(TEST_WAKE_TIME, &Settings::default()).unwrap();

        assert!(engine.is_active());
        assert!(engine.is_ticking());
        assert_eq!(engine.current_phase(), LightPhase::Night);
        assert_eq!(engine.current_color(), LightColor::White);
        assert_eq!(engine.timer_info().time_remaining_ms, 90 * 60 * 1000);
        assert_eq!(engine.format_time_remaining(), "01:30:00");
        assert_eq!(engine.format_next_wake_time(), "06:30 AM");
        assert_eq!(engine.status_message(), "Night mode until 06:30 AM");
    }

    #[test]
    fn test_ticks_walk_through_the_schedule() {
        let (mut engine, clock) = engine_at(6, 0);
        let settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();

        clock.set(local_datetime(2025, 3, 10, 6, 45, 0));
        engine.tick(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Wake);
        assert_eq!(engine.current_color(), LightColor::Blue);
        assert_eq!(engine.time_remaining(), Duration::from_secs(15 * 60));
        assert_eq!(engine.status_message(), "Wake mode - 00:15:00 remaining");

        clock.set(local_datetime(2025, 3, 10, 7, 0, 0));
        engine.tick(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Awake);
        assert_eq!(engine.current_color(), LightColor::Pink);
        assert!(engine.time_remaining().is_zero());
        assert_eq!(engine.status_message(), "Awake mode - ready to start your day!");
    }

    #[test]
    fn test_wake_duration_is_read_on_every_recompute() {
        let (mut engine, clock) = engine_at(6, 0);
        let mut settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();

        clock.set(local_datetime(2025, 3, 10, 6, 40, 0));
        settings.wake_duration = TEST_SHORT_WAKE_DURATION;
        engine.tick(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Awake);
    }

    #[test]
    fn test_next_wake_is_fixed_at_start() {
        let (mut engine, clock) = engine_at(5, 0);
        engine.start(TEST_WAKE_TIME, &Settings::default()).unwrap();
        let fixed = engine.next_wake_time();

        clock.advance(ChronoDuration::hours(3));
        engine.tick(&Settings::default());
        assert_eq!(engine.next_wake_time(), fixed);
        assert_eq!(engine.current_phase(), LightPhase::Awake);
    }

    #[test]
    fn test_invalid_wake_time_leaves_engine_untouched() {
        let (mut engine, _) = engine_at(5, 0);
        assert!(engine.start("25:00", &Settings::default()).is_err());
        assert!(engine.start("6:3", &Settings::default()).is_err());

        assert!(!engine.is_active());
        assert!(!engine.is_ticking());
        assert!(engine.next_wake_time().is_none());
    }

    #[test]
    fn test_stop_twice_matches_stop_once() {
        let (mut engine, _) = engine_at(5, 0);
        engine.start(TEST_WAKE_TIME, &Settings::default()).unwrap();

        engine.stop();
        let once = (engine.timer_info(), engine.status_message(), engine.is_ticking());
        engine.stop();
        let twice = (engine.timer_info(), engine.status_message(), engine.is_ticking());

        assert_eq!(once, twice);
        assert_eq!(once.0.current_phase, LightPhase::Inactive);
        assert!(!once.2);
    }

    #[test]
    fn test_toggle() {
        let (mut engine, _) = engine_at(5, 0);
        let settings = Settings::default();

        engine.toggle(TEST_WAKE_TIME, &settings).unwrap();
        assert!(engine.is_active());
        engine.toggle(TEST_WAKE_TIME, &settings).unwrap();
        assert!(!engine.is_active());
        assert_eq!(engine.current_phase(), LightPhase::Inactive);
    }

    #[test]
    fn test_preview_overrides_until_stopped() {
        let (mut engine, clock) = engine_at(5, 0);
        let settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();

        engine.start_preview(LightColor::Blue);
        assert!(engine.is_preview_mode());
        assert_eq!(engine.current_color(), LightColor::Blue);
        assert_eq!(engine.current_phase(), LightPhase::Night);
        assert_eq!(engine.status_message(), "Preview: blue light");

        clock.set(local_datetime(2025, 3, 10, 7, 30, 0));
        engine.tick(&settings);
        assert_eq!(engine.current_color(), LightColor::Blue);
        assert_eq!(engine.current_time(), local_datetime(2025, 3, 10, 7, 30, 0));

        engine.stop_preview(&settings);
        assert!(!engine.is_preview_mode());
        assert_eq!(engine.current_phase(), LightPhase::Awake);
        assert_eq!(engine.current_color(), LightColor::Pink);
    }

    #[test]
    fn test_preview_while_stopped() {
        let (mut engine, _) = engine_at(5, 0);
        engine.start_preview(LightColor::Pink);
        assert_eq!(engine.current_color(), LightColor::Pink);
        assert!(!engine.is_active());

        engine.stop_preview(&Settings::default());
        assert_eq!(engine.current_phase(), LightPhase::Inactive);
        assert_eq!(engine.current_color(), LightColor::White);
    }

    #[test]
    fn test_stop_during_preview_shows_inactive_white() {
        let (mut engine, _) = engine_at(5, 0);
        let settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();
        engine.start_preview(LightColor::Blue);

        engine.stop();
        assert!(!engine.is_active());
        assert_eq!(engine.current_phase(), LightPhase::Inactive);
        assert_eq!(engine.current_color(), LightColor::White);
        assert_eq!(engine.timer_info().current_color, LightColor::White);
        assert!(engine.is_preview_mode());
        assert_eq!(engine.status_message(), "Preview: blue light");
    }

    #[test]
    fn test_start_during_preview_shows_schedule() {
        let (mut engine, clock) = engine_at(5, 0);
        let settings = Settings::default();
        engine.start_preview(LightColor::Pink);

        engine.start(TEST_WAKE_TIME, &settings).unwrap();
        assert_eq!(engine.current_phase(), LightPhase::Night);
        assert_eq!(engine.current_color(), LightColor::White);
        assert!(engine.is_preview_mode());

        // Ticks leave the display alone while the preview is flagged
        clock.set(local_datetime(2025, 3, 10, 6, 45, 0));
        engine.tick(&settings);
        assert_eq!(engine.current_color(), LightColor::White);

        engine.stop_preview(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Wake);
        assert_eq!(engine.current_color(), LightColor::Blue);
    }

    #[test]
    fn test_current_brightness_follows_displayed_color() {
        let (mut engine, _) = engine_at(5, 0);
        let settings = Settings::default();

        assert!((engine.current_brightness(&settings) - 0.8).abs() < f32::EPSILON);
        engine.start_preview(LightColor::Pink);
        assert!((engine.current_brightness(&settings) - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_refresh_uses_last_clock_reading() {
        let (mut engine, clock) = engine_at(5, 0);
        let settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();

        clock.set(local_datetime(2025, 3, 10, 6, 45, 0));
        engine.refresh(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Night);

        engine.tick(&settings);
        assert_eq!(engine.current_phase(), LightPhase::Wake);
    }

    #[test]
    fn test_stale_ticks_are_ignored() {
        let (mut engine, _) = engine_at(5, 0);
        let settings = Settings::default();

        engine.start(TEST_WAKE_TIME, &settings).unwrap();
        let old = engine.ticker.generation();
        engine.stop();
        assert!(!engine.handle_tick(old, &settings));

        engine.start(TEST_WAKE_TIME, &settings).unwrap();
        assert!(!engine.handle_tick(old, &settings));
        assert!(engine.handle_tick(engine.ticker.generation(), &settings));
    }

    #[test]
    fn test_events_report_phase_change_before_state() {
        let (mut engine, _) = engine_at(5, 0);
        let events = engine.subscribe();
        engine.start(TEST_WAKE_TIME, &Settings::default()).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            NightLightEvent::phase_changed(LightPhase::Inactive, LightPhase::Night)
        );
        match events.try_recv().unwrap() {
            NightLightEvent::StateChanged { state } => {
                assert!(state.is_active);
                assert_eq!(state.current_phase, LightPhase::Night);
            }
            other => panic!("Unexpected event: {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_unchanged_tick_only_reports_state() {
        let (mut engine, clock) = engine_at(5, 0);
        let settings = Settings::default();
        engine.start(TEST_WAKE_TIME, &settings).unwrap();
        let events = engine.subscribe();

        clock.advance(ChronoDuration::seconds(1));
        engine.tick(&settings);

        assert!(matches!(
            events.try_recv().unwrap(),
            NightLightEvent::StateChanged { .. }
        ));
        assert!(events.try_recv().is_err());
    }
}
