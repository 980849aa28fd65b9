//! Owner of one settings model and one engine.
//!
//! Hosts create a single [`NightLightContext`] at startup and drop it (or
//! call [`shutdown`](NightLightContext::shutdown)) at teardown. Controls on
//! the context read the wake time from the current settings, so a host never
//! has to pass schedule values around itself.

use anyhow::Result;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use crate::core::engine::NightLight;
use crate::io::signals::SignalMessage;
use crate::light::LightColor;
use crate::settings::{Settings, SettingsModel};
use crate::state::events::NightLightEvent;
use crate::state::timer::TimerInfo;
use crate::time::source::TimeSource;

pub struct NightLightContext {
    settings: SettingsModel,
    engine: NightLight,
    shut_down: bool,
}

impl NightLightContext {
    pub fn new(settings: SettingsModel, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            settings,
            engine: NightLight::new(clock),
            shut_down: false,
        }
    }

    /// Route engine ticks through the host channel.
    pub fn with_tick_sink(mut self, sink: Sender<SignalMessage>) -> Self {
        self.engine.set_tick_sink(sink);
        self
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn settings_model(&self) -> &SettingsModel {
        &self.settings
    }

    pub fn engine(&self) -> &NightLight {
        &self.engine
    }

    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        self.engine.clock()
    }

    pub fn subscribe_engine(&mut self) -> Receiver<NightLightEvent> {
        self.engine.subscribe()
    }

    pub fn subscribe_settings(&mut self) -> Receiver<NightLightEvent> {
        self.settings.subscribe()
    }

    // # Engine controls

    /// Start the schedule with the configured wake time.
    pub fn start(&mut self) -> Result<()> {
        let settings = self.settings.settings();
        self.engine.start(&settings.wake_time, settings)
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn toggle(&mut self) -> Result<()> {
        let settings = self.settings.settings();
        self.engine.toggle(&settings.wake_time, settings)
    }

    pub fn start_preview(&mut self, color: LightColor) {
        self.engine.start_preview(color);
    }

    pub fn stop_preview(&mut self) {
        self.engine.stop_preview(self.settings.settings());
    }

    pub fn refresh(&mut self) {
        self.engine.refresh(self.settings.settings());
    }

    /// Apply a tick immediately, for hosts that drive the clock themselves.
    pub fn tick(&mut self) {
        self.engine.tick(self.settings.settings());
    }

    /// Apply a tick posted by the ticker; stale generations are dropped.
    pub fn handle_tick(&mut self, generation: u64) -> bool {
        self.engine.handle_tick(generation, self.settings.settings())
    }

    // # Settings pass-throughs

    pub fn update_wake_time(&mut self, time: &str) -> bool {
        self.settings.update_wake_time(time)
    }

    pub fn update_wake_duration(&mut self, minutes: u32) -> bool {
        self.settings.update_wake_duration(minutes)
    }

    pub fn update_brightness(&mut self, color: LightColor, percent: u32) -> bool {
        self.settings.update_brightness(color, percent)
    }

    pub fn update_sound_enabled(&mut self, enabled: bool) -> bool {
        self.settings.update_sound_enabled(enabled)
    }

    pub fn reset_settings(&mut self) {
        self.settings.reset_settings();
    }

    pub fn export_settings(&self) -> String {
        self.settings.export_settings()
    }

    pub fn import_settings(&mut self, payload: &str) -> bool {
        self.settings.import_settings(payload)
    }

    /// Re-read the persisted settings.
    pub fn reload_settings(&mut self) {
        self.settings.load();
    }

    // # Views

    pub fn timer_info(&self) -> TimerInfo {
        self.engine.timer_info()
    }

    pub fn status_message(&self) -> String {
        self.engine.status_message()
    }

    pub fn current_brightness(&self) -> f32 {
        self.engine.current_brightness(self.settings.settings())
    }

    pub fn format_time_remaining(&self) -> String {
        self.engine.format_time_remaining()
    }

    pub fn format_next_wake_time(&self) -> String {
        self.engine.format_next_wake_time()
    }

    /// Stop the engine and flush the settings. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        if self.engine.is_active() || self.engine.is_ticking() {
            self.engine.stop();
        }
        self.settings.save();
    }
}

impl Drop for NightLightContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
