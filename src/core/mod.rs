//! Core session logic.
//!
//! The [`Core`] owns the [`NightLightContext`] for one interactive (or
//! simulated) session and runs the single-threaded message loop:
//!
//! - Ticks from the ticker worker advance the schedule
//! - Commands from stdin or SIGUSR1 drive the controls and settings
//! - SIGUSR2 reloads the persisted settings
//! - Shutdown signals, `quit`, or the end of a simulation end the session
//!
//! Producer threads never touch the context; every mutation happens here.

pub mod context;
pub mod engine;
pub mod phase;
pub mod ticker;

use anyhow::Result;
use std::sync::mpsc::{Receiver, RecvTimeoutError};

use crate::common::constants::{DEBUG_STATUS_TICKS, MESSAGE_POLL_INTERVAL};
use crate::core::context::NightLightContext;
use crate::io::input::HostCommand;
use crate::io::signals::{SignalMessage, SignalState};
use crate::state::events::NightLightEvent;

/// Parameters for creating a Core instance.
pub struct CoreParams {
    pub context: NightLightContext,
    pub signal_state: SignalState,
    pub debug_enabled: bool,
    /// Start the light as soon as the session begins
    pub autostart: bool,
}

/// Message loop for one session.
pub struct Core {
    context: NightLightContext,
    signal_state: SignalState,
    debug_enabled: bool,
    autostart: bool,
    engine_events: Receiver<NightLightEvent>,
    settings_events: Receiver<NightLightEvent>,
    ticks_applied: u64,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        let mut context = params.context;
        let engine_events = context.subscribe_engine();
        let settings_events = context.subscribe_settings();

        Self {
            context,
            signal_state: params.signal_state,
            debug_enabled: params.debug_enabled,
            autostart: params.autostart,
            engine_events,
            settings_events,
            ticks_applied: 0,
        }
    }

    /// Run the session to completion and tear the context down.
    pub fn execute(mut self) -> Result<()> {
        if self.autostart {
            self.apply(HostCommand::Start);
        }
        self.drain_events();

        self.main_loop();

        log_block_start!("Shutting down nightlight...");
        self.context.shutdown();
        if self.debug_enabled {
            log_debug!("Tick stopped and settings flushed");
        }
        log_end!();

        Ok(())
    }

    /// Access to the context, for hosts that inspect the session afterwards.
    pub fn context(&self) -> &NightLightContext {
        &self.context
    }

    fn main_loop(&mut self) {
        loop {
            if self.context.clock().is_ended() {
                log_block_start!("Simulation complete");
                self.log_status();
                break;
            }

            match self
                .signal_state
                .signal_receiver
                .recv_timeout(MESSAGE_POLL_INTERVAL)
            {
                Ok(message) => {
                    if !self.handle_message(message) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log_pipe!();
                    log_error!("Message channel disconnected unexpectedly");
                    break;
                }
            }

            self.drain_events();
        }
    }

    /// Apply one message. Returns `false` when the session should end.
    pub fn handle_message(&mut self, message: SignalMessage) -> bool {
        match message {
            SignalMessage::Tick { generation } => {
                if self.context.handle_tick(generation) {
                    self.ticks_applied += 1;
                    if self.debug_enabled && self.ticks_applied % DEBUG_STATUS_TICKS == 0 {
                        log_pipe!();
                        log_debug!("{}", self.context.status_message());
                    }
                } else if self.debug_enabled {
                    log_pipe!();
                    log_debug!("Dropped stale tick from generation {}", generation);
                }
            }
            SignalMessage::Command(command) => return self.apply(command),
            SignalMessage::Reload => {
                self.context.reload_settings();
                log_block_start!("Settings reloaded");
                self.context.settings().log_summary();
            }
            SignalMessage::Shutdown => return false,
        }
        true
    }

    fn apply(&mut self, command: HostCommand) -> bool {
        match command {
            HostCommand::Start => self.start(),
            HostCommand::Stop => self.stop(),
            HostCommand::Toggle => {
                if self.context.engine().is_active() {
                    self.stop();
                } else {
                    self.start();
                }
            }
            HostCommand::Preview(color) => {
                self.context.start_preview(color);
                log_block_start!("Previewing {} light", color);
                log_indented!(
                    "Brightness: {:.0}%",
                    self.context.current_brightness() * 100.0
                );
            }
            HostCommand::EndPreview => {
                self.context.stop_preview();
                log_block_start!("Preview ended");
                log_indented!("{}", self.context.status_message());
            }
            HostCommand::Status => self.log_status(),
            HostCommand::WakeTime(time) => {
                if self.context.update_wake_time(&time) {
                    log_block_start!("Wake time set to {}", time);
                    if self.context.engine().is_active() {
                        log_indented!("Takes effect the next time the light is started");
                    }
                } else {
                    log_pipe!();
                    log_warning!("Invalid wake time '{}' (expected HH:MM, 24-hour)", time);
                }
            }
            HostCommand::WakeDuration(minutes) => {
                if self.context.update_wake_duration(minutes) {
                    log_block_start!("Wake duration set to {} minutes", minutes);
                } else {
                    log_pipe!();
                    log_warning!("Invalid wake duration {} (expected 1-60 minutes)", minutes);
                }
            }
            HostCommand::Brightness(color, percent) => {
                if self.context.update_brightness(color, percent) {
                    log_block_start!("{} brightness set to {}%", color, percent);
                } else {
                    log_pipe!();
                    log_warning!("Invalid brightness {} (expected 0-100)", percent);
                }
            }
            HostCommand::Sound(enabled) => {
                self.context.update_sound_enabled(enabled);
                log_block_start!("Sound {}", if enabled { "on" } else { "off" });
            }
            HostCommand::Export => {
                log_block_start!("Current settings:");
                for line in self.context.export_settings().lines() {
                    log_indented!("{}", line);
                }
            }
            HostCommand::Reset => {
                self.context.reset_settings();
                log_block_start!("Settings reset to defaults");
                self.context.settings().log_summary();
            }
            HostCommand::Quit => return false,
        }
        true
    }

    fn start(&mut self) {
        match self.context.start() {
            Ok(()) => {
                log_block_start!("Night light started");
                log_indented!("Next wake: {}", self.context.format_next_wake_time());
                log_indented!("{}", self.context.status_message());
            }
            Err(e) => {
                log_pipe!();
                log_error!("Failed to start night light: {:#}", e);
            }
        }
    }

    fn stop(&mut self) {
        self.context.stop();
        log_block_start!("Night light stopped");
    }

    fn log_status(&self) {
        let engine = self.context.engine();
        log_block_start!(
            "{} {}",
            engine.current_phase().symbol(),
            self.context.status_message()
        );
        log_indented!(
            "Color: {} at {:.0}% brightness",
            engine.current_color(),
            self.context.current_brightness() * 100.0
        );
        if engine.is_active() {
            log_indented!("Time remaining: {}", self.context.format_time_remaining());
            log_indented!("Next wake: {}", self.context.format_next_wake_time());
        }
    }

    /// Log phase changes and, in debug mode, settings writes.
    fn drain_events(&mut self) {
        while let Ok(event) = self.engine_events.try_recv() {
            if let NightLightEvent::PhaseChanged { from_phase, to_phase } = event
                && self.context.engine().is_active()
                && !self.context.engine().is_preview_mode()
            {
                log_block_start!(
                    "{} {} phase (was {})",
                    to_phase.symbol(),
                    to_phase,
                    from_phase
                );
                log_indented!("{}", self.context.status_message());
            }
        }

        while let Ok(event) = self.settings_events.try_recv() {
            if self.debug_enabled && matches!(event, NightLightEvent::SettingsChanged { .. }) {
                log_pipe!();
                log_debug!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{LightColor, LightPhase};
    use crate::settings::SettingsModel;
    use crate::time::source::{ManualTimeSource, TimeSource, local_datetime};
    use serial_test::serial;
    use std::sync::Arc;

    fn core_at(hour: u32, minute: u32) -> (Core, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::at(2025, 4, 7, hour, minute, 0));
        let context = NightLightContext::new(SettingsModel::detached(), clock.clone());
        let core = Core::new(CoreParams {
            context,
            signal_state: SignalState::detached(),
            debug_enabled: false,
            autostart: false,
        });
        (core, clock)
    }

    #[test]
    #[serial]
    fn test_commands_drive_the_context() {
        crate::logger::Log::set_enabled(false);
        let (mut core, _) = core_at(5, 0);

        assert!(core.handle_message(SignalMessage::Command(HostCommand::Start)));
        assert!(core.context().engine().is_active());

        assert!(core.handle_message(SignalMessage::Command(HostCommand::Preview(
            LightColor::Pink
        ))));
        assert_eq!(core.context().engine().current_color(), LightColor::Pink);

        assert!(core.handle_message(SignalMessage::Command(HostCommand::EndPreview)));
        assert_eq!(core.context().engine().current_phase(), LightPhase::Night);

        assert!(core.handle_message(SignalMessage::Command(HostCommand::Toggle)));
        assert!(!core.context().engine().is_active());

        assert!(!core.handle_message(SignalMessage::Command(HostCommand::Quit)));
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    #[serial]
    fn test_settings_commands_validate() {
        crate::logger::Log::set_enabled(false);
        let (mut core, _) = core_at(5, 0);

        core.handle_message(SignalMessage::Command(HostCommand::WakeTime(
            "24:00".to_string(),
        )));
        core.handle_message(SignalMessage::Command(HostCommand::WakeDuration(45)));
        core.handle_message(SignalMessage::Command(HostCommand::Brightness(
            LightColor::Blue,
            140,
        )));

        let settings = core.context().settings();
        assert_eq!(settings.wake_time, "06:30");
        assert_eq!(settings.wake_duration, 45);
        assert_eq!(settings.brightness.blue, 70);
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    #[serial]
    fn test_stale_tick_after_restart_is_dropped() {
        crate::logger::Log::set_enabled(false);
        let (mut core, clock) = core_at(6, 0);

        core.handle_message(SignalMessage::Command(HostCommand::Start));
        let stale = core.context().engine().timer_info();
        core.handle_message(SignalMessage::Command(HostCommand::Stop));
        core.handle_message(SignalMessage::Command(HostCommand::Start));

        clock.set(local_datetime(2025, 4, 7, 6, 40, 0));
        core.handle_message(SignalMessage::Tick { generation: 1 });
        assert_eq!(core.context().engine().current_phase(), LightPhase::Night);
        assert_eq!(core.context().timer_info().next_wake_time, stale.next_wake_time);

        core.handle_message(SignalMessage::Tick { generation: 2 });
        assert_eq!(core.context().engine().current_phase(), LightPhase::Wake);
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    #[serial]
    fn test_shutdown_message_ends_session() {
        crate::logger::Log::set_enabled(false);
        let (mut core, clock) = core_at(5, 0);
        assert!(!core.handle_message(SignalMessage::Shutdown));
        assert!(!clock.is_ended());
        crate::logger::Log::set_enabled(true);
    }

    #[test]
    #[serial]
    fn test_execute_returns_after_quit() {
        crate::logger::Log::set_enabled(false);
        let (core, _) = core_at(5, 0);
        core.signal_state
            .signal_sender
            .send(SignalMessage::Command(HostCommand::Quit))
            .unwrap();
        assert!(core.execute().is_ok());
        crate::logger::Log::set_enabled(true);
    }
}
