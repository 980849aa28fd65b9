//! Application coordinator for interactive and simulated sessions.
//!
//! Acquires the session's resources in order (settings store, signal
//! handlers, stdin reader), wires them into a [`NightLightContext`] and hands
//! control to the core loop.
//!
//! - Normal startup: `NightLightApp::new(debug_enabled).run()`
//! - Simulation: `NightLightApp::new(debug_enabled).with_clock(clock).without_headers().without_stdin().run()`

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::common::utils::private_path;
use crate::core::context::NightLightContext;
use crate::core::{Core, CoreParams};
use crate::io::input::{spawn_stdin_reader, usage};
use crate::io::signals::setup_signal_handler;
use crate::io::store::FileStore;
use crate::settings::SettingsModel;
use crate::time::source::{RealTimeSource, TimeSource};

/// Builder for configuring and running a session.
///
/// # Examples
///
/// ```no_run
/// use nightlight::NightLightApp;
///
/// # fn main() -> anyhow::Result<()> {
/// NightLightApp::new(false)
///     .with_config_dir(Some("/tmp/nightlight".to_string()))
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct NightLightApp {
    debug_enabled: bool,
    config_dir: Option<String>,
    clock: Arc<dyn TimeSource>,
    show_headers: bool,
    read_stdin: bool,
}

impl NightLightApp {
    /// Create a new runner with defaults matching a normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            config_dir: None,
            clock: Arc::new(RealTimeSource),
            show_headers: true,
            read_stdin: true,
        }
    }

    pub fn with_config_dir(mut self, config_dir: Option<String>) -> Self {
        self.config_dir = config_dir;
        self
    }

    /// Drive the session from another clock (simulation)
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Skip the version header when the caller already printed one
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Don't read session commands from stdin
    pub fn without_stdin(mut self) -> Self {
        self.read_stdin = false;
        self
    }

    /// Run the session until quit, a shutdown signal or the end of the clock.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled - showing tick and settings details");
            }
        }

        let store = FileStore::in_config_dir(self.config_dir.as_deref().map(Path::new))?;
        log_block_start!("Loading settings from {}", private_path(store.path()));
        let settings = SettingsModel::open(Box::new(store));
        settings.settings().log_summary();

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        if self.read_stdin {
            spawn_stdin_reader(signal_state.signal_sender.clone())?;
            log_block_start!("Type a command and press Enter");
            log_indented!("{}", usage());
        }

        let context = NightLightContext::new(settings, self.clock)
            .with_tick_sink(signal_state.signal_sender.clone());

        Core::new(CoreParams {
            context,
            signal_state,
            debug_enabled: self.debug_enabled,
            autostart: true,
        })
        .execute()
    }
}
