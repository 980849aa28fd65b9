//! # Nightlight Library
//!
//! Bedside night light simulator driven by a wake schedule.
//!
//! The light shows white through the night, blue during a configurable wake
//! window, and pink once the window has passed. This library holds the whole
//! model so the binary stays a thin CLI dispatcher and the internals can be
//! tested directly.
//!
//! ## Architecture
//!
//! - **Entry Point**: [`NightLightApp`] wires the resources of a session
//! - **Core Logic**: `core` holds the engine, the ticker, the context and the
//!   session message loop
//! - **Settings**: `settings` validates, persists and announces user settings
//! - **State**: `state` carries the snapshot and event types hosts observe
//! - **Commands**: `commands` implements the one-shot CLI subcommands
//! - **Infrastructure**: key-value store, signal handling, stdin commands,
//!   time sources and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod core;
pub mod io;
pub mod light;
pub mod settings;
pub mod state;
pub mod time;

mod nightlight;

pub use crate::core::context::NightLightContext;
pub use crate::core::engine::NightLight;
pub use light::{LightColor, LightPhase};
pub use nightlight::NightLightApp;
pub use settings::{Settings, SettingsModel};
