//! Unix signal handling and the core loop's message channel.
//!
//! Every producer (signal thread, stdin reader, ticker worker) talks to the
//! core loop through one mpsc channel of [`SignalMessage`]s. The signal
//! thread maps:
//!
//! - SIGINT, SIGTERM, SIGHUP → [`SignalMessage::Shutdown`]
//! - SIGUSR1 → toggle the light
//! - SIGUSR2 → [`SignalMessage::Reload`] (re-read persisted settings)

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::io::input::HostCommand;

/// Unified message type for everything the core loop reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Periodic tick from the ticker started with `generation`
    Tick { generation: u64 },
    /// User command (stdin or SIGUSR1)
    Command(HostCommand),
    /// Re-read persisted settings (SIGUSR2)
    Reload,
    /// Leave the session (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Both ends of the core loop's channel.
pub struct SignalState {
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned for the ticker and the input reader
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// Channel without any signal registration, for embedding and tests.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            signal_receiver,
            signal_sender,
        }
    }
}

/// Map a received signal to the message for the core loop.
fn message_for(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGUSR1 => Some(SignalMessage::Command(HostCommand::Toggle)),
        SIGUSR2 => Some(SignalMessage::Reload),
        SIGINT | SIGTERM | SIGHUP => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

fn describe(signal: i32, debug_enabled: bool) -> &'static str {
    match signal {
        SIGUSR1 => "Received toggle signal",
        SIGUSR2 => "Received settings reload signal",
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), shutting down...",
        SIGINT => "Received interrupt signal, shutting down...",
        SIGTERM => "Received termination request, shutting down...",
        SIGHUP => "Terminal disconnected, shutting down...",
        _ => "Received unexpected signal",
    }
}

/// Register signal handlers and spawn the thread forwarding them.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let sender = state.signal_sender.clone();
    thread::Builder::new()
        .name("signal-handler".into())
        .spawn(move || {
            for signal in signals.forever() {
                let Some(message) = message_for(signal) else {
                    continue;
                };

                // Nothing is left to read from a hung-up terminal
                if signal != SIGHUP {
                    log_pipe!();
                    log_info!("{}", describe(signal, debug_enabled));
                }

                if sender.send(message).is_err() {
                    // Core loop already gone
                    break;
                }
            }
        })
        .context("failed to start signal handler thread")?;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(
            message_for(SIGUSR1),
            Some(SignalMessage::Command(HostCommand::Toggle))
        );
        assert_eq!(message_for(SIGUSR2), Some(SignalMessage::Reload));
        for signal in [SIGINT, SIGTERM, SIGHUP] {
            assert_eq!(message_for(signal), Some(SignalMessage::Shutdown));
        }
        assert_eq!(message_for(0), None);
    }

    #[test]
    fn test_detached_channel_delivers() {
        let state = SignalState::detached();
        state
            .signal_sender
            .send(SignalMessage::Tick { generation: 3 })
            .unwrap();
        assert_eq!(
            state.signal_receiver.try_recv().unwrap(),
            SignalMessage::Tick { generation: 3 }
        );
    }
}
