//! Line-based command input for interactive sessions.
//!
//! One command per line on stdin. The reader thread parses each line and
//! posts it to the core loop; malformed lines are reported and skipped.

use anyhow::{Context, Result, bail};
use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crate::io::signals::SignalMessage;
use crate::light::LightColor;

/// A command typed by the user during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Stop,
    Toggle,
    Preview(LightColor),
    EndPreview,
    Status,
    WakeTime(String),
    WakeDuration(u32),
    Brightness(LightColor, u32),
    Sound(bool),
    Export,
    Reset,
    Quit,
}

impl FromStr for HostCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            bail!("No command given");
        };
        let args: Vec<&str> = words.collect();

        let parsed = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("start", []) => Self::Start,
            ("stop", []) => Self::Stop,
            ("toggle", []) => Self::Toggle,
            ("preview", [color]) => Self::Preview(color.parse()?),
            ("end-preview", []) => Self::EndPreview,
            ("status", []) => Self::Status,
            ("wake", [time]) => Self::WakeTime(time.to_string()),
            ("duration", [minutes]) => Self::WakeDuration(
                minutes
                    .parse()
                    .with_context(|| format!("'{minutes}' is not a number of minutes"))?,
            ),
            ("brightness", [color, percent]) => Self::Brightness(
                color.parse()?,
                percent
                    .parse()
                    .with_context(|| format!("'{percent}' is not a percentage"))?,
            ),
            ("sound", [flag]) => Self::Sound(parse_switch(flag)?),
            ("export", []) => Self::Export,
            ("reset", []) => Self::Reset,
            ("quit" | "exit", []) => Self::Quit,
            (
                "start" | "stop" | "toggle" | "preview" | "end-preview" | "status" | "wake"
                | "duration" | "brightness" | "sound" | "export" | "reset" | "quit" | "exit",
                _,
            ) => bail!("Wrong arguments for '{command}'\n{}", usage()),
            _ => bail!("Unknown command: {command}\n{}", usage()),
        };

        Ok(parsed)
    }
}

fn parse_switch(flag: &str) -> Result<bool> {
    match flag.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => bail!("Expected on or off, got '{flag}'"),
    }
}

/// Command summary shown for malformed input.
pub fn usage() -> &'static str {
    "Commands: start, stop, toggle, preview <white|blue|pink>, end-preview, status, \
     wake <HH:MM>, duration <1-60>, brightness <color> <0-100>, sound <on|off>, \
     export, reset, quit"
}

/// Read commands from stdin on a background thread until end of input or
/// until the core loop goes away.
pub fn spawn_stdin_reader(sender: Sender<SignalMessage>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || read_commands(std::io::stdin().lock(), &sender))
        .context("Failed to start the input reader thread")
}

/// Parse every non-empty line of `input` and forward it to `sender`.
pub fn read_commands(input: impl BufRead, sender: &Sender<SignalMessage>) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<HostCommand>() {
            Ok(command) => {
                if sender.send(SignalMessage::Command(command)).is_err() {
                    break;
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("{}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Cursor;
    use std::sync::mpsc::channel;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse::<HostCommand>().unwrap(), HostCommand::Start);
        assert_eq!("  TOGGLE ".parse::<HostCommand>().unwrap(), HostCommand::Toggle);
        assert_eq!("end-preview".parse::<HostCommand>().unwrap(), HostCommand::EndPreview);
        assert_eq!("exit".parse::<HostCommand>().unwrap(), HostCommand::Quit);
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            "preview blue".parse::<HostCommand>().unwrap(),
            HostCommand::Preview(LightColor::Blue)
        );
        assert_eq!(
            "wake 7:05".parse::<HostCommand>().unwrap(),
            HostCommand::WakeTime("7:05".to_string())
        );
        assert_eq!(
            "duration 45".parse::<HostCommand>().unwrap(),
            HostCommand::WakeDuration(45)
        );
        assert_eq!(
            "brightness pink 20".parse::<HostCommand>().unwrap(),
            HostCommand::Brightness(LightColor::Pink, 20)
        );
        assert_eq!("sound on".parse::<HostCommand>().unwrap(), HostCommand::Sound(true));
        assert_eq!("sound off".parse::<HostCommand>().unwrap(), HostCommand::Sound(false));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<HostCommand>().is_err());
        assert!("dance".parse::<HostCommand>().is_err());
        assert!("start now".parse::<HostCommand>().is_err());
        assert!("preview green".parse::<HostCommand>().is_err());
        assert!("duration ten".parse::<HostCommand>().is_err());
        assert!("brightness blue".parse::<HostCommand>().is_err());
        assert!("sound maybe".parse::<HostCommand>().is_err());
    }

    #[test]
    #[serial]
    fn test_read_commands_skips_bad_lines() {
        crate::logger::Log::set_enabled(false);
        let (tx, rx) = channel();

        read_commands(Cursor::new("start\n\nbogus\npreview pink\nquit\n"), &tx);

        let received: Vec<_> = rx.try_iter().collect();
        assert!(matches!(
            received.as_slice(),
            [
                SignalMessage::Command(HostCommand::Start),
                SignalMessage::Command(HostCommand::Preview(LightColor::Pink)),
                SignalMessage::Command(HostCommand::Quit),
            ]
        ));
        crate::logger::Log::set_enabled(true);
    }
}
