//! Command-line argument parsing.
//!
//! Global flags (`--debug`, `--config-dir`, `--help`, `--version`) may appear
//! anywhere on the command line. The first positional argument selects the
//! command; everything after it belongs to the command. Without a command the
//! interactive session runs.

use crate::common::constants::{
    DEFAULT_SIMULATION_MULTIPLIER, MAXIMUM_SIMULATION_MULTIPLIER, MINIMUM_SIMULATION_MULTIPLIER,
};
use crate::time::source::parse_datetime;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Interactive session driven by stdin and signals
    Run { options: CommonOptions },
    /// One-shot status for the current moment
    Status { options: CommonOptions, json: bool },
    /// Print settings fields (all of them when `fields` is empty)
    Get {
        options: CommonOptions,
        fields: Vec<String>,
        json: bool,
    },
    /// Update settings fields from `field=value` pairs
    Set {
        options: CommonOptions,
        fields: Vec<(String, String)>,
    },
    /// Restore the default settings
    Reset { options: CommonOptions },
    /// Write the settings as JSON to a file, or to stdout
    Export {
        options: CommonOptions,
        file: Option<String>,
    },
    /// Replace the settings with a JSON file
    Import { options: CommonOptions, file: String },
    /// Run a session on an accelerated clock
    Simulate {
        options: CommonOptions,
        start_time: String,
        end_time: String,
        /// 0.0 means fast-forward
        multiplier: f64,
        log_file: Option<String>,
    },

    ShowHelp,
    ShowCommandHelp(String),
    ShowVersion,
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

const COMMANDS: [&str; 9] = [
    "run", "status", "get", "set", "reset", "export", "import", "simulate", "help",
];

/// Flags that only some commands accept.
#[derive(Default)]
struct CommandFlags {
    json: bool,
    fast_forward: bool,
    log_file: Option<String>,
}

impl ParsedArgs {
    /// Parse command-line arguments, including the program name in front.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ParsedArgs {
            action: parse_action(args.into_iter().skip(1).map(|s| s.as_ref().to_string())),
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn parse_action(args: impl Iterator<Item = String>) -> CliAction {
    let mut options = CommonOptions::default();
    let mut flags = CommandFlags::default();
    let mut display_help = false;
    let mut display_version = false;
    let mut error_found = false;
    let mut positional: Vec<String> = Vec::new();

    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => display_help = true,
            "--version" | "-V" | "-v" => display_version = true,
            "--debug" | "-d" => options.debug_enabled = true,
            "--json" => flags.json = true,
            "--fast-forward" => flags.fast_forward = true,
            "--config-dir" | "-c" => match args.next_if(|next| !next.starts_with('-')) {
                Some(dir) => options.config_dir = Some(dir),
                None => {
                    log_warning!("Missing directory for --config-dir. Usage: --config-dir <dir>");
                    error_found = true;
                }
            },
            "--log" => match args.next_if(|next| !next.starts_with('-')) {
                Some(file) => flags.log_file = Some(file),
                None => {
                    log_warning!("Missing file for --log. Usage: --log <file>");
                    error_found = true;
                }
            },
            other if other.starts_with('-') && other.len() > 1 && !is_negative_number(other) => {
                log_warning!("Unknown option: {}", other);
                error_found = true;
            }
            _ => positional.push(arg),
        }
    }

    let (command, rest) = match positional.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => ("run", &[][..]),
    };

    if display_version {
        return CliAction::ShowVersion;
    }
    if display_help {
        return if positional.is_empty() {
            CliAction::ShowHelp
        } else {
            CliAction::ShowCommandHelp(command.to_string())
        };
    }
    if error_found {
        return CliAction::ShowHelpDueToError;
    }

    if !COMMANDS.contains(&command) {
        log_warning!("Unknown command: {}", command);
        return CliAction::ShowHelpDueToError;
    }
    if !flags_allowed(command, &flags) {
        return CliAction::ShowHelpDueToError;
    }

    match command {
        "run" => no_arguments(command, rest, CliAction::Run { options }),
        "status" => no_arguments(
            command,
            rest,
            CliAction::Status {
                options,
                json: flags.json,
            },
        ),
        "reset" => no_arguments(command, rest, CliAction::Reset { options }),
        "get" => CliAction::Get {
            options,
            fields: rest.to_vec(),
            json: flags.json,
        },
        "set" => parse_set(options, rest),
        "export" => match rest {
            [] => CliAction::Export {
                options,
                file: None,
            },
            [file] => CliAction::Export {
                options,
                file: Some(file.clone()),
            },
            _ => {
                log_warning!("Too many arguments. Usage: nightlight export [FILE]");
                CliAction::ShowHelpDueToError
            }
        },
        "import" => match rest {
            [file] => CliAction::Import {
                options,
                file: file.clone(),
            },
            _ => {
                log_warning!("Expected one file. Usage: nightlight import <FILE>");
                CliAction::ShowHelpDueToError
            }
        },
        "simulate" => parse_simulate(options, flags, rest),
        "help" => match rest {
            [] => CliAction::ShowHelp,
            [topic] => CliAction::ShowCommandHelp(topic.clone()),
            _ => {
                log_warning!("Usage: nightlight help [COMMAND]");
                CliAction::ShowHelpDueToError
            }
        },
        _ => CliAction::ShowHelpDueToError,
    }
}

// Multipliers are positional, so "-5" must reach the range check
fn is_negative_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

fn flags_allowed(command: &str, flags: &CommandFlags) -> bool {
    if flags.json && !matches!(command, "status" | "get") {
        log_warning!("--json is only supported by 'status' and 'get'");
        return false;
    }
    if (flags.fast_forward || flags.log_file.is_some()) && command != "simulate" {
        log_warning!("--fast-forward and --log are only supported by 'simulate'");
        return false;
    }
    true
}

fn no_arguments(command: &str, rest: &[String], action: CliAction) -> CliAction {
    if rest.is_empty() {
        action
    } else {
        log_warning!("'{}' takes no arguments, got: {}", command, rest.join(" "));
        CliAction::ShowHelpDueToError
    }
}

fn parse_set(options: CommonOptions, rest: &[String]) -> CliAction {
    if rest.is_empty() {
        log_warning!("Missing field. Usage: nightlight set <field>=<value> [<field>=<value>...]");
        log_indented!("Example: nightlight set wake_time=07:15 brightness.blue=50");
        return CliAction::ShowHelpDueToError;
    }

    let mut fields = Vec::with_capacity(rest.len());
    for pair in rest {
        match pair.split_once('=') {
            Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                fields.push((field.to_string(), value.to_string()));
            }
            _ => {
                log_warning!("Expected <field>=<value>, got '{}'", pair);
                return CliAction::ShowHelpDueToError;
            }
        }
    }

    CliAction::Set { options, fields }
}

fn parse_simulate(options: CommonOptions, flags: CommandFlags, rest: &[String]) -> CliAction {
    let usage = "Usage: nightlight simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" \
                 [multiplier | --fast-forward] [--log <file>]";

    let (start_time, end_time, multiplier) = match rest {
        [start, end] => (start, end, None),
        [start, end, multiplier] => (start, end, Some(multiplier)),
        _ => {
            log_warning!("Missing or extra arguments for simulate. {}", usage);
            return CliAction::ShowHelpDueToError;
        }
    };

    for (label, value) in [("start", start_time), ("end", end_time)] {
        if let Err(e) = parse_datetime(value) {
            log_error!("Invalid {} time: {}", label, e);
            return CliAction::ShowHelpDueToError;
        }
    }

    let multiplier = match (multiplier, flags.fast_forward) {
        (Some(_), true) => {
            log_warning!("Give either a multiplier or --fast-forward, not both");
            return CliAction::ShowHelpDueToError;
        }
        (None, true) => 0.0,
        (None, false) => DEFAULT_SIMULATION_MULTIPLIER,
        (Some(raw), false) => match raw.parse::<f64>() {
            Ok(value)
                if (MINIMUM_SIMULATION_MULTIPLIER..=MAXIMUM_SIMULATION_MULTIPLIER)
                    .contains(&value) =>
            {
                value
            }
            _ => {
                log_error!(
                    "Invalid multiplier: {}. Must be between {} and {}.",
                    raw,
                    MINIMUM_SIMULATION_MULTIPLIER,
                    MAXIMUM_SIMULATION_MULTIPLIER
                );
                return CliAction::ShowHelpDueToError;
            }
        },
    };

    CliAction::Simulate {
        options,
        start_time: start_time.clone(),
        end_time: end_time.clone(),
        multiplier,
        log_file: flags.log_file,
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_end!();
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("nightlight [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config-dir <dir>  Use a custom configuration directory");
    log_indented!("-d, --debug             Enable detailed debug output");
    log_indented!("-h, --help              Print help information");
    log_indented!("-V, --version           Print version information");
    log_block_start!("Commands:");
    log_indented!("run                     Start an interactive session (default)");
    log_indented!("status [--json]         Show the schedule for the current moment");
    log_indented!("get [<field>...]        Read settings field(s)");
    log_indented!("set <field>=<value>...  Update settings field(s)");
    log_indented!("reset                   Restore the default settings");
    log_indented!("export [FILE]           Write the settings as JSON");
    log_indented!("import <FILE>           Replace the settings from a JSON file");
    log_indented!("simulate <start> <end>  Run a session on an accelerated clock");
    log_indented!("help [COMMAND]          Show detailed help for a command");
    log_end!();
}
