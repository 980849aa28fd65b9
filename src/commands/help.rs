//! Help command: general or per-command help.

use anyhow::Result;

/// Run the help command
///
/// # Arguments
/// * `command` - Command to show help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => crate::args::display_help(),
        Some("run") => display_run_help(),
        Some("status") => super::status::display_help(),
        Some("get") => super::get::display_help(),
        Some("set") => super::set::display_help(),
        Some("reset") => super::reset::display_help(),
        Some("export") => super::export::display_help(),
        Some("import") => super::import::display_help(),
        Some("simulate") => super::simulate::display_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {}", unknown);
            crate::args::display_help();
        }
    }
    Ok(())
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Start an interactive session");
    log_block_start!("Usage: nightlight [run]");
    log_block_start!("Description:");
    log_indented!("Switches the light on with the stored wake time and follows the");
    log_indented!("schedule once per second until you quit.");
    log_block_start!("Session commands (one per line on stdin):");
    for line in crate::io::input::usage()
        .trim_start_matches("Commands: ")
        .split(", ")
    {
        log_indented!("{}", line);
    }
    log_block_start!("Signals:");
    log_indented!("SIGUSR1           Toggle the light");
    log_indented!("SIGUSR2           Reload the stored settings");
    log_indented!("SIGINT, SIGTERM   Save and exit");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: nightlight help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Command to get help for; general help when omitted");
    log_end!();
}
