//! Binary entry point: parse the command line and dispatch.
//!
//! All behavior lives in the library; this file only maps a [`CliAction`]
//! to the matching handler and turns errors into an exit status.

use anyhow::Result;

use nightlight::NightLightApp;
use nightlight::args::{self, CliAction, ParsedArgs};
use nightlight::commands;
use nightlight::commands::simulate::SimulationParams;
use nightlight::common::constants::EXIT_FAILURE;
use nightlight::logger::Log;
use nightlight::{log_error_exit, log_pipe};

fn main() {
    let parsed = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed.action) {
        // Commands with machine-readable output switch logging off
        Log::set_enabled(true);
        log_pipe!();
        log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::Run { options } => NightLightApp::new(options.debug_enabled)
            .with_config_dir(options.config_dir)
            .run(),
        CliAction::Status { options, json } => {
            commands::status::handle_status_command(options.config_dir.as_deref(), json)
        }
        CliAction::Get {
            options,
            fields,
            json,
        } => commands::get::handle_get_command(options.config_dir.as_deref(), &fields, json),
        CliAction::Set { options, fields } => {
            commands::set::handle_set_command(options.config_dir.as_deref(), &fields)
        }
        CliAction::Reset { options } => {
            commands::reset::handle_reset_command(options.config_dir.as_deref())
        }
        CliAction::Export { options, file } => commands::export::handle_export_command(
            options.config_dir.as_deref(),
            file.as_deref(),
        ),
        CliAction::Import { options, file } => {
            commands::import::handle_import_command(options.config_dir.as_deref(), &file)
        }
        CliAction::Simulate {
            options,
            start_time,
            end_time,
            multiplier,
            log_file,
        } => commands::simulate::handle_simulate_command(SimulationParams {
            start_time,
            end_time,
            multiplier,
            log_file,
            config_dir: options.config_dir,
            debug_enabled: options.debug_enabled,
        }),
        CliAction::ShowHelp => commands::help::run_help_command(None),
        CliAction::ShowCommandHelp(command) => commands::help::run_help_command(Some(&command)),
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
    }
}
