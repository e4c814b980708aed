//! mut8 - blend and generate effect presets
//!
//! Command-line front end for the mut8-core engine. It loads the taxonomy
//! from the configured presets root, hands selections to the engine and
//! reports success or failure.
//!
//! ## Usage
//!
//! - `mut8 <source1.xml> <source2.xml> <amount>`: batch interpolation into
//!   `interpolated_<amount>.xml`
//! - `mut8 list`: categories and conditions
//! - `mut8 generate <category> <condition>`: random blend into the user bucket
//! - `mut8 blend <output.xml> <file> <weight> ... [--normalize]`: weighted blend
//! - `mut8 config [--presets-root DIR] [--exclude CATEGORY]...`: show or update settings
//!
//! Set `MUT8_CONFIG` to use a config file other than the default, and
//! `RUST_LOG=debug` for verbose output.

mod cli_args;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use cli_args::Cli;

fn main() -> ExitCode {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Usage errors exit with code 2 from clap
    let cli = Cli::parse();
    log::debug!("mut8 starting: {:?}", cli);

    match commands::run(cli) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
