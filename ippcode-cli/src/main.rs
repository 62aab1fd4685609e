//! `ippcode`: interpret an IPPcode18 program stored in XML.
//!
//! Exit codes:
//! - 0: Success, or `--help`
//! - 10: Invalid command line
//! - 11: Source file cannot be read, or statistics file cannot be written
//! - 31, 32: Malformed program file
//! - 52-59: Runtime error
//! - 99: Output failure

use ippcode_cli::commands;
use ippcode_cli::logging::init_logging;
use ippcode_cli::{parse_options, OptionsError};
use std::process;

fn main() {
    let options = match parse_options(std::env::args_os()) {
        Ok(options) => options,
        Err(err) => {
            match &err {
                OptionsError::Clap(clap_err) => {
                    if clap_err.print().is_err() {
                        process::exit(99);
                    }
                }
                other => {
                    eprintln!("error: {other}");
                    eprintln!("Usage: ippcode --source=<file> [--stats=<file>] [--insts] [--vars]");
                }
            }
            process::exit(err.exit_code());
        }
    };

    init_logging();

    if let Err(code) = commands::run(&options) {
        process::exit(code);
    }
}
