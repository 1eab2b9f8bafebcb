//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use wayfind_cli::CliError;

fn main() {
    match wayfind_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("wayfind: {err}");
            std::process::exit(1);
        }
    }
}
