mod cli;

use crate::cli::CliCommand;

fn main() {
    // Logging is initialized inside once the config is loaded.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("vspte error: {:#}", err);
        std::process::exit(1);
    }
}
