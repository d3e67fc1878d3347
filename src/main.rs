//! Pixelrick - command-line tool for turning images into fixed-palette pixel art

use std::process::ExitCode;

use pixelrick::cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    cli::run()
}
