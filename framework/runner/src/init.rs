use crate::cli::BenchCli;
use clap::Parser;

/// Initialise logging and parse the command line.
///
/// Log output is controlled with `RUST_LOG`, defaulting to `info`.
pub fn init() -> BenchCli {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    BenchCli::parse()
}
