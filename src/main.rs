use clap::Parser;
use volscale::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    volscale::logging::init_logging();
    run(Cli::parse())
}
