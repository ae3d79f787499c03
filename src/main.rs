use clap::Parser;
use breadfree::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
