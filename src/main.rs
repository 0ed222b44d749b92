use clap::Parser;
use sol::cli::commands::Cli;
use sol::cli::{handlers, init_logging};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
