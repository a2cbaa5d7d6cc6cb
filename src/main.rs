//! yardcheck CLI entry point.

use clap::Parser;
use yardcheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    yardcheck::logging::init(cli.verbose);

    let result = match &cli.command {
        Commands::Lint(args) => cli::run_lint(args),
        Commands::Type(args) => cli::run_type(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
