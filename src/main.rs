use bakery_admin::cli::commands::{Cli, Commands};
use bakery_admin::cli::handlers;
use bakery_admin::io::logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => {
            // No subcommand → launch TUI (logs go to a file)
            if let Err(e) = bakery_admin::tui::run(cli.config.as_deref(), cli.api_url.clone(), cli.verbose) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            logging::init_stderr(cli.verbose);
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
