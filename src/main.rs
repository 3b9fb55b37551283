use boardwalk::cli::commands::Cli;
use boardwalk::cli::handlers;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    boardwalk::logging::init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
