//! cflab CLI: caller identity report and stack synthesis.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cflab",
    version,
    about = "Cloud foundation lab: caller identity report and bucket/table stack synthesis"
)]
struct Cli {
    #[command(subcommand)]
    command: cflab::cli::Commands,
}

#[tokio::main]
async fn main() {
    cflab::logging::init();
    let cli = Cli::parse();
    if let Err(e) = cflab::cli::dispatch(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
