use anyhow::Result;
use clap::Parser; // needed for Cli::parse()

use flashdeck_app::cli::{commands::run_cli, opts::Cli};
use flashdeck_app::logging::setup_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    dotenv::dotenv().ok();
    setup_tracing();

    let args = Cli::parse();
    run_cli(args).await
}
