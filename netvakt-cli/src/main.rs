//! ## netvakt-cli
//! **Operational entry point**
//!
//! Live capture mode supervises the external capture tool; replay mode
//! feeds a saved capture-output file through the same pipeline.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
