use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use netvakt_config::NetvaktConfig;
use netvakt_engine::PipelineRuntime;
use netvakt_telemetry::EventLogger;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run live capture through the enrichment pipeline
    Run(RunArgs),
    /// Replay a saved capture-output file through the pipeline
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Network interface to monitor (overrides configuration)
    #[arg(short, long)]
    pub interface: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Capture-tool field output, one frame per line
    pub file: PathBuf,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = NetvaktConfig::load()?;
    EventLogger::init_with_default(&config.telemetry.log_level);

    match cli.command {
        Commands::Run(args) => {
            if let Some(interface) = args.interface {
                config.capture.interface = interface;
            }
            PipelineRuntime::new(config)?.run().await?;
        }
        Commands::Replay(args) => {
            PipelineRuntime::new(config)?.replay(&args.file).await?;
        }
    }
    Ok(())
}
