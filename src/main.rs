use crate::commands::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use cuekit::tools::{check_cue, inspect_cue, normalize_cue};
use log::{info, warn};

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(cmd) => {
            let tree = inspect_cue(cmd.input_cue).await?;
            print!("{tree}");
        }
        Commands::Check(cmd) => {
            let warnings = check_cue(cmd.input_cue).await?;
            if warnings.is_empty() {
                info!("No problems found");
            }
            for warning in warnings {
                warn!("{warning}");
            }
        }
        Commands::Normalize(cmd) => normalize_cue(cmd.input_cue, cmd.output, cmd.force).await?,
    }

    Ok(())
}
