mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        ishraqa_search::init_logging(cli.debug);
        return commands::init::run_init(path);
    }

    // Load config, then logging (debug toggle may come from config/env)
    let mut config = config::load_config(cli.config.as_deref())?;
    if cli.debug {
        config.backend.debug = true;
    }
    ishraqa_search::init_logging(config.backend.debug);

    match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Search {
            query,
            index,
            page,
            hits_per_page,
            sort,
            filters,
            json,
        } => {
            let args = commands::search::SearchArgs {
                query,
                index,
                page,
                hits_per_page,
                sort,
                filters,
                json,
            };
            commands::search::execute(args, &config).await?;
        }
        Commands::Serve { host, port } => {
            commands::serve::execute(host, port, &config).await?;
        }
    }

    Ok(())
}
