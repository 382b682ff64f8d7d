//! Event Concierge CLI
//!
//! ```bash
//! concierge enable
//! concierge plan --event rustweek --interest "async runtimes and profiling"
//! concierge ask --event rustweek --question "where do I pick up my badge?"
//! concierge clear-cache --event rustweek
//! ```
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/event-concierge/config.toml)
//! 3. Environment variables (CONCIERGE_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use concierge_cli::{
    handle_ask, handle_clear_cache, handle_plan, handle_toggle, init_logging, load_settings, Cli,
    Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Plan {
            event,
            interest,
            day,
            earliest,
            max,
            boost,
        } => {
            handle_plan(&settings, &event, &interest, day, earliest, max, boost).await?;
        }
        Commands::Ask {
            event,
            question,
            top,
        } => {
            handle_ask(&settings, &event, &question, top).await?;
        }
        Commands::Enable => {
            handle_toggle(&settings, true)?;
        }
        Commands::Disable => {
            handle_toggle(&settings, false)?;
        }
        Commands::ClearCache { event } => {
            handle_clear_cache(&settings, &event).await?;
        }
    }

    Ok(())
}
