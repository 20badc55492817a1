//! tabtree CLI - replay and inspect browser tab trees
//!
//! Usage: tabtree <COMMAND>
//!
//! Commands:
//!   replay  Replay a session log and print the resulting tree
//!   check   Verify a snapshot file

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabtree::config::{ConfigWarning, EngineConfig};
use tabtree::presentation::{Cli, Commands};

mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Replay {
            events,
            snapshot,
            save,
            search,
            commands,
        } => commands::replay::cmd_replay(
            config,
            commands::replay::ReplayArgs {
                events,
                snapshot,
                save,
                search,
                commands,
            },
            cli.json,
            cli.quiet,
        ),
        Commands::Check { snapshot } => commands::check::cmd_check(&snapshot, cli.json),
    }
}

/// `TABTREE_LOG` wins over the verbosity flags. Logs go to stderr.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_env("TABTREE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("tabtree={}", cli.log_level())));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let (config, warnings) = match &cli.config {
        Some(path) => {
            let (config, warnings) = EngineConfig::load_with_warnings(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (tabtree::config::with_env_overrides(config), warnings)
        }
        None => EngineConfig::load_or_default(None),
    };
    print_config_warnings(&warnings, cli.quiet);
    Ok(config)
}

fn print_config_warnings(warnings: &[ConfigWarning], quiet: bool) {
    if quiet {
        return;
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}
