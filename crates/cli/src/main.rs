//! `crewconnect` command-line front end
//!
//! Adds CrewConnect accounts interactively and exposes the per-account
//! services (unstaffed flight search, flight calendar, background refresh).

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crewconnect_domain::Config;
use crewconnect_infra::config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crewconnect")]
#[command(about = "APM CrewConnect crew-scheduling client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (JSON or TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Config entry file (overrides config)
    #[arg(long, global = true, env = "CREWCONNECT_ENTRIES_PATH")]
    entries: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an account through the interactive authorization flow
    Setup {
        /// Backend host; prompted for when omitted
        #[arg(long)]
        host: Option<String>,
    },
    /// List configured accounts
    Entries,
    /// Refresh tokens and profile of the configured accounts
    Refresh {
        /// Only this config entry
        #[arg(long)]
        entry: Option<String>,
    },
    /// Search flights with vacant crew positions
    FindUnstaffedFlights {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Aircraft type code (73H, 32N)
        #[arg(long)]
        aircraft_type: Option<String>,
        /// Crew role code (CDB, OPL, SUPT, INS, CC, CA, SUPC, SOL)
        #[arg(long)]
        role: Option<String>,
        /// Account to search with; the last configured one otherwise
        #[arg(long)]
        entry: Option<String>,
    },
    /// Show upcoming flights as calendar events
    Calendar {
        /// Days to look ahead
        #[arg(long, default_value_t = 7)]
        days: i64,
        /// Only this config entry
        #[arg(long)]
        entry: Option<String>,
    },
    /// Refresh every account periodically until interrupted
    Watch,
    /// Remove an account
    Remove {
        /// Config entry id
        entry: String,
    },
}

fn init_tracing(debug: bool) {
    let env_filter = if debug {
        EnvFilter::new("crewconnect_core=debug,crewconnect_infra=debug,crewconnect_cli=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_from_file(Some(path.clone()))
            .with_context(|| format!("loading {}", path.display()))?,
        None => config::load().context("loading configuration")?,
    };

    if let Some(entries) = &cli.entries {
        config.storage.entries_path = entries.display().to_string();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    debug!(entries_path = %config.storage.entries_path, "Configuration loaded");
    let integration = commands::build_integration(&config)?;

    match cli.command {
        Commands::Setup { host } => commands::setup(&integration, host).await,
        Commands::Entries => commands::list_entries(&integration),
        Commands::Refresh { entry } => commands::refresh(&integration, entry.as_deref()).await,
        Commands::FindUnstaffedFlights { start_date, end_date, aircraft_type, role, entry } => {
            let params = commands::SearchParams { start_date, end_date, aircraft_type, role };
            commands::find_unstaffed_flights(&integration, params, entry.as_deref()).await
        }
        Commands::Calendar { days, entry } => {
            commands::calendar(&integration, days, entry.as_deref()).await
        }
        Commands::Watch => commands::watch(&integration, &config).await,
        Commands::Remove { entry } => commands::remove(&integration, &entry),
    }
}
