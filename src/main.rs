//! Questionnaire client router and dev server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                    DEV SERVER                    │
//!                     │                                                  │
//!   Browser request   │  ┌────────────┐    ┌─────────────┐               │
//!   ──────────────────┼─▶│ host check │───▶│  dispatch   │               │
//!                     │  └────────────┘    └──────┬──────┘               │
//!                     │               /api/...    │   everything else    │
//!                     │              ┌────────────┴────────────┐         │
//!                     │              ▼                         ▼         │
//!                     │      ┌──────────────┐         ┌──────────────┐   │
//!                     │      │    proxy     │         │   routing    │   │
//!                     │      │ strip prefix │         │   resolver   │   │
//!                     │      └──────┬───────┘         └──────┬───────┘   │
//!                     │             │                        │           │
//!                     │             ▼                        ▼           │
//!   Backend ◀─────────┼──── forward & stream     shell page / 404 page   │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use questionnaire_router::config::{load_config, DevServerConfig};
use questionnaire_router::http::DevServer;
use questionnaire_router::lifecycle::{startup, Shutdown};
use questionnaire_router::observability::{logging, metrics};
use questionnaire_router::routing::{Params, RouteError};

#[derive(Parser)]
#[command(name = "questionnaire-router")]
#[command(about = "Client route resolver and dev server for the questionnaire app", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Route table revision (overrides router.snapshot).
    #[arg(short, long, global = true)]
    snapshot: Option<u8>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dev server (default)
    Serve,
    /// Print the route table
    Routes,
    /// Resolve a path and print the result as JSON
    Resolve { path: String },
    /// Build the path for a named route
    Href {
        name: String,
        /// Parameters as key=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DevServerConfig::default(),
    };
    if let Some(snapshot) = cli.snapshot {
        config.router.snapshot = snapshot;
    }

    logging::init(&config.observability)?;

    let routes = startup::build_router(config.router.snapshot)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, routes).await?,
        Commands::Routes => {
            let table: Vec<_> = routes.table().iter().collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        Commands::Resolve { path } => match routes.resolve(&path) {
            Ok(resolved) => println!("{}", serde_json::to_string_pretty(&resolved)?),
            Err(e) => exit_with(e),
        },
        Commands::Href { name, params } => {
            let params: Params = params.into_iter().collect();
            match routes.href(&name, &params) {
                Ok(path) => println!("{path}"),
                Err(e) => exit_with(e),
            }
        }
    }

    Ok(())
}

async fn serve(
    config: DevServerConfig,
    routes: questionnaire_router::Router,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("questionnaire-router v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        metrics::init_metrics(&config.observability.metrics_address)?;
    }

    let listener = startup::bind_listener(&config).await?;
    let server = DevServer::new(config, routes)?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn exit_with(error: RouteError) -> ! {
    eprintln!("error: {error}");
    std::process::exit(1);
}
