//! Arena host demo: runs two arenas side by side with logging collaborators.
//!
//! Usage: `arena_server [config.ron]`

use std::path::PathBuf;
use std::sync::Arc;

use arena_core::session::ArenaId;
use arena_server::providers::{FixedRoster, Providers};
use arena_server::{Orchestrator, ServerConfig, ServerError, SessionRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ROSTERS: [&[&str]; 2] = [
    &["Katniss", "Peeta", "Cato", "Clove", "Rue", "Thresh", "Foxface", "Marvel"],
    &["Finnick", "Johanna", "Beetee", "Wiress", "Mags", "Gloss"],
];

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Arena Server");

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(&PathBuf::from(path))?,
        None => ServerConfig {
            pacing_scale: 0.05,
            ..ServerConfig::default()
        },
    };
    let tables = config.load_tables()?;
    let orchestrator = Orchestrator::new(
        SessionRegistry::new(),
        tables,
        config,
        Providers::logging(),
    );

    let mut tasks = Vec::new();
    for (arena, roster) in (1u64..).zip(ROSTERS) {
        let recruiter = Arc::new(FixedRoster::from_names(roster));
        let (_handle, task) = orchestrator.launch(ArenaId(arena), recruiter)?;
        tasks.push(task);
    }

    for task in tasks {
        match task.await {
            Ok(status) => tracing::info!(?status, "Arena closed"),
            Err(e) => tracing::error!(error = %e, "Session task panicked"),
        }
    }
    Ok(())
}
