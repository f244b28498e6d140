//! Arena - Development Tools

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arena_core::data::ArenaTables;
use arena_tools::simulate::{self, SimulationOptions};
use arena_tools::ToolError;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arena-tools")]
#[command(about = "Development tools for the arena engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate tables files
    Validate {
        /// Tables file or directory of them
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Run a session headless and print the narration
    Simulate {
        /// Participants to admit
        #[arg(short, long, default_value_t = 12)]
        participants: u64,
        /// Session seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Base reward
        #[arg(long, default_value_t = 100)]
        base_reward: u64,
        /// Round cap
        #[arg(long, default_value_t = 1_000)]
        max_rounds: u32,
        /// Tables file; built-in tables when omitted
        #[arg(short, long)]
        tables: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

fn load_tables(path: Option<&Path>) -> Result<Arc<ArenaTables>, ToolError> {
    match path {
        Some(path) => Ok(Arc::new(arena_tools::validate::validate_file(path)?)),
        None => Ok(Arc::new(ArenaTables::default())),
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating tables in: {}", path.display());
            match arena_tools::validate::validate_path(&path) {
                Ok(files) => tracing::info!("Validation passed ({} files)", files.len()),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Simulate {
            participants,
            seed,
            base_reward,
            max_rounds,
            tables,
            format,
        } => {
            let options = SimulationOptions {
                participants,
                seed,
                base_reward,
                max_rounds,
            };
            let result = load_tables(tables.as_deref())
                .and_then(|tables| simulate::run(tables, &options))
                .and_then(|transcript| match format {
                    Format::Text => Ok(simulate::render_text(&transcript)),
                    Format::Json => simulate::render_json(&transcript),
                });
            match result {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    tracing::error!("Simulation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
