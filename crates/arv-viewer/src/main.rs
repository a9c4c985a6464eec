//! AR Viewer command line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use arv_core::ViewerConfig;
use arv_viewer::ReplayScript;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arv")]
#[command(about = "AR product viewer session tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a replay script and print the emitted viewer events
    Replay {
        /// Path to a .ron replay script
        script: PathBuf,
        /// Viewer configuration (.ron); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full transcript as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the default viewer configuration
    Config {
        /// Output path; prints to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arv_viewer=debug,arv_interaction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            script,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => ViewerConfig::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => ViewerConfig::default(),
            };
            let script = ReplayScript::load(&script)
                .with_context(|| format!("failed to load script {}", script.display()))?;

            let transcript = script.run(config);
            tracing::info!(
                "Replayed {} frames, {} events",
                transcript.frames,
                transcript.events.len()
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&transcript)?);
            } else {
                for event in &transcript.events {
                    let marker = if event.is_transition() { "=>" } else { "  " };
                    println!("{marker} {event:?}");
                }
            }
        }
        Commands::Config { out } => {
            let config = ViewerConfig::default();
            match out {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                }
                None => println!("{}", config.to_ron()?),
            }
        }
    }

    Ok(())
}
