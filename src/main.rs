//! AlarmPi - Spoken alarm clock
//!
//! Builds an alarm from a configuration file and plays it. Scheduling is left
//! to cron.

use alarmpi::alarm::AlarmBuilder;
use alarmpi::audio::SoundEngine;
use alarmpi::config::{self, AlarmConfig};
use alarmpi::event_log::EventLog;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file to use
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Alarm event log file
    #[arg(long)]
    event_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and play an alarm (default)
    Play,
    /// Build an alarm and print its script without playing it
    Build,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("⏰ AlarmPi v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.unwrap_or_else(config::config_path);

    if let Some(Commands::Init { force }) = args.command {
        if config_path.exists() && !force {
            anyhow::bail!(
                "{} already exists, use --force to overwrite",
                config_path.display()
            );
        }
        AlarmConfig::default().save(&config_path)?;
        info!("✅ Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let config = AlarmConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let events = EventLog::open(args.event_log.unwrap_or_else(EventLog::default_path));
    let driver = Arc::new(SoundEngine::new(config.media.beep.clone()));
    let mut alarm = AlarmBuilder::new(Arc::new(config), driver, events);

    match args.command {
        Some(Commands::Build) => {
            let built = alarm.build().await?;
            println!("{}", built.script);
            if let Some(song) = &built.wakeup_song {
                println!("Wakeup song: {}", song.display());
            }
        }
        _ => {
            alarm.build_and_play().await?;
            info!("✅ Alarm finished");
        }
    }

    Ok(())
}
