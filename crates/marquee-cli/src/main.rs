use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{AppConfig, ScrollDirection};

mod commands;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Autoscrolling, infinitely looping carousel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the scroll direction (forward/right or backward/left)
    #[arg(short = 'd', long, global = true, value_parser = parse_direction)]
    direction: Option<ScrollDirection>,

    /// Override the scroll speed (points per nominal tick)
    #[arg(long, global = true)]
    speed: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the carousel in real time
    Run {
        /// Stop after this many seconds (runs until Ctrl+C if omitted)
        #[arg(short = 't', long)]
        seconds: Option<u64>,
        /// Simulate a short drag gesture after this many seconds
        #[arg(long)]
        drag_at: Option<u64>,
        /// Simulate selecting the leading item after this many seconds
        #[arg(long)]
        select_at: Option<u64>,
    },
    /// Step the carousel offline with a fixed frame delta
    Simulate {
        /// Number of ticks to run
        #[arg(short = 'n', long, default_value_t = 1000)]
        ticks: u32,
        /// Normalized frame delta applied on every tick
        #[arg(long, default_value_t = 1.0)]
        delta: f64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init,
    /// Print the configuration file path
    Path,
}

fn parse_direction(value: &str) -> std::result::Result<ScrollDirection, String> {
    value.parse().map_err(|e: marquee_core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;
    if let Some(direction) = cli.direction {
        config.motion.direction = direction;
    }
    if let Some(speed) = cli.speed {
        config.motion.speed = speed;
    }
    config.motion.validate()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Arc::new(config);

    match cli.command {
        Some(Commands::Run {
            seconds,
            drag_at,
            select_at,
        }) => {
            let script = commands::run::Script {
                seconds,
                drag_at,
                select_at,
            };
            commands::run::run(config, script).await
        }
        None => commands::run::run(config, commands::run::Script::default()).await,
        Some(Commands::Simulate { ticks, delta, json }) => {
            commands::simulate::run(&config, ticks, delta, json)
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init => commands::config::init(),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
