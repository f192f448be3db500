//! partyctl - Party command line
//!
//! - `simulate`: run one party from creation to completion with simulated members
//! - `show-config`: print the effective configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use party_runtime::PartyConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod simulate;

/// Party CLI
#[derive(Parser)]
#[command(name = "partyctl")]
#[command(about = "Party - collaborative swipe ranking", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PARTY_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides logging.level)
    #[arg(long, env = "PARTY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "PARTY_LOG_JSON", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full party with simulated members
    Simulate {
        /// Number of members, host included
        #[arg(short, long, default_value_t = 4)]
        members: u32,

        /// Seed for the simulated swipes
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Print the final rankings as JSON
        #[arg(long)]
        output_json: bool,
    },

    /// Print the effective configuration
    ShowConfig,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PartyConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config.logging.level, config.logging.json);

    match cli.command {
        Command::Simulate {
            members,
            seed,
            output_json,
        } => {
            let report = simulate::run(config, members, seed).await?;
            if output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
