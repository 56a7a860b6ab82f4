//! todobot: chat with an AI that manages your to-do list.
//!
//! Reads one line at a time at the `>> ` prompt. Ctrl+D, Ctrl+C or an exit
//! word (`exit`, `quit`, `/exit`, `/quit`, `:q`) ends the session.

use std::path::PathBuf;

use clap::Parser;
use todobot::{BANNER, build_session, repl};
use todobot_channels::CliChannel;
use todobot_config::AppConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "todobot", about = "AI to-do list assistant", version)]
struct Cli {
    /// Config file (defaults to $TODOBOT_CONFIG or ~/.todobot/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Logs go to stderr so replies on stdout stay clean.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut session = match build_session(&config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("{BANNER}");
    let mut channel = CliChannel::stdio();

    tokio::select! {
        result = repl(&mut session, &mut channel) => {
            let turns = result?;
            info!(turns, "Session ended");
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("Interrupted");
            // The stdin reader thread is parked in a blocking read the
            // runtime cannot cancel.
            std::process::exit(130);
        }
    }

    Ok(())
}
