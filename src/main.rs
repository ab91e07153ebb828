//! multipointer - headless pointer multiplexing driver
//!
//! Entry point for the headless binary: reads host events as JSON lines
//! from stdin, runs them through the multiplexing service against the
//! static zone layout from the config file, and writes every published
//! snapshot as one JSON line to stdout.

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multipointer::config::Config;
use multipointer::zones::StaticSurfaceProvider;
use multipointer::{HostEvent, MultiplexerService, Point};

/// Command-line arguments for multipointer
#[derive(Parser, Debug)]
#[command(name = "multipointer")]
#[command(version, about = "Multi-device pointer multiplexing driver", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/multipointer/config.toml")]
    pub config: String,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {:#}, using defaults", e);
        Config::default()
    });

    // CLI verbosity wins over the config file
    let log_level = match args.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    init_logging(&args, &log_level)?;

    info!("multipointer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: {} static zones, liveness {} ms",
        config.zones.layout.len(),
        config.tracker.liveness_window_ms
    );

    // Static zones from the config file back the headless session
    let surfaces = config
        .zones
        .layout
        .iter()
        .map(|zone| zone.to_surface())
        .collect();
    let provider = StaticSurfaceProvider::new(Point::default(), surfaces);

    let handle = MultiplexerService::new(config, provider).start();

    // Print every published snapshot as one JSON line
    let mut snapshots = handle.snapshots();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize snapshot: {}", e),
            }
        }
    });

    // Feed stdin events until EOF
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostEvent>(&line) {
            Ok(event) => {
                if handle.send(event).await.is_err() {
                    break;
                }
            }
            // Malformed input is an anomaly, not an error condition
            Err(e) => warn!("Ignoring malformed event line: {}", e),
        }
    }

    info!("Input stream ended, shutting down");
    handle.shutdown().await?;
    printer.abort();

    Ok(())
}

fn init_logging(args: &Args, log_level: &str) -> Result<()> {
    use std::fs::File;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("multipointer={level},warn", level = log_level))
    });

    // Logs go to stderr; stdout carries the snapshot stream
    if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)?;

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path);
    } else {
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
    }

    Ok(())
}
