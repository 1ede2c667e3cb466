//! Greeks CLI - Command Line Operations for Bump-and-Revalue Risk
//!
//! # Commands
//!
//! - `greeks demo` - Run every configured metric over a synthetic book
//! - `greeks check` - Resolve and validate the layered configuration
//!
//! Configuration is layered CLI > environment (`GREEKS_*`) > TOML file >
//! defaults. `RUST_LOG` takes precedence over the configured log level.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use risk_greeks::{build_config, CliOverrides, RiskConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;

pub use error::{CliError, Result};

use commands::output::OutputFormat;

/// Bump-and-revalue Greeks CLI
#[derive(Parser)]
#[command(name = "greeks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reporting currency (overrides config and environment)
    #[arg(long, global = true)]
    reporting_ccy: Option<String>,

    /// Worker threads; 0 uses the global pool
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured metrics over a synthetic market and book
    Demo {
        /// Number of trades in the synthetic book
        #[arg(short = 'n', long, default_value = "8")]
        trades: usize,

        /// Output format (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Aggregate over trades
        #[arg(short, long)]
        summary: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve and validate configuration
    Check,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_file: self.config.clone(),
            reporting_currency: self.reporting_ccy.clone(),
            num_threads: self.threads,
            log_level: if self.verbose {
                Some("debug".to_string())
            } else {
                self.log_level.clone()
            },
        }
    }
}

fn init_tracing(config: &RiskConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli.overrides())?;
    init_tracing(&config);
    info!(
        reporting_ccy = %config.reporting_currency,
        metrics = config.metrics.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Demo {
            trades,
            format,
            summary,
            output,
        } => commands::demo::run(&config, trades, format, summary, output.as_deref()),
        Commands::Check => commands::check::run(&config),
    }
}
