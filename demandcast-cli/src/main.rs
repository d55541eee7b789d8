//! Demandcast CLI: predict e-commerce sales quantities from the terminal,
//! or serve the web form.

mod commands;
mod report;
mod wizard;

use chrono::NaiveDate;
use clap::Parser;
use demandcast_core::{Currency, CustomerType};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Demandcast: sales quantity forecasting for e-commerce products
#[derive(Parser, Debug)]
#[command(name = "demandcast", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (config and model paths resolve against it)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model file to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Predict from command-line flags; unset flags use the form defaults
    Predict(PredictArgs),
    /// Fill in the form interactively, then predict
    Form {
        /// Print the forecast as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the web form and JSON API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect the model artifact
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct PredictArgs {
    /// Product code (SKU), any value
    #[arg(long)]
    product: Option<String>,
    /// Unit price in the chosen currency
    #[arg(long)]
    price: Option<f64>,
    /// Currency of the price: GBP, PKR, USD, EUR or Other
    #[arg(long)]
    currency: Option<Currency>,
    /// Exchange rate, 1 GBP = RATE units of the currency
    #[arg(long)]
    rate: Option<String>,
    /// Country of sale
    #[arg(long)]
    country: Option<String>,
    /// Sale date, YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Hour of sale, 0-23
    #[arg(long)]
    hour: Option<u32>,
    /// Customer type: registered or guest
    #[arg(long)]
    customer: Option<CustomerType>,
    /// Print the forecast as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default .demandcast/config.toml into the workspace
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(clap::Subcommand, Debug)]
enum ModelAction {
    /// Load the model and print its name, version and shape
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "demandcast", "demandcast")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "demandcast.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let context = commands::Context {
        workspace,
        config_file: cli.config,
        model_override: cli.model,
    };
    commands::handle_command(cli.command, &context).await
}
