//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::ModelAction;
use crate::PredictArgs;
use demandcast_core::config::{CONFIG_DIR, CONFIG_FILE, FormDefaults, load_config};
use demandcast_core::gateway::{self, GatewayState};
use demandcast_core::{
    Forecast, ForecastConfig, Forecaster, ModelArtifact, ModelCache, SaleInput,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Global flags every subcommand sees.
#[derive(Debug, Clone)]
pub struct Context {
    pub workspace: PathBuf,
    pub config_file: Option<PathBuf>,
    pub model_override: Option<PathBuf>,
}

impl Context {
    /// Layered configuration with the CLI overrides applied last.
    pub fn load_config(&self) -> anyhow::Result<ForecastConfig> {
        let mut config = load_config(Some(&self.workspace), self.config_file.as_deref())
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
        if let Some(model) = &self.model_override {
            config.model.path = model.clone();
        }
        Ok(config)
    }

    fn artifact(&self, config: &ForecastConfig) -> ModelArtifact {
        ModelArtifact::from_config(&config.model, &self.workspace)
    }
}

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, context: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Predict(args) => handle_predict(args, context),
        Commands::Form { json } => handle_form(json, context),
        Commands::Serve { host, port } => handle_serve(host, port, context).await,
        Commands::Config { action } => handle_config(action, context),
        Commands::Model { action } => handle_model(action, context),
    }
}

impl PredictArgs {
    /// Fill unset flags from the form defaults.
    pub fn to_sale_input(&self, defaults: &FormDefaults) -> SaleInput {
        SaleInput {
            product_code: self
                .product
                .clone()
                .unwrap_or_else(|| defaults.product_code.clone()),
            unit_price: self.price.unwrap_or(defaults.unit_price),
            currency: self.currency.unwrap_or(defaults.currency),
            exchange_rate: self.rate.clone(),
            country: self
                .country
                .clone()
                .unwrap_or_else(|| defaults.country.clone()),
            sale_date: self.date.unwrap_or(defaults.sale_date),
            hour: self.hour.unwrap_or(defaults.hour),
            customer_type: self.customer.unwrap_or(defaults.customer_type),
        }
    }
}

fn run_forecast(input: &SaleInput, config: &ForecastConfig, context: &Context) -> anyhow::Result<Forecast> {
    let cache = ModelCache::new(context.artifact(config));
    let model = cache
        .get_or_load()
        .map_err(|e| anyhow::anyhow!("Failed to load model: {}", e))?;
    Forecaster::new(model)
        .forecast(input)
        .map_err(|e| anyhow::anyhow!("Prediction failed: {}", e))
}

fn print_forecast(forecast: &Forecast, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(forecast)?);
    } else {
        println!("{}", crate::report::render(forecast));
    }
    Ok(())
}

fn handle_predict(args: PredictArgs, context: &Context) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let input = args.to_sale_input(&config.form);
    let forecast = run_forecast(&input, &config, context)?;
    print_forecast(&forecast, args.json)
}

fn handle_form(json: bool, context: &Context) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let input = crate::wizard::prompt_sale_input(&config.form)?;
    let forecast = run_forecast(&input, &config, context)?;
    print_forecast(&forecast, json)
}

async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    context: &Context,
) -> anyhow::Result<()> {
    let config = context.load_config()?;
    let mut server = config.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let cache = ModelCache::new(context.artifact(&config));
    let state = GatewayState::new(cache, config.form.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build gateway: {}", e))?;
    // Load up front so a missing artifact is reported before the first request.
    if let Err(e) = state.model().await {
        tracing::warn!(error = %e, "Model not loaded yet; it will be retried per request");
    }

    println!(
        "Serving Demandcast on http://{}:{} (ctrl-c to stop)",
        server.host, server.port
    );
    gateway::run(Arc::new(state), &server).await?;
    Ok(())
}

fn handle_config(action: ConfigAction, context: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = init_config(&context.workspace)?;
            println!(
                "Configuration file at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = context.load_config()?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

/// Write the default config unless one exists. Returns its path either way.
fn init_config(workspace: &Path) -> anyhow::Result<PathBuf> {
    let config_dir = workspace.join(CONFIG_DIR);
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Configuration file already exists");
        return Ok(config_path);
    }

    let toml_str = toml::to_string_pretty(&ForecastConfig::default())?;
    std::fs::write(&config_path, &toml_str)?;
    tracing::info!(path = %config_path.display(), "Created default configuration");
    Ok(config_path)
}

fn handle_model(action: ModelAction, context: &Context) -> anyhow::Result<()> {
    match action {
        ModelAction::Info => {
            let config = context.load_config()?;
            let artifact = context.artifact(&config);
            let model = artifact
                .load()
                .map_err(|e| anyhow::anyhow!("Failed to load model: {}", e))?;
            println!("Model:      {}", model.name);
            if !model.version.is_empty() {
                println!("Version:    {}", model.version);
            }
            println!("File:       {}", artifact.model_path().display());
            println!("Trees:      {}", model.tree_count());
            println!("Base score: {}", model.base_score);
            println!("Features ({}):", model.features.len());
            for (idx, name) in model.features.iter().enumerate() {
                let vocab = model
                    .categories
                    .get(name)
                    .map(|v| format!("  [{} categories]", v.len()))
                    .unwrap_or_default();
                println!("  {:>2}. {}{}", idx, name, vocab);
            }
            Ok(())
        }
    }
}
