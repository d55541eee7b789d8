//! Configuration system for Demandcast.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit config file -> environment. CLI flags
//! are applied by the binary on top of the loaded value.

use crate::form::{Currency, CustomerType};
use chrono::NaiveDate;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory (inside the workspace) holding the workspace config.
pub const CONFIG_DIR: &str = ".demandcast";
/// Config file name, both user-level and workspace-level.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment overrides, e.g. `DEMANDCAST_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "DEMANDCAST_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub form: FormDefaults,
}

/// Where the model artifact lives. Relative paths are resolved against the workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path of the JSON model file.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    /// Zip archive the model file is extracted from when missing.
    #[serde(default = "default_archive_path")]
    pub archive: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            archive: default_archive_path(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("sales_forecaster_xgb_v1.0.json")
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("sales_forecaster_xgb_v1.0.zip")
}

/// Web form server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

/// Values the form starts out with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    #[serde(default = "default_product_code")]
    pub product_code: String,
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_sale_date")]
    pub sale_date: NaiveDate,
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default)]
    pub customer_type: CustomerType,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            product_code: default_product_code(),
            unit_price: default_unit_price(),
            currency: Currency::default(),
            country: default_country(),
            sale_date: default_sale_date(),
            hour: default_hour(),
            customer_type: CustomerType::default(),
        }
    }
}

fn default_product_code() -> String {
    "85123A".to_string()
}

fn default_unit_price() -> f64 {
    2.55
}

fn default_country() -> String {
    "united kingdom".to_string()
}

fn default_sale_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 12, 1).unwrap_or_default()
}

fn default_hour() -> u32 {
    8
}

/// Path of the user-level config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "demandcast", "demandcast")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load configuration with layered precedence:
/// 1. Environment variables (prefixed with `DEMANDCAST_`, `__` between sections)
/// 2. Explicit config file (`--config`)
/// 3. Workspace config (`.demandcast/config.toml`)
/// 4. User config (`~/.config/demandcast/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<ForecastConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ForecastConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(file) = config_file {
        // Explicit files must exist; figment would otherwise skip them silently.
        figment = figment.merge(Toml::file_exact(file));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment.extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8501);
        assert_eq!(
            config.model.path,
            PathBuf::from("sales_forecaster_xgb_v1.0.json")
        );
        assert_eq!(
            config.model.archive,
            PathBuf::from("sales_forecaster_xgb_v1.0.zip")
        );
        assert_eq!(config.form.product_code, "85123A");
        assert_eq!(config.form.unit_price, 2.55);
        assert_eq!(config.form.sale_date.to_string(), "2011-12-01");
        assert_eq!(config.form.hour, 8);
        assert_eq!(config.form.customer_type, CustomerType::Registered);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = ForecastConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ForecastConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ForecastConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.form.country, "united kingdom");
    }

    #[test]
    fn test_workspace_and_env_layers() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join(CONFIG_FILE),
            "[server]\nport = 9100\nhost = \"0.0.0.0\"\n[form]\ncurrency = \"PKR\"\n",
        )
        .unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("DEMANDCAST_SERVER__PORT", "9200");
            let config = load_config(Some(dir.path()), None).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.form.currency, Currency::Pkr);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(None, Some(&missing)).is_err());

        let present = dir.path().join("custom.toml");
        std::fs::write(&present, "[model]\npath = \"models/v2.json\"\n").unwrap();
        let config = load_config(None, Some(&present)).unwrap();
        assert_eq!(config.model.path, PathBuf::from("models/v2.json"));
    }
}
