//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use mdgate_core::error::{Result, MdGateError};

pub use schema::{GatewayConfig, GatewaySection, MetricsSection, ProviderSection};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "MDGATE_CONFIG";
/// Config file used when `MDGATE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "mdgate.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MdGateError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| MdGateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
