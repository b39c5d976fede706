use std::net::SocketAddr;

use serde::Deserialize;
use mdgate_core::error::{Result, MdGateError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            provider: ProviderSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MdGateError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.provider.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on symbols in one `/stocks/batch` call.
    #[serde(default = "default_max_batch_symbols")]
    pub max_batch_symbols: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_batch_symbols: default_max_batch_symbols(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=200).contains(&self.max_batch_symbols) {
            return Err(MdGateError::BadRequest(
                "gateway.max_batch_symbols must be between 1 and 200".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| MdGateError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_max_batch_symbols() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint that hands out the session cookie needed for crumb requests.
    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_url: default_cookie_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProviderSection {
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [("provider.base_url", &self.base_url), ("provider.cookie_url", &self.cookie_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(MdGateError::BadRequest(format!("{field} must be an http(s) URL")));
            }
        }
        if !(1000..=60000).contains(&self.timeout_ms) {
            return Err(MdGateError::BadRequest(
                "provider.timeout_ms must be between 1000 and 60000".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(MdGateError::BadRequest("provider.user_agent must not be empty".into()));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".into()
}
fn default_cookie_url() -> String {
    "https://fc.yahoo.com".into()
}
fn default_timeout_ms() -> u64 {
    10000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

const RESERVED_PATHS: [&str; 2] = ["/healthz", "/readyz"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { path: default_metrics_path() }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(MdGateError::BadRequest("metrics.path must start with '/' and not be '/'".into()));
        }
        if RESERVED_PATHS.contains(&self.path.as_str()) || self.path.starts_with("/stock") {
            return Err(MdGateError::BadRequest(format!(
                "metrics.path {} collides with a gateway route",
                self.path
            )));
        }
        Ok(())
    }
}

fn default_metrics_path() -> String {
    "/metrics".into()
}
