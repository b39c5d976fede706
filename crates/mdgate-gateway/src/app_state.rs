//! Shared application state for the market-data gateway.

use std::sync::Arc;

use mdgate_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::MarketDataMetrics;
use crate::provider::{InstrumentedProvider, MarketDataProvider, YahooProvider};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    metrics: Arc<MarketDataMetrics>,
    provider: Arc<dyn MarketDataProvider>,
}

impl AppState {
    /// Production wiring: fresh metric registry + instrumented Yahoo client.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let metrics = Arc::new(MarketDataMetrics::new());
        let yahoo = YahooProvider::new(&cfg.provider)?;
        let provider = Arc::new(InstrumentedProvider::new(yahoo, Arc::clone(&metrics)));
        tracing::info!(provider = provider.id(), base_url = %cfg.provider.base_url, "market data provider ready");
        Ok(Self::with_provider(cfg, metrics, provider))
    }

    /// Wire an arbitrary provider. The caller decides whether it is instrumented.
    pub fn with_provider(
        cfg: GatewayConfig,
        metrics: Arc<MarketDataMetrics>,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, metrics, provider }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MarketDataMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn provider(&self) -> Arc<dyn MarketDataProvider> {
        Arc::clone(&self.inner.provider)
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
