//! Application state

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use dialer_config::Settings;
use dialer_core::{LeadRepository, PhonePool, VoiceProvider};
use dialer_engine::PacingScheduler;
use dialer_webhook::WebhookIngestor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub repo: Arc<dyn LeadRepository>,
    pub pool: Arc<dyn PhonePool>,
    pub scheduler: Arc<PacingScheduler>,
    pub ingestor: Arc<WebhookIngestor>,
    /// Absent in tests, where no global recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        repo: Arc<dyn LeadRepository>,
        provider: Arc<dyn VoiceProvider>,
        pool: Arc<dyn PhonePool>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let scheduler = Arc::new(PacingScheduler::new(
            repo.clone(),
            provider,
            settings.pacing.clone(),
        ));
        let ingestor = Arc::new(WebhookIngestor::new(repo.clone()));
        Self {
            settings,
            repo,
            pool,
            scheduler,
            ingestor,
            metrics,
        }
    }
}
