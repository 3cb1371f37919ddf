//! Campaign dialer server binary

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dialer_config::load_settings;
use dialer_core::{
    InMemoryLeadRepository, RoundRobinPhonePool, StubVoiceProvider, VoiceProvider,
};
use dialer_engine::HttpVoiceProvider;
use dialer_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dialer=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1);
    let settings = load_settings(config_path.as_deref())?;

    let repo = Arc::new(InMemoryLeadRepository::new());

    let provider: Arc<dyn VoiceProvider> = if settings.provider.base_url.is_empty() {
        tracing::warn!("No provider base_url configured; using the stub provider");
        Arc::new(StubVoiceProvider::accepting())
    } else {
        Arc::new(HttpVoiceProvider::new(settings.provider.clone())?)
    };

    let pool = Arc::new(RoundRobinPhonePool::new(settings.pool.phone_ids.clone()));
    let metrics = init_metrics()?;

    let state = AppState::new(settings.clone(), repo, provider, pool, Some(metrics));
    let app = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "campaign-dialer listening");
    axum::serve(listener, app).await?;

    Ok(())
}
