//! HTTP Endpoints
//!
//! REST API for the campaign dialer. The webhook endpoint follows the
//! acknowledge-always contract: HTTP 200 on every delivery, with the real
//! processing result in the body, so the provider never retries and
//! duplicates stay bounded.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use dialer_core::{CampaignStats, Lead, LeadStatus};
use dialer_engine::RunStatus;

use crate::metrics::{metrics_handler, record_dispatch_started, record_webhook};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Provider webhook
        .route("/webhooks/call", post(call_webhook))
        // Dialer control
        .route("/api/dialer/start", post(start_dialer))
        .route("/api/dialer/stop", post(stop_dialer))
        .route("/api/dialer/status", get(dialer_status))
        // Leads
        .route("/api/leads", post(create_lead))
        .route("/api/leads", get(list_leads))
        .route("/api/leads/:id", get(get_lead))
        // Stats
        .route("/api/stats", get(stats))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Provider outcome webhook. Always HTTP 200; the body carries the real
/// result.
async fn call_webhook(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let ack = state.ingestor.ingest_bytes(&body).await;
    record_webhook(ack.success);
    (StatusCode::OK, Json(ack))
}

/// Start request
#[derive(Debug, Deserialize)]
struct StartRequest {
    rate: Option<u32>,
}

/// Start a pacing run
async fn start_dialer(
    State(state): State<AppState>,
    request: Option<Json<StartRequest>>,
) -> impl IntoResponse {
    let rate = request.and_then(|Json(r)| r.rate);
    match state.scheduler.start(rate).await {
        Ok(run_id) => {
            record_dispatch_started();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "success": true, "run_id": run_id })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dialer start rejected");
            let message = e.to_string();
            let status = StatusCode::from(ServerError::from(e));
            (
                status,
                Json(serde_json::json!({ "success": false, "error": message })),
            )
        }
    }
}

/// Stop the active run (idempotent)
async fn stop_dialer(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.scheduler.stop().await;
    Json(serde_json::json!({ "success": true }))
}

/// Scheduler status
async fn dialer_status(State(state): State<AppState>) -> Json<RunStatus> {
    Json(state.scheduler.status().await)
}

/// Lead intake request
#[derive(Debug, Deserialize)]
struct CreateLeadRequest {
    name: String,
    phone: String,
    campaign_id: Option<String>,
}

/// Create a lead, assigning a phone resource from the pool. With the pool
/// exhausted the lead is created `Failed` immediately and never dialed.
async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut lead = Lead::new(request.name, request.phone);
    if let Some(campaign_id) = request.campaign_id {
        lead = lead.campaign(campaign_id);
    }

    match state.pool.next_available().await {
        Ok(Some(phone_id)) => {
            lead = lead.phone_id(phone_id);
        }
        Ok(None) => {
            tracing::warn!(lead_id = %lead.id, "No phone resource available; lead failed at intake");
            lead = lead.status(LeadStatus::Failed);
        }
        Err(e) => {
            tracing::error!(error = %e, "Phone pool error");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let lead = state.repo.insert(lead).await.map_err(|e| {
        tracing::error!(error = %e, "Lead insert failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// Get one lead
async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Lead>, StatusCode> {
    state
        .repo
        .get(&id)
        .await
        .map(Json)
        .map_err(|_| StatusCode::NOT_FOUND)
}

/// List query
#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

/// List leads
async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let leads = state
        .repo
        .list(query.limit.unwrap_or(100))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Lead listing failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(serde_json::json!({
        "count": leads.len(),
        "leads": leads,
    })))
}

/// Stats query
#[derive(Debug, Deserialize)]
struct StatsQuery {
    campaign_id: Option<String>,
}

/// Campaign statistics, recomputed from current lead rows on every
/// request. Without a campaign id the active (non-campaign) pool is
/// aggregated.
async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<CampaignStats>, StatusCode> {
    let leads = state
        .repo
        .list(state.settings.pacing.snapshot_limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Stats scan failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let stats = match query.campaign_id {
        Some(ref campaign_id) => CampaignStats::compute(
            leads
                .iter()
                .filter(|l| l.campaign_id.as_deref() == Some(campaign_id.as_str())),
        ),
        None => CampaignStats::compute(leads.iter().filter(|l| l.campaign_id.is_none())),
    };
    Ok(Json(stats))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let running = state.scheduler.status().await.running;
    Json(serde_json::json!({
        "status": "ready",
        "dialer_running": running,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    use dialer_config::Settings;
    use dialer_core::{InMemoryLeadRepository, RoundRobinPhonePool, StubVoiceProvider};

    fn test_state() -> AppState {
        AppState::new(
            Settings::default(),
            Arc::new(InMemoryLeadRepository::new()),
            Arc::new(StubVoiceProvider::accepting()),
            Arc::new(RoundRobinPhonePool::new(vec!["p1".into()])),
            None,
        )
    }

    #[tokio::test]
    async fn test_router_creation() {
        let _ = create_router(test_state());
    }

    #[tokio::test]
    async fn test_webhook_returns_200_for_garbage_body() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhooks/call")
                    .body(Body::from("definitely not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ack: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ack["success"], false);
    }

    #[tokio::test]
    async fn test_start_with_no_eligible_leads_is_a_user_facing_error() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/dialer/start")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
