//! Campaign Dialer Server
//!
//! HTTP surface over the pacing engine and webhook pipeline.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_dispatch_started, record_webhook};
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Engine error: {0}")]
    Engine(#[from] dialer_engine::EngineError),

    #[error("Repository error: {0}")]
    Repository(#[from] dialer_core::RepositoryError),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        use dialer_engine::EngineError;
        match err {
            ServerError::Engine(EngineError::NoEligibleLeads)
            | ServerError::Engine(EngineError::AlreadyRunning) => {
                axum::http::StatusCode::CONFLICT
            }
            ServerError::Engine(EngineError::InvalidRate(_))
            | ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
