//! HTTP voice-call provider client
//!
//! Talks to the provider's call-initiation API. The lead id travels as
//! correlation metadata so the outcome webhook can link back without
//! phone-number matching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use dialer_config::ProviderConfig;
use dialer_core::{DialResult, Lead, ProviderError, VoiceProvider};

/// Provider response envelope. Absent `success` means accepted.
#[derive(Debug, Deserialize)]
struct InitiateResponse {
    success: Option<bool>,
    message: Option<String>,
}

/// reqwest-backed voice provider
pub struct HttpVoiceProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpVoiceProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Internal(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn call_url(&self) -> String {
        format!("{}/call", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl VoiceProvider for HttpVoiceProvider {
    async fn initiate_call(&self, lead: &Lead) -> Result<DialResult, ProviderError> {
        let body = json!({
            "phoneNumberId": lead.phone_id,
            "customer": {
                "number": lead.phone,
                "name": lead.name,
            },
            "metadata": {
                "lead_id": lead.id,
            },
        });

        let mut request = self.client.post(self.call_url()).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ProviderError::AuthFailed(format!(
                    "provider returned {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(ProviderError::Rejected(format!("HTTP {status}: {message}")));
            }
            _ => {}
        }

        let parsed: InitiateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("unreadable response: {e}")))?;

        Ok(DialResult {
            success: parsed.success.unwrap_or(true),
            message: parsed.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer_core::Lead;

    #[test]
    fn test_call_url_strips_trailing_slash() {
        let provider = HttpVoiceProvider::new(ProviderConfig {
            base_url: "https://api.example.com/".to_string(),
            api_key: None,
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(provider.call_url(), "https://api.example.com/call");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_error() {
        let provider = HttpVoiceProvider::new(ProviderConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
            timeout_secs: 1,
        })
        .unwrap();

        let lead = Lead::new("Test", "5550100000").phone_id("p1");
        let err = provider.initiate_call(&lead).await.unwrap_err();
        assert!(matches!(err, ProviderError::ConnectionFailed(_)));
    }
}
