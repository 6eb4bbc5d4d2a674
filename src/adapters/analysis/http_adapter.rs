//! HTTP adapter for the emotion analysis service.
//!
//! Sends one multipart POST per submission (`text`, `image`, `audio` parts)
//! and parses the JSON body into a strict `AnalysisPayload`.

use crate::domain::{AnalysisPayload, DomainError};
use crate::ports::{AnalysisPort, AnalysisRequest};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP analysis adapter.
///
/// `base_url` is the service root, e.g. `http://localhost:8000`; requests go to
/// `{base_url}/analyze` and `{base_url}/health`.
pub struct HttpAnalysisAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalysisAdapter {
    /// Create a new adapter. `timeout` bounds the whole request; expiry is a transport failure.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::AnalysisFailed(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn file_part(bytes: &[u8], file_name: &str, mime: &str) -> Result<Part, DomainError> {
        Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| DomainError::AnalysisFailed(format!("invalid MIME type {}: {}", mime, e)))
    }

    fn build_form(request: &AnalysisRequest<'_>) -> Result<Form, DomainError> {
        let image = Self::file_part(
            &request.image.bytes,
            &request.image.file_name,
            &request.image.mime_type,
        )?;
        let audio = Self::file_part(
            &request.audio.bytes,
            &request.audio.file_name,
            &request.audio.mime_type,
        )?;
        Ok(Form::new()
            .text("text", request.text.to_string())
            .part("image", image)
            .part("audio", audio))
    }

    /// Parse and check a success body. Missing fields or bad scores are failures.
    fn parse_payload(body: &str) -> Result<AnalysisPayload, DomainError> {
        let payload: AnalysisPayload = serde_json::from_str(body).map_err(|e| {
            warn!(error = %e, body = %body.chars().take(200).collect::<String>(), "analysis JSON parse failed");
            DomainError::AnalysisFailed(format!("Failed to parse analysis response: {}", e))
        })?;
        payload.validate()?;
        Ok(payload)
    }
}

/// `GET /health` body.
#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[async_trait::async_trait]
impl AnalysisPort for HttpAnalysisAdapter {
    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisPayload, DomainError> {
        let url = self.endpoint("analyze");
        info!(
            url = %url,
            image = %request.image.file_name,
            audio = %request.audio.file_name,
            "sending inputs to analysis service"
        );

        let form = Self::build_form(&request)?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::AnalysisFailed(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "analysis service returned error");
            return Err(DomainError::AnalysisFailed(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::AnalysisFailed(format!("Failed to read response: {}", e)))?;
        debug!(body_len = body.len(), "received analysis response");

        Self::parse_payload(&body)
    }

    async fn health(&self) -> Result<(), DomainError> {
        let url = self.endpoint("health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::AnalysisFailed(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::AnalysisFailed(format!(
                "health check returned {}",
                response.status()
            )));
        }
        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| DomainError::AnalysisFailed(format!("Failed to parse health: {}", e)))?;
        info!(url = %url, status = %health.status, "analysis service reachable");
        Ok(())
    }
}
