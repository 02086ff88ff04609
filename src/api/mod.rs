//! Destination modelling platform API client
//!
//! Blocking HTTP client for model import and export. Models are created via
//! `POST {org}/api/{version}/models?token={token}` with the document wrapped
//! in a `{"model": ...}` envelope; any 2xx status is success and anything
//! else is surfaced with the status code and raw body.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::config::ApiSettings;
use crate::models::{ModelEnvelope, ModelLevel};

/// Error type for destination API operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Cannot reach the API; fatal, surfaced verbatim
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response, with the raw body for troubleshooting
    #[error("API request failed with status {status}: {body}")]
    Request { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Response body of a model import.
///
/// The API identifies the created model with an `id` field; older releases
/// used `modelId`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "modelId")]
    pub legacy_model_id: Option<Value>,
}

impl ImportResponse {
    /// Identifier of the created model, from either field.
    pub fn model_id(&self) -> Option<String> {
        let value = self.id.as_ref().or(self.legacy_model_id.as_ref())?;
        match value {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Client for the modelling platform API.
pub struct ModelApiClient {
    organization: String,
    token: String,
    api_version: String,
    client: reqwest::blocking::Client,
}

impl ModelApiClient {
    /// Create a new client from validated settings.
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            organization: settings.organization_url(),
            token: settings.token.clone(),
            api_version: settings.api_version.clone(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn models_url(&self) -> String {
        format!(
            "{}/api/{}/models?token={}",
            self.organization,
            self.api_version,
            urlencoding::encode(&self.token)
        )
    }

    fn model_by_id_url(&self, model_id: &str) -> String {
        format!(
            "{}/api/{}/models/{}?token={}",
            self.organization,
            self.api_version,
            urlencoding::encode(model_id),
            urlencoding::encode(&self.token)
        )
    }

    /// Direct link to a model in the platform UI.
    pub fn model_url(&self, level: ModelLevel, model_id: &str) -> String {
        format!("{}/models/{}/{}", self.organization, level, model_id)
    }

    /// Create a new model from a document envelope.
    pub fn import_model(&self, envelope: &ModelEnvelope) -> Result<ImportResponse, ApiError> {
        info!(
            "Creating {} model {:?} with {} entities and {} relationships",
            envelope.model.level,
            envelope.model.name,
            envelope.model.entities.len(),
            envelope.model.relationships.len()
        );

        let response = self
            .client
            .post(self.models_url())
            .json(envelope)
            .send()
            .map_err(|e| ApiError::Network(format!("Failed to create model: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Serialization(format!("Failed to parse import response: {}", e)))
    }

    /// Export an existing model as a document envelope.
    pub fn export_model(&self, model_id: &str) -> Result<ModelEnvelope, ApiError> {
        let response = self
            .client
            .get(self.model_by_id_url(model_id))
            .send()
            .map_err(|e| ApiError::Network(format!("Failed to export model: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Request {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| ApiError::Serialization(format!("Failed to parse model export: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ModelApiClient {
        ModelApiClient::new(&ApiSettings {
            organization: "acme.modelling.example".to_string(),
            token: "se cret".to_string(),
            api_version: "v1".to_string(),
            folder_id: String::new(),
        })
    }

    #[test]
    fn test_models_url_encodes_token() {
        assert_eq!(
            client().models_url(),
            "https://acme.modelling.example/api/v1/models?token=se%20cret"
        );
    }

    #[test]
    fn test_model_url_uses_level_path() {
        assert_eq!(
            client().model_url(ModelLevel::Physical, "123"),
            "https://acme.modelling.example/models/physical/123"
        );
    }

    #[test]
    fn test_import_response_prefers_id_field() {
        let response: ImportResponse =
            serde_json::from_str(r#"{"id": 77, "modelId": 12}"#).unwrap();
        assert_eq!(response.model_id(), Some("77".to_string()));
    }

    #[test]
    fn test_import_response_falls_back_to_legacy_field() {
        let response: ImportResponse = serde_json::from_str(r#"{"modelId": "m-12"}"#).unwrap();
        assert_eq!(response.model_id(), Some("m-12".to_string()));
    }

    #[test]
    fn test_import_response_without_id() {
        let response: ImportResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(response.model_id(), None);
    }
}
