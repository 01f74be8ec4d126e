//! OpenAI client implementation

use super::types::OpenAIError;
use crate::config::OpenAIConfig;
use crate::error::GhostError;
use crate::protocol::{ChatRequest, CompletionResult, Message};
use crate::providers::{BackendError, BackendResult, CompletionBackend, CompletionOptions};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default backend: OpenAI chat completions with a one-step model fallback
///
/// Every call first asks for the preferred model (`gpt-4` unless configured
/// otherwise, or overridden by a `model` passthrough option). If the API
/// reports the model as unavailable or the request as invalid, the call is
/// repeated exactly once with the fallback model.
#[derive(Debug, Clone)]
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> BackendResult<Self> {
        config
            .validate()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BackendError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build from `OPENAI_API_KEY`, `OPENAI_ORGANIZATION` and `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, GhostError> {
        let config = OpenAIConfig::from_env()?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn build_headers(&self, request_id: Uuid) -> BackendResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let bearer = format!("Bearer {}", self.config.api_key.expose_secret());
        let mut authorization = HeaderValue::from_str(&bearer).map_err(|_| {
            BackendError::Configuration("API key is not a valid header value".to_string())
        })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        if let Some(organization) = &self.config.organization {
            let value = HeaderValue::from_str(organization).map_err(|_| {
                BackendError::Configuration(
                    "organization is not a valid header value".to_string(),
                )
            })?;
            headers.insert("OpenAI-Organization", value);
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert("X-Request-ID", value);
        }
        Ok(headers)
    }

    /// Map a non-success response to a backend error
    fn handle_error_response(&self, status: StatusCode, body: String) -> BackendError {
        if let Ok(error) = serde_json::from_str::<OpenAIError>(&body) {
            let detail = error.error;
            let kind = detail
                .code
                .as_deref()
                .filter(|code| !code.is_empty())
                .or(detail.error_type.as_deref())
                .unwrap_or_default()
                .to_string();
            return match kind.as_str() {
                "invalid_api_key" => BackendError::Authentication(detail.message),
                "rate_limit_exceeded" | "insufficient_quota" => {
                    BackendError::RateLimit(detail.message)
                }
                "model_not_found" => BackendError::ModelNotFound(detail.message),
                "invalid_request_error" => BackendError::InvalidRequest(detail.message),
                _ => self.status_error(status, detail.message, Some(kind)),
            };
        }
        self.status_error(status, body, None)
    }

    fn status_error(&self, status: StatusCode, message: String, code: Option<String>) -> BackendError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                BackendError::Authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimit(message),
            StatusCode::BAD_REQUEST => BackendError::InvalidRequest(message),
            StatusCode::NOT_FOUND => BackendError::ModelNotFound(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                BackendError::Timeout(self.config.timeout_secs)
            }
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE => BackendError::ServiceUnavailable(message),
            _ => BackendError::Provider {
                code: code
                    .filter(|code| !code.is_empty())
                    .unwrap_or_else(|| status.to_string()),
                message,
            },
        }
    }

    fn transport_error(&self, err: reqwest::Error, request_id: Uuid) -> BackendError {
        if err.is_timeout() {
            warn!("Request timeout for openai [request_id: {}]", request_id);
            BackendError::Timeout(self.config.timeout_secs)
        } else {
            warn!("Request error for openai [request_id: {}]: {}", request_id, err);
            BackendError::from(err)
        }
    }

    /// One round-trip against `model`
    async fn send(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        let request_id = Uuid::new_v4();
        let request = ChatRequest::new(model, messages.to_vec()).with_options(options.clone());
        let url = self.config.completions_url();

        info!(
            "Requesting completion from openai model {} [request_id: {}]",
            model, request_id
        );
        debug!("Request URL: {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers(request_id)?)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, request_id))?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(e, request_id))?;
            let result: CompletionResult = serde_json::from_str(&body)?;
            debug!(
                "Received {} choice(s) [request_id: {}]",
                result.choices.len(),
                request_id
            );
            Ok(result)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(
                "Request failed with status {} for openai [request_id: {}]",
                status, request_id
            );
            Err(self.handle_error_response(status, body))
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(
        &self,
        messages: Vec<Message>,
        options: &CompletionOptions,
    ) -> BackendResult<CompletionResult> {
        let mut options = options.clone();
        let model = match options.remove("model") {
            Some(serde_json::Value::String(model)) => model,
            Some(other) => {
                return Err(BackendError::InvalidRequest(format!(
                    "model option must be a string, got {}",
                    other
                )))
            }
            None => self.config.model.clone(),
        };
        if options.remove("messages").is_some() {
            debug!("Ignoring passthrough option 'messages'");
        }

        match self.send(&model, &messages, &options).await {
            Err(err) if err.is_model_unavailable() => match &self.config.fallback_model {
                Some(fallback) if *fallback != model => {
                    warn!(
                        "Model {} unavailable ({}), falling back to {}",
                        model, err, fallback
                    );
                    self.send(fallback, &messages, &options).await
                }
                _ => Err(err),
            },
            outcome => outcome,
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
