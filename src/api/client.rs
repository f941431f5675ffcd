use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::api::error::summarize_error_body;
use crate::api::models::{decode_model_list, Model};
use crate::api::{ApiError, ChatCompletion, ChatMessage, ChatRequest};
use crate::core::config::RuntimeSettings;
use crate::core::constants::{CHAT_ENDPOINT, MODELS_ENDPOINT};
use crate::utils::url::construct_api_url;

/// Operations the session controller needs from the chat server.
///
/// Every call receives the credential explicitly; implementations hold no
/// key of their own.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch and normalize the model list.
    ///
    /// Fails with [`ApiError::Auth`] before any request when `credential` is `None`.
    async fn list_models(&self, credential: Option<&str>) -> Result<Vec<Model>, ApiError>;

    /// Send one user turn and return the assistant's reply text.
    ///
    /// Fails with [`ApiError::ModelNotSelected`] before any request when `model` is empty.
    async fn send_message(
        &self,
        credential: Option<&str>,
        text: &str,
        model: &str,
    ) -> Result<String, ApiError>;

    /// Probe the models endpoint with `candidate`. Any failure is `false`.
    async fn validate_key(&self, candidate: &str) -> bool;
}

/// [`ChatApi`] over HTTP against an Open WebUI compatible server.
#[derive(Clone)]
pub struct OpenWebUiClient {
    client: Client,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenWebUiClient {
    pub fn new(settings: &RuntimeSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
    }

    fn models_request(&self, api_key: &str) -> RequestBuilder {
        let url = construct_api_url(&self.base_url, MODELS_ENDPOINT);
        self.authorized(self.client.get(url), api_key)
    }
}

async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: summarize_error_body(&body),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::MalformedResponse(format!("invalid JSON: {err}")))
}

#[async_trait]
impl ChatApi for OpenWebUiClient {
    async fn list_models(&self, credential: Option<&str>) -> Result<Vec<Model>, ApiError> {
        let api_key = credential.ok_or(ApiError::Auth)?;

        debug!(base_url = %self.base_url, "requesting model list");
        let response = self.models_request(api_key).send().await?;
        let body = read_json(response).await?;
        let models = decode_model_list(body)?;
        debug!(count = models.len(), "model list decoded");
        Ok(models)
    }

    async fn send_message(
        &self,
        credential: Option<&str>,
        text: &str,
        model: &str,
    ) -> Result<String, ApiError> {
        if model.trim().is_empty() {
            return Err(ApiError::ModelNotSelected);
        }
        let api_key = credential.ok_or(ApiError::Auth)?;

        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: text.to_string(),
            }],
            model: model.to_string(),
            stream: false,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model, chars = text.len(), "posting chat completion");
        let url = construct_api_url(&self.base_url, CHAT_ENDPOINT);
        let response = self
            .authorized(self.client.post(url), api_key)
            .json(&request)
            .send()
            .await?;
        let body = read_json(response).await?;

        let completion: ChatCompletion = serde_json::from_value(body)
            .map_err(|err| ApiError::MalformedResponse(format!("invalid completion: {err}")))?;
        completion.into_first_content().ok_or_else(|| {
            ApiError::MalformedResponse("missing choices[0].message.content".to_string())
        })
    }

    async fn validate_key(&self, candidate: &str) -> bool {
        if candidate.trim().is_empty() {
            return false;
        }
        match self.models_request(candidate).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(status = response.status().as_u16(), "key validation finished");
                ok
            }
            Err(err) => {
                debug!(error = %err, "key validation request failed");
                false
            }
        }
    }
}
