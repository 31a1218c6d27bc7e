use crate::config::AdviceConfig;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// The external text-generation collaborator: text in, text out. The
/// server never inspects replies beyond extracting the completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn advise(&self, category: &str, query: &str) -> Result<String, AppError>;

    async fn translate(&self, text: &str, language: &str) -> Result<String, AppError>;
}

/// Chat-completions client for an OpenAI-compatible API.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &AdviceConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("http client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, AppError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": 1000,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::External(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "completion API returned {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::External(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::External("malformed completion response".into()))
    }
}

#[async_trait]
impl AdviceProvider for OpenAiProvider {
    async fn advise(&self, category: &str, query: &str) -> Result<String, AppError> {
        let system = format!(
            "You are an experienced business mentor specializing in {}. \
             Provide practical, actionable advice.",
            category
        );
        self.chat(&system, query, 0.7).await
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, AppError> {
        let system = format!("Translate this text to {}:", language);
        self.chat(&system, text, 0.3).await
    }
}
