//! Chat-completions client for AI item extraction.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::AiError;
use crate::models::config::AiConfig;

use super::ItemModel;

/// Item model backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiItemModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiItemModel {
    /// Create a client from explicit configuration. Fails when no API key is set.
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AiError::MissingApiKey)?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn send(&self, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!("Requesting items from {} ({})", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::InvalidResponse("response has no message content".to_string()))?;

        info!("Model answered with {} bytes", content.len());
        Ok(content)
    }
}

impl ItemModel for OpenAiItemModel {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AiError>> + Send {
        self.send(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = AiConfig::default();
        assert!(matches!(
            OpenAiItemModel::new(&config),
            Err(AiError::MissingApiKey)
        ));

        let config = AiConfig {
            api_key: Some("   ".to_string()),
            ..AiConfig::default()
        };
        assert!(matches!(
            OpenAiItemModel::new(&config),
            Err(AiError::MissingApiKey)
        ));
    }

    #[test]
    fn test_builds_with_api_key() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            ..AiConfig::default()
        };
        let model = OpenAiItemModel::new(&config).unwrap();
        assert_eq!(model.model, "gpt-4o-mini");
        assert_eq!(model.api_key, "sk-test");
    }

    #[test]
    fn test_chat_response_shape() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"[]"}}]}"#;
        let chat: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some("[]"));
    }
}
