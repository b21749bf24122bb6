use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, LlmProvider, LlmRequest, LlmResponse, Message, Usage};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat completions provider
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> = request
            .messages
            .iter()
            .map(OpenAiMessage::from_domain)
            .collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());
        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> OpenAiMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn completion(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200 }
        })
    }

    #[tokio::test]
    async fn test_openai_chat() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, completion(json!("1. **Overview** Visit Krabi.")));
        let provider = OpenAiProvider::new(client, "test-api-key");

        let request = LlmRequest::builder()
            .system("You are a travel assistant.")
            .user("Beaches?")
            .temperature(0.2)
            .max_tokens(600)
            .build();

        let response = provider.chat("gpt-4o-mini", request).await.unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), Some("1. **Overview** Visit Krabi."));

        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.total_tokens, 200);
    }

    #[tokio::test]
    async fn test_openai_request_body() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion(json!("ok")));
        let provider = OpenAiProvider::new(client, "sk-test");

        let request = LlmRequest::builder()
            .system("sys")
            .user("hello")
            .temperature(0.2)
            .max_tokens(600)
            .build();
        provider.chat("gpt-4o-mini", request).await.unwrap();

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.header("Authorization"), Some("Bearer sk-test"));
        assert_eq!(sent.body["model"], "gpt-4o-mini");
        assert_eq!(sent.body["max_tokens"], 600);
        assert_eq!(
            sent.body["messages"],
            json!([
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"}
            ])
        );
    }

    #[tokio::test]
    async fn test_openai_null_content_is_empty() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion(json!(null)));
        let provider = OpenAiProvider::new(client, "k");

        let response = provider
            .chat("gpt-4o-mini", LlmRequest::builder().user("q").build())
            .await
            .unwrap();

        assert_eq!(response.content(), None);
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        let client = MockHttpClient::new().with_error(TEST_URL, "API key invalid");
        let provider = OpenAiProvider::new(client, "invalid-key");

        let result = provider
            .chat("gpt-4o-mini", LlmRequest::builder().user("Hello!").build())
            .await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_openai_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(custom_url, completion(json!("Custom")));
        let provider = OpenAiProvider::with_base_url(client, "test-key", "http://localhost:8080/");

        let response = provider
            .chat("gpt-4o-mini", LlmRequest::builder().user("Test").build())
            .await
            .unwrap();

        assert_eq!(response.content(), Some("Custom"));
    }
}
