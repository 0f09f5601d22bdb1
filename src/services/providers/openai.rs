/// OpenAI-compatible chat completion provider
///
/// Calls `POST {api_url}/chat/completions` with `response_format` set to
/// `json_object` and returns the first choice's message content untouched.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::ChatModel;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiChatModel {
    http_client: HttpClient,
    api_url: String,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn request_body<'a>(&'a self, system_prompt: &'a str, user_prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete_json(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url);

        tracing::debug!(model = %self.model, "Requesting chat completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(system_prompt, user_prompt))
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Unreadable completion: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::UpstreamApi("Completion has no content".to_string()))?;

        tracing::info!(model = %self.model, bytes = content.len(), "Chat completion received");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_api(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    #[test]
    fn test_request_body_shape() {
        let model = OpenAiChatModel::new("https://api.openai.com/v1/", "gpt-4o");
        let body = serde_json::to_value(model.request_body("sys", "usr")).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(model.api_url, "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_complete_json_returns_message_content() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["response_format"]["type"], "json_object");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "{\"shows\":[]}" } }]
                }))
            }),
        );
        let api_url = spawn_api(app).await;

        let content = OpenAiChatModel::new(api_url, "gpt-4o")
            .complete_json("sk-test", "sys", "usr")
            .await
            .unwrap();
        assert_eq!(content, r#"{"shows":[]}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let api_url = spawn_api(app).await;

        let result = OpenAiChatModel::new(api_url, "gpt-4o")
            .complete_json("bad", "sys", "usr")
            .await;
        match result {
            Err(AppError::UpstreamApi(msg)) => assert!(msg.contains("401")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_upstream_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let api_url = spawn_api(app).await;

        let result = OpenAiChatModel::new(api_url, "gpt-4o")
            .complete_json("sk-test", "sys", "usr")
            .await;
        assert!(matches!(result, Err(AppError::UpstreamApi(_))));
    }
}
