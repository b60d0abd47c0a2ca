use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::completion::{ChatCompletion, ChatMessage};
use crate::core::error::AnalysisError;
use crate::infra::config::OpenAiConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct OpenAiChat {
    cfg: OpenAiConfig,
    http: Client,
}

impl OpenAiChat {
    pub fn new(base: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AnalysisError> {
        let cfg = OpenAiConfig {
            api_key: Some(api_key.into()),
            base_url: base.into(),
            ..OpenAiConfig::default()
        };
        Self::from_config(&cfg)
    }

    /// The credential is checked per call, so a client can be built before
    /// `OPENAI_API_KEY` is known to be set.
    pub fn from_config(cfg: &OpenAiConfig) -> Result<Self, AnalysisError> {
        let http = make_http_client(cfg)?;
        Ok(Self {
            cfg: cfg.clone(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, AnalysisError> {
        let api_key = self.cfg.require_api_key()?;
        let url = self.endpoint();
        let payload = ChatRequest { model, messages };
        let (builder, rid) = add_standard_headers(self.http.post(&url), None);
        tracing::debug!(endpoint = %url, model, request_id = %rid, "chat.completions request");

        let start = Instant::now();
        let resp = builder
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AnalysisError::Service(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, request_id = %rid, "chat.completions upstream error");
            return Err(AnalysisError::Service(format!(
                "upstream status {status}: {}",
                body.trim()
            )));
        }

        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AnalysisError::Service(format!("invalid response body: {e}")))?;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric("chat.completions", "completion_latency_ms", elapsed_ms);

        let choice = out
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::Service("response contained no choices".into()))?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChoiceWire>,
}

#[derive(Deserialize)]
struct ChoiceWire {
    message: MessageWire,
}

#[derive(Deserialize)]
struct MessageWire {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::completion::ContentPart;
    use httpmock::prelude::*;
    use serde_json::json;

    fn reply(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn it_posts_typed_parts_with_bearer_auth() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .header_exists("x-request-id")
                .header_exists("user-agent")
                .json_body(json!({
                    "model": "gpt-4.1",
                    "messages": [{
                        "role": "user",
                        "content": [
                            {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}},
                            {"type": "text", "text": "hi"}
                        ]
                    }]
                }));
            then.status(200).json_body(reply(json!("hello back")));
        });

        let cli = OpenAiChat::new(server.url("/v1"), "sk-test").unwrap();
        let out = cli
            .complete(
                "gpt-4.1",
                vec![ChatMessage::user(vec![
                    ContentPart::image_url("data:image/png;base64,AAAA"),
                    ContentPart::text("hi"),
                ])],
            )
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "hello back");
    }

    #[tokio::test]
    async fn null_content_becomes_empty_string() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(reply(serde_json::Value::Null));
        });
        let cli = OpenAiChat::new(server.base_url(), "k").unwrap();
        let out = cli.complete("m", vec![]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn it_returns_upstream_status_on_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        });
        let cli = OpenAiChat::new(server.base_url(), "k").unwrap();
        let err = cli.complete("m", vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn it_rejects_replies_without_choices() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        });
        let cli = OpenAiChat::new(server.base_url(), "k").unwrap();
        let err = cli.complete("m", vec![]).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn slow_upstream_is_only_cut_off_by_a_configured_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .delay(std::time::Duration::from_millis(600))
                .json_body(reply(json!("late")));
        });
        let mut cfg = OpenAiConfig {
            api_key: Some("k".into()),
            base_url: server.base_url(),
            ..OpenAiConfig::default()
        };

        let unbounded = OpenAiChat::from_config(&cfg).unwrap();
        assert_eq!(unbounded.complete("m", vec![]).await.unwrap(), "late");

        cfg.timeout = Some(std::time::Duration::from_millis(100));
        let bounded = OpenAiChat::from_config(&cfg).unwrap();
        let err = bounded.complete("m", vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_service_error() {
        let cli = OpenAiChat::new("http://127.0.0.1:9", "k").unwrap();
        let err = cli.complete("m", vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
    }

    #[tokio::test]
    async fn missing_key_is_config_error_without_request() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(reply(json!("{}")));
        });
        let cli = OpenAiChat::from_config(&OpenAiConfig {
            base_url: server.base_url(),
            ..OpenAiConfig::default()
        })
        .unwrap();
        let err = cli.complete("m", vec![]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        m.assert_hits(0);
    }
}
