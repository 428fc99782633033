/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation service directly.
/// All LLM interactions MUST go through a `TextGenerator`.
///
/// Model: gemini-1.5-flash (hardcoded, not configurable)
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// The model used for every generation call.
pub const MODEL: &str = "gemini-1.5-flash";

/// Error reason Gemini attaches to requests carrying a bad key.
const API_KEY_INVALID_REASON: &str = "API_KEY_INVALID";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured (set GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        reason: Option<String>,
    },

    #[error("Prompt was blocked by the service: {0}")]
    Blocked(String),

    #[error("LLM returned no usable candidate")]
    EmptyContent,
}

impl LlmError {
    /// True when the failure is caused by a missing or rejected credential
    /// rather than by the service itself.
    pub fn is_credential_error(&self) -> bool {
        match self {
            LlmError::MissingApiKey => true,
            LlmError::Api { status, reason, .. } => {
                *status == StatusCode::UNAUTHORIZED.as_u16()
                    || *status == StatusCode::FORBIDDEN.as_u16()
                    || reason.as_deref() == Some(API_KEY_INVALID_REASON)
            }
            _ => false,
        }
    }
}

/// The outbound seam: send a model identifier plus ordered text segments,
/// receive the generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_content(&self, model: &str, segments: &[String])
        -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first candidate: its text parts joined in order, untouched.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if parts.iter().all(|p| p.text.is_none()) {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
    #[serde(default)]
    details: Vec<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    reason: Option<String>,
}

/// Wraps the Gemini `generateContent` REST endpoint.
/// No retries: every failure is reported to the caller as-is.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(config.gemini_timeout).build()?,
            api_key: config.google_api_key.clone(),
            base_url: config.gemini_api_base.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        segments: &[String],
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: segments
                    .iter()
                    .map(|s| RequestPart { text: s.as_str() })
                    .collect(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            return Err(parse_api_error(status, body));
        }

        let response: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        if let Some(text) = response.text() {
            return Ok(text);
        }

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked(reason));
        }

        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
        {
            warn!("Gemini candidate carried no text (finish_reason={reason})");
        }

        Err(LlmError::EmptyContent)
    }
}

fn parse_api_error(status: StatusCode, body: String) -> LlmError {
    match serde_json::from_str::<GeminiError>(&body) {
        Ok(parsed) => LlmError::Api {
            status: status.as_u16(),
            message: parsed.error.message,
            reason: parsed.error.details.into_iter().find_map(|d| d.reason),
        },
        Err(_) => LlmError::Api {
            status: status.as_u16(),
            message: body,
            reason: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct Captured {
        path: Arc<Mutex<Option<String>>>,
        api_key: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String, api_key: Option<&str>) -> GeminiClient {
        let config = Config {
            google_api_key: api_key.map(str::to_string),
            gemini_api_base: base_url,
            gemini_timeout: Duration::from_secs(5),
            prompt_templates_dir: None,
            port: 0,
            rust_log: "info".to_string(),
        };
        GeminiClient::new(&config).unwrap()
    }

    fn stub_replying(status: AxumStatus, reply: Value, captured: Captured) -> Router {
        Router::new()
            .route(
                "/v1beta/models/:call",
                post(
                    move |State(captured): State<Captured>,
                          Path(call): Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            *captured.path.lock().unwrap() = Some(call);
                            *captured.api_key.lock().unwrap() = headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            *captured.body.lock().unwrap() = Some(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured)
    }

    fn segments() -> Vec<String> {
        vec![
            "You are an expert.".to_string(),
            "Upwork Job Post:\nNeed a Rust dev".to_string(),
            "Freelancer Profile/Summary:\nRust for 6 years".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_sends_model_key_and_ordered_parts() {
        let captured = Captured::default();
        let reply = json!({
            "candidates": [{"content": {"parts": [{"text": "Hello"}], "role": "model"}, "finishReason": "STOP"}]
        });
        let base = spawn_stub(stub_replying(AxumStatus::OK, reply, captured.clone())).await;
        let client = client_for(base, Some("secret-key"));

        let text = client.generate_content(MODEL, &segments()).await.unwrap();
        assert_eq!(text, "Hello");

        assert_eq!(
            captured.path.lock().unwrap().as_deref(),
            Some("gemini-1.5-flash:generateContent")
        );
        assert_eq!(captured.api_key.lock().unwrap().as_deref(), Some("secret-key"));

        let body = captured.body.lock().unwrap().clone().unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        let texts: Vec<&str> = parts.iter().map(|p| p["text"].as_str().unwrap()).collect();
        assert_eq!(texts, segments());
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_multi_part_candidate_is_joined_verbatim() {
        let reply = json!({
            "candidates": [{"content": {"parts": [{"text": "  75% Match\n"}, {"text": "Keywords Missing: none  "}]}}]
        });
        let base = spawn_stub(stub_replying(AxumStatus::OK, reply, Captured::default())).await;
        let client = client_for(base, Some("k"));

        let text = client.generate_content(MODEL, &segments()).await.unwrap();
        assert_eq!(text, "  75% Match\nKeywords Missing: none  ");
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let captured = Captured::default();
        let base = spawn_stub(stub_replying(AxumStatus::OK, json!({}), captured.clone())).await;
        let client = client_for(base, None);

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(err.is_credential_error());
        assert!(captured.body.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_key_is_credential_error() {
        let reply = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        });
        let base = spawn_stub(stub_replying(AxumStatus::BAD_REQUEST, reply, Captured::default())).await;
        let client = client_for(base, Some("wrong"));

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        assert!(err.is_credential_error());
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_server_error_is_not_credential_error() {
        let reply = json!({"error": {"code": 503, "message": "The model is overloaded."}});
        let base = spawn_stub(stub_replying(
            AxumStatus::SERVICE_UNAVAILABLE,
            reply,
            Captured::default(),
        ))
        .await;
        let client = client_for(base, Some("k"));

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        match &err {
            LlmError::Api { status, message, .. } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_credential_error());
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let reply = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let base = spawn_stub(stub_replying(AxumStatus::OK, reply, Captured::default())).await;
        let client = client_for(base, Some("k"));

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        assert!(matches!(err, LlmError::Blocked(ref r) if r == "SAFETY"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_content() {
        let reply = json!({"candidates": []});
        let base = spawn_stub(stub_replying(AxumStatus::OK, reply, Captured::default())).await;
        let client = client_for(base, Some("k"));

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"), Some("k"));
        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(!err.is_credential_error());
    }

    #[tokio::test]
    async fn test_timeout_is_http_error() {
        let router = Router::new().route(
            "/v1beta/models/:call",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({}))
            }),
        );
        let base = spawn_stub(router).await;
        let config = Config {
            google_api_key: Some("k".to_string()),
            gemini_api_base: base,
            gemini_timeout: Duration::from_millis(100),
            prompt_templates_dir: None,
            port: 0,
            rust_log: "info".to_string(),
        };
        let client = GeminiClient::new(&config).unwrap();

        let err = client.generate_content(MODEL, &segments()).await.unwrap_err();
        match err {
            LlmError::Http(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_response_text_none_without_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_parse_api_error_falls_back_to_raw_body() {
        let err = parse_api_error(StatusCode::BAD_GATEWAY, "upstream proxy failure".to_string());
        match err {
            LlmError::Api { status, message, reason } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream proxy failure");
                assert!(reason.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
