use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{CompletionClient, CompletionRequest};
use crate::domain::{ApiKey, RemoteError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION_PATH: &str = "/v1beta";
const GENERATE_ACTION: &str = ":generateContent";
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Finish reasons that mean the candidate was withheld rather than empty.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];
/// Upper bound on how much of an unparsed error body ends up in a message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    generation_config: ApiGenerationConfig<'a>,
    safety_settings: Vec<ApiSafetySetting>,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    role: &'a str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Serialize)]
struct ApiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Subset of the generateContent response this client reads.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Sends the prompt as a single user turn together with the session's
/// generation config and safety settings, and returns the concatenated text
/// of the first candidate. The API key travels in the `x-goog-api-key`
/// header, never in the URL.
///
/// The base URL defaults to the public endpoint and can be overridden:
///
/// ```text
/// GEMINI_BASE_URL=http://localhost:8080
/// ```
///
/// No overall timeout is set here; the turn orchestrator bounds each call.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key,
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Like [`GeminiClient::new`], taking the base URL from `GEMINI_BASE_URL`
    /// when set.
    pub fn from_env(api_key: ApiKey) -> Self {
        Self::new(api_key, Self::configured_base_url())
    }

    /// Return the configured base URL (for logging purposes).
    pub fn configured_base_url() -> String {
        std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }

    /// `models/<id>` unless the id already names a resource such as
    /// `tunedModels/<id>`.
    fn endpoint(&self, model_id: &str) -> String {
        let model_id = model_id.trim().trim_start_matches('/');
        if model_id.contains('/') {
            format!("{}{API_VERSION_PATH}/{model_id}{GENERATE_ACTION}", self.base_url)
        } else {
            format!(
                "{}{API_VERSION_PATH}/models/{model_id}{GENERATE_ACTION}",
                self.base_url
            )
        }
    }

    fn build_request(request: &CompletionRequest) -> ApiRequest<'_> {
        ApiRequest {
            contents: vec![ApiContent {
                role: "user",
                parts: vec![ApiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: ApiGenerationConfig {
                temperature: request.generation.temperature(),
                top_p: request.generation.top_p(),
                top_k: request.generation.top_k(),
                max_output_tokens: request.generation.max_output_tokens(),
                response_mime_type: request.generation.response_mime_type(),
            },
            safety_settings: request
                .safety
                .iter()
                .map(|(category, threshold)| ApiSafetySetting {
                    category: category.as_str(),
                    threshold: threshold.as_str(),
                })
                .collect(),
        }
    }

    fn extract_text(response: ApiResponse) -> Result<String, RemoteError> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(RemoteError::blocked(format!("prompt blocked ({reason})")));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::malformed("response has no candidates"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if !text.is_empty() {
            return Ok(text);
        }

        match candidate.finish_reason {
            Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => Err(
                RemoteError::blocked(format!("candidate withheld ({reason})")),
            ),
            Some(reason) => Err(RemoteError::malformed(format!(
                "candidate has no text (finish reason {reason})"
            ))),
            None => Err(RemoteError::malformed("candidate has no text")),
        }
    }

    fn status_message(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        let url = self.endpoint(&request.model_id);
        debug!(
            "GeminiClient: POST {url} ({} prompt chars)",
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| RemoteError::transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: Self::status_message(&body),
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::malformed(format!("failed to parse response: {e}")))?;

        Self::extract_text(api_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
