use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SlidewrightConfig;
use crate::error::{SlidewrightError, SlidewrightResult};

use super::traits::{ContentGenerator, ContentPart, ContentRequest, GeneratedContent};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::build(
            std::env::var("GOOGLE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok(),
            GEMINI_API_BASE.to_string(),
            DEFAULT_TIMEOUT_SECS,
        )
    }

    pub fn with_api_key(api_key: String) -> Self {
        Self::build(Some(api_key), GEMINI_API_BASE.to_string(), DEFAULT_TIMEOUT_SECS)
    }

    pub fn from_config(config: &SlidewrightConfig) -> Self {
        Self::build(
            config.generation.api_key.clone(),
            config.generation.api_base.clone(),
            config.generation.request_timeout_secs,
        )
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn build(api_key: Option<String>, api_base: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    fn map_status(&self, status: StatusCode, body: &str) -> SlidewrightError {
        match status.as_u16() {
            401 | 403 => SlidewrightError::ApiAuthenticationFailed {
                service: "gemini".to_string(),
                message: preview(body),
            },
            429 => SlidewrightError::ApiRateLimitExceeded {
                service: "gemini".to_string(),
            },
            _ => SlidewrightError::ApiRequestFailed(format!(
                "Gemini API returned status {}: {}",
                status,
                preview(body)
            )),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> SlidewrightResult<GeneratedContent> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(SlidewrightError::MissingEnvVar("GOOGLE_API_KEY".to_string())),
        };

        let body = GenerateContentBody {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: request.want_image.then(|| GenerationSettings {
                response_modalities: vec!["TEXT", "IMAGE"],
            }),
        };

        debug!(
            model = %request.model,
            want_image = request.want_image,
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SlidewrightError::RequestTimeout(self.timeout_secs)
                } else {
                    SlidewrightError::from(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SlidewrightError::RequestTimeout(self.timeout_secs)
            } else {
                SlidewrightError::from(e)
            }
        })?;

        if !status.is_success() {
            warn!("Gemini API returned status: {}", status);
            return Err(self.map_status(status, &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| SlidewrightError::ApiParseError(e.to_string()))?;

        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        Ok(GeneratedContent { parts })
    }
}
