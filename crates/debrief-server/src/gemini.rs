//! Gemini `generateContent` client.

use crate::config::GeminiConfig;
use async_trait::async_trait;
use debrief_core::{DebriefError, GenerationRequest, GenerationService, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

/// Build the JSON body for one request: a single user turn with the
/// instruction first, then one `inlineData` part per attachment.
fn request_body(request: &GenerationRequest) -> GenerateContentBody<'_> {
    let mut parts = Vec::with_capacity(request.attachments.len() + 1);
    parts.push(Part::Text {
        text: &request.instruction,
    });
    for a in &request.attachments {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: &a.media_type,
                data: &a.data,
            },
        });
    }
    GenerateContentBody {
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// Concatenated text of the first candidate.
fn response_text(body: GenerateContentResponse) -> Result<String> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(DebriefError::EmptyResponse);
    }
    Ok(text)
}

/// Pull `error.message` out of a Google error envelope, else the raw body.
fn error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| raw.trim().to_string())
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Whether the key variable is currently set. Informational only; the key
    /// is re-read on every call.
    pub fn api_key_present(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DebriefError::MissingApiKey(self.config.api_key_env.clone())),
        }
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let key = self.api_key()?;
        let url = self.endpoint();
        debug!(
            "POST {} ({} attachments)",
            url,
            request.attachments.len()
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| DebriefError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(DebriefError::Service {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let body: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| DebriefError::Transport(format!("unreadable response body: {}", e)))?;
        response_text(body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
