use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Requested shape of a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    /// Ask the provider to constrain output to JSON.
    Json,
}

/// A single-shot text completion service.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, format: ResponseFormat) -> Result<String>;
}

/// Generator backed by a hosted LLM API, selected by `LlmConfig::provider`.
pub struct HttpGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl HttpGenerator {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str, format: ResponseFormat) -> Result<String> {
        match self.config.provider.as_str() {
            "gemini" => call_gemini(&self.client, &self.config, prompt, format).await,
            "openai" => call_openai(&self.client, &self.config, prompt, format).await,
            "ollama" => call_ollama(&self.client, &self.config, prompt, format).await,
            other => anyhow::bail!("Unknown LLM provider: {other}"),
        }
    }
}

// ─── Gemini ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

async fn call_gemini(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    format: ResponseFormat,
) -> Result<String> {
    let api_key = config
        .api_key
        .as_deref()
        .context("LLM_API_KEY is required for Gemini")?;
    let url = endpoint(
        &config.base_url,
        &format!("v1beta/models/{}:generateContent", config.model),
    );

    let req = GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }],
        generation_config: match format {
            ResponseFormat::Json => Some(GeminiGenerationConfig {
                response_mime_type: "application/json",
            }),
            ResponseFormat::Text => None,
        },
    };

    let resp = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(&req)
        .send()
        .await
        .context("Failed to call Gemini generateContent")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Gemini generateContent returned {status}: {body}");
    }

    let body: GeminiResponse = resp
        .json()
        .await
        .context("Failed to parse Gemini response")?;

    gemini_text(body).context("Gemini returned no candidates")
}

fn gemini_text(body: GeminiResponse) -> Option<String> {
    let content = body.candidates.into_iter().next()?.content?;
    Some(
        content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .concat(),
    )
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    format: ResponseFormat,
) -> Result<String> {
    let url = endpoint(&config.base_url, "v1/chat/completions");
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: 0.2,
        response_format: (format == ResponseFormat::Json).then_some(OpenAiResponseFormat {
            kind: "json_object",
        }),
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .context("OpenAI returned no choices")
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
    format: ResponseFormat,
) -> Result<String> {
    let url = endpoint(&config.base_url, "api/chat");

    let req = OllamaChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
        format: (format == ResponseFormat::Json).then_some("json"),
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
