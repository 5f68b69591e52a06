//! Assistant chat client
//!
//! Proxies a conversation to a `generateContent` style chat-completion
//! endpoint. The conversation is always prefixed with a context prompt built
//! from the selected plot's latest analysis.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;
use crate::error::{AppError, AppResult};

pub const NO_REPLY: &str = "No reply received";

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

/// One message of the visible chat history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Figures the assistant is told about; absent values render as "N/A"
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub crop_health: Option<f64>,
    pub water_stress: Option<f64>,
    pub yield_prediction: Option<f64>,
    pub model_params: Option<u64>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

fn percent_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{}", v))
}

/// Thousands-separated count, e.g. `1,350,726`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn context_prompt(ctx: &AssistantContext) -> String {
    format!(
        "You are Agrilens Assistant.\n\
         You always know the following context:\n\
         - CNN crop health: {}%\n\
         - LSTM water stress: {}%\n\
         - Fusion yield prediction: {}%\n\
         - Model parameters: {}\n\n\
         Answer clearly with bullet points, bold key terms, and helpful suggestions.",
        percent_or_na(ctx.crop_health),
        percent_or_na(ctx.water_stress),
        percent_or_na(ctx.yield_prediction),
        ctx.model_params
            .map_or_else(|| "unknown".to_string(), group_thousands),
    )
}

fn embolden(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str("<strong>");
        out.push_str(&after[..end]);
        out.push_str("</strong>");
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Render a raw model reply as chat HTML
pub fn format_reply(raw: &str) -> String {
    raw.trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| embolden(line).replace("- ", "• "))
        .collect::<Vec<_>>()
        .join("<br />")
}

#[derive(Clone)]
pub struct AssistantClient {
    url: String,
    api_key: String,
    http_client: Client,
}

impl AssistantClient {
    /// Fails with a configuration error when no API key is set
    pub fn from_config(http_client: Client, config: &AssistantConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("Assistant is not configured".to_string()))?;

        Ok(Self {
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
            http_client,
        })
    }

    /// Send the conversation and return the formatted reply
    pub async fn chat(
        &self,
        ctx: &AssistantContext,
        history: &[ChatTurn],
        message: &str,
    ) -> AppResult<String> {
        let request = build_request(ctx, history, message);

        let response = self
            .http_client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AssistantError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::AssistantError(format!(
                "API returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::AssistantError(format!("Failed to parse response: {}", e)))?;

        Ok(format_reply(&reply_text(body)))
    }
}

fn build_request(ctx: &AssistantContext, history: &[ChatTurn], message: &str) -> GenerateRequest {
    let mut contents = Vec::with_capacity(history.len() + 2);
    contents.push(Content::text("user", context_prompt(ctx)));
    contents.extend(history.iter().map(|turn| {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Bot => "model",
        };
        Content::text(role, turn.text.clone())
    }));
    contents.push(Content::text("user", message));
    GenerateRequest { contents }
}

fn reply_text(body: GenerateResponse) -> String {
    body.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_REPLY.to_string())
}
