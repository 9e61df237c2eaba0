//! Worked solutions from an OpenAI-compatible chat completions API.
//!
//! One plain-text `chat/completions` call per question. The statement is sent
//! as plain text: tags stripped, whitespace collapsed, truncated to
//! [`MAX_CONTENT_CHARS`]. Failures never abort a run; the caller writes the
//! document with a placeholder section instead.
//!
//! The API key is never logged.

use crate::config::CompletionConfig;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Statement characters kept in the prompt.
pub const MAX_CONTENT_CHARS: usize = 2000;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4000;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion is not configured")]
    Unavailable,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no text")]
    Empty,
}

/// What a prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub title: &'a str,
    pub difficulty: &'a str,
    /// Statement HTML.
    pub content: &'a str,
}

/// Something that can write a solution for a question.
pub trait Completion {
    fn is_available(&self) -> bool;
    fn complete(&self, fields: &PromptFields<'_>) -> Result<String, CompletionError>;
}

/// Blocking chat-completions client.
pub struct ChatClient {
    client: Client,
    config: CompletionConfig,
}

impl ChatClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

impl Completion for ChatClient {
    fn is_available(&self) -> bool {
        self.config.is_available()
    }

    #[instrument(level = "info", skip_all, fields(model = %self.config.model, title = %question.title))]
    fn complete(&self, question: &PromptFields<'_>) -> Result<String, CompletionError> {
        if !self.is_available() {
            return Err(CompletionError::Unavailable);
        }
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let req = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessageReq {
                role: "user",
                content: build_prompt(&self.config.prompt_template, question),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(&req)
            .send()?;

        let status = res.status();
        let body = res.text()?;
        if !status.is_success() {
            let message = extract_api_error(&body).unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }
        parse_completion(&body)
    }
}

/// Fill the prompt template with cleaned fields.
pub fn build_prompt(template: &str, fields: &PromptFields<'_>) -> String {
    let content: String = strip_html(fields.content)
        .chars()
        .take(MAX_CONTENT_CHARS)
        .collect();
    fill_template(
        template,
        &[
            ("title", fields.title),
            ("difficulty", fields.difficulty),
            ("content", &content),
        ],
    )
}

/// Replace `{key}` placeholders.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = tpl.to_string();
    for (k, v) in pairs {
        let needle = format!("{{{}}}", k);
        out = out.replace(&needle, v);
    }
    out
}

/// Drop `<...>` tags and collapse whitespace runs to one space.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessageReq {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResp,
}

#[derive(Deserialize)]
struct ChatMessageResp {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)?;
    if let Some(usage) = &parsed.usage {
        info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, "completion usage");
    }
    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(CompletionError::Empty);
    }
    debug!(chars = text.chars().count(), "completion received");
    Ok(text)
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct EWrap {
        error: EObj,
    }
    #[derive(Deserialize)]
    struct EObj {
        message: String,
    }
    serde_json::from_str::<EWrap>(body)
        .ok()
        .map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_collapses_space() {
        let html = "<p>Given an <code>array</code>\n\n   of <strong>integers</strong>.</p>";
        assert_eq!(strip_html(html), "Given an array of integers.");
    }

    #[test]
    fn strip_html_keeps_comparison_text_outside_tags() {
        assert_eq!(strip_html("1 &lt;= n"), "1 &lt;= n");
        assert_eq!(strip_html("a > b"), "a > b");
    }

    #[test]
    fn prompt_fills_placeholders() {
        let fields = PromptFields {
            title: "两数之和",
            difficulty: "Easy",
            content: "<p>给定数组</p>",
        };
        let prompt = build_prompt("T={title} D={difficulty} C={content} {title}", &fields);
        assert_eq!(prompt, "T=两数之和 D=Easy C=给定数组 两数之和");
    }

    #[test]
    fn prompt_truncates_content_by_chars() {
        let long = "题".repeat(MAX_CONTENT_CHARS + 50);
        let fields = PromptFields {
            title: "t",
            difficulty: "Hard",
            content: &long,
        };
        let prompt = build_prompt("{content}", &fields);
        assert_eq!(prompt.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn completion_text_extracted() {
        let body = r#"{"choices": [{"message": {"content": "  思路...  "}}],
                       "usage": {"prompt_tokens": 10, "completion_tokens": 20}}"#;
        assert_eq!(parse_completion(body).unwrap(), "思路...");
    }

    #[test]
    fn empty_completion_is_error() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        assert!(matches!(parse_completion(body), Err(CompletionError::Empty)));
        assert!(matches!(parse_completion(r#"{"choices": []}"#), Err(CompletionError::Empty)));
    }

    #[test]
    fn api_error_message_extracted() {
        let body = r#"{"error": {"message": "Authentication Fails", "type": "auth"}}"#;
        assert_eq!(extract_api_error(body).as_deref(), Some("Authentication Fails"));
        assert_eq!(extract_api_error("gateway timeout"), None);
    }

    #[test]
    fn unconfigured_client_refuses() {
        let client = ChatClient::new(CompletionConfig::default()).unwrap();
        assert!(!client.is_available());
        let fields = PromptFields {
            title: "t",
            difficulty: "Easy",
            content: "",
        };
        assert!(matches!(client.complete(&fields), Err(CompletionError::Unavailable)));
    }
}
