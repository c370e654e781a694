// src/assistant.rs
//! Conversational assistant on top of an OpenAI-compatible chat-completions
//! endpoint. It only consumes already-fetched raw items as context; it never
//! fetches or scores anything itself.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::fetch::{HttpRequest, HttpTransport};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Only the most recent turns are forwarded.
pub const MAX_HISTORY: usize = 20;

const SYSTEM_PROMPT: &str = "You are Santa's list-keeping helper. You discuss whether a person \
has been naughty or nice based only on the public posts, comments, news snippets and code \
activity supplied to you. Be light-hearted and fair, quote evidence when you can, never invent \
facts that are not in the supplied items, and keep answers under 120 words.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

pub struct Assistant {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

impl Assistant {
    pub fn new(cfg: &AssistantConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            max_tokens: cfg.max_tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One completion for the conversation so far. `context` holds raw item
    /// texts and may be empty.
    pub async fn reply(
        &self,
        history: &[ChatMessage],
        context: &[String],
    ) -> Result<String, AssistantError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AssistantError::MissingCredential(API_KEY_VAR))?;

        let context_block = render_context(context);
        let mut messages = vec![Msg {
            role: "system",
            content: SYSTEM_PROMPT,
        }];
        if let Some(block) = &context_block {
            messages.push(Msg {
                role: "system",
                content: block,
            });
        }
        let skip = history.len().saturating_sub(MAX_HISTORY);
        messages.extend(history.iter().skip(skip).map(|m| Msg {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &m.content,
        }));

        let body = serde_json::to_value(Req {
            model: &self.model,
            messages,
            temperature: 0.7,
            max_tokens: self.max_tokens,
        })
        .map_err(AssistantError::upstream)?;

        let req = HttpRequest::post(&self.endpoint)
            .bearer(api_key)
            .json(body)
            .timeout(Duration::from_secs(30));
        let resp = self.transport.send(req).await.map_err(|e| {
            warn!(target: "assistant", error = %e, "chat completion request failed");
            AssistantError::upstream(e)
        })?;
        if !resp.is_success() {
            warn!(target: "assistant", status = resp.status, "chat completion rejected");
            return Err(AssistantError::Upstream(format!("status {}", resp.status)));
        }

        let parsed: Resp = resp.json().map_err(AssistantError::upstream)?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AssistantError::Upstream("empty completion".into()))?;

        info!(target: "assistant", turns = history.len(), context = context.len(), "reply generated");
        Ok(reply)
    }
}

fn render_context(context: &[String]) -> Option<String> {
    if context.is_empty() {
        return None;
    }
    let mut out = String::from("Public items collected for this person:\n");
    for line in context {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    Some(out)
}
