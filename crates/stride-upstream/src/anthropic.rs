//! Anthropic: LLM-backed review of identity statements.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use stride_core::statement::{StatementValidator, Verdict};

use crate::{Error, Result, http_client, status_error};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 300;

const SYSTEM_PROMPT: &str = "You review identity statements for a habit \
coaching app. An identity statement is a short first-person sentence \
describing who the writer is becoming, such as \"I am someone who trains \
every morning\". Reply with only a JSON object of the form \
{\"valid\": true|false, \"feedback\": \"...\"}. When the text is not a \
first-person identity statement, set valid to false and suggest in one or \
two sentences how to rephrase it. Otherwise set valid to true and give one \
sentence of encouragement.";

/// Connection settings for Anthropic.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
  pub api_url: String,
  pub api_key: String,
  pub model:   String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
  model:      &'a str,
  max_tokens: u32,
  system:     &'a str,
  messages:   [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
  #[serde(default)]
  content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  text: Option<String>,
}

/// Async client for the Anthropic Messages API. Cheap to clone.
#[derive(Clone)]
pub struct AnthropicClient {
  client:  Client,
  api_url: String,
  api_key: String,
  model:   String,
}

impl AnthropicClient {
  pub fn new(config: AnthropicConfig) -> Result<Self> {
    Ok(Self {
      client:  http_client()?,
      api_url: config.api_url.trim_end_matches('/').to_owned(),
      api_key: config.api_key,
      model:   config.model,
    })
  }
}

/// Pull the verdict object out of a model reply, tolerating prose or code
/// fences around it.
fn parse_verdict(reply: &str) -> Result<Verdict> {
  let start = reply.find('{');
  let end = reply.rfind('}');
  match (start, end) {
    (Some(s), Some(e)) if s < e => Ok(serde_json::from_str(&reply[s..=e])?),
    _ => Err(Error::UnexpectedResponse(format!(
      "no JSON object in model reply: {reply}"
    ))),
  }
}

impl StatementValidator for AnthropicClient {
  type Error = Error;

  /// `POST /v1/messages`
  async fn validate(&self, statement: &str) -> Result<Verdict> {
    let body = MessagesRequest {
      model:      &self.model,
      max_tokens: MAX_TOKENS,
      system:     SYSTEM_PROMPT,
      messages:   [Message { role: "user", content: statement }],
    };
    let resp = self
      .client
      .post(format!("{}/v1/messages", self.api_url))
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .json(&body)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(status_error("anthropic", resp).await);
    }
    let reply: MessagesResponse = resp.json().await?;
    let text = reply
      .content
      .into_iter()
      .find(|b| b.kind == "text")
      .and_then(|b| b.text)
      .ok_or_else(|| {
        Error::UnexpectedResponse("model reply has no text block".into())
      })?;
    parse_verdict(&text)
  }
}
