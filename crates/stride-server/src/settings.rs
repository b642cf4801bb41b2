//! Runtime configuration, deserialised from `config.toml` layered under
//! `STRIDE_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use stride_api::ApiConfig;
use stride_upstream::{AnthropicConfig, ClerkConfig, StreamConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,

  pub clerk_secret_key:     String,
  /// PEM-encoded public key for session verification.
  pub clerk_jwt_public_key: String,
  #[serde(default = "default_clerk_api_url")]
  pub clerk_api_url:        String,
  /// `whsec_…` secret shared with the webhook sender.
  pub clerk_webhook_secret: String,

  pub stream_api_key:       String,
  pub stream_api_secret:    String,
  #[serde(default = "default_stream_api_url")]
  pub stream_api_url:       String,

  pub anthropic_api_key:    String,
  #[serde(default = "default_anthropic_api_url")]
  pub anthropic_api_url:    String,
  #[serde(default = "default_anthropic_model")]
  pub anthropic_model:      String,

  #[serde(default = "default_chat_channels")]
  pub chat_channels:        Vec<String>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("stride.db") }
fn default_clerk_api_url() -> String { "https://api.clerk.com".to_owned() }
fn default_stream_api_url() -> String {
  "https://chat.stream-io-api.com".to_owned()
}
fn default_anthropic_api_url() -> String {
  "https://api.anthropic.com".to_owned()
}
fn default_anthropic_model() -> String { "claude-3-5-haiku-latest".to_owned() }
fn default_chat_channels() -> Vec<String> {
  ["community", "announcements", "wins"].map(str::to_owned).to_vec()
}

impl ServerConfig {
  /// Load from an optional TOML file, then let `STRIDE_*` environment
  /// variables override individual keys. `STRIDE_CHAT_CHANNELS` is a
  /// comma-separated list.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("STRIDE")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("chat_channels"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn clerk(&self) -> ClerkConfig {
    ClerkConfig {
      api_url:        self.clerk_api_url.clone(),
      secret_key:     self.clerk_secret_key.clone(),
      jwt_public_key: self.clerk_jwt_public_key.clone(),
    }
  }

  pub fn stream(&self) -> StreamConfig {
    StreamConfig {
      api_url:    self.stream_api_url.clone(),
      api_key:    self.stream_api_key.clone(),
      api_secret: self.stream_api_secret.clone(),
    }
  }

  pub fn anthropic(&self) -> AnthropicConfig {
    AnthropicConfig {
      api_url: self.anthropic_api_url.clone(),
      api_key: self.anthropic_api_key.clone(),
      model:   self.anthropic_model.clone(),
    }
  }

  pub fn api(&self) -> ApiConfig {
    ApiConfig {
      webhook_secret: self.clerk_webhook_secret.clone(),
      chat_channels:  self.chat_channels.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  const REQUIRED: &str = r#"
    clerk_secret_key = "sk_test"
    clerk_jwt_public_key = "-----BEGIN PUBLIC KEY-----"
    clerk_webhook_secret = "whsec_abc"
    stream_api_key = "key"
    stream_api_secret = "secret"
    anthropic_api_key = "ak"
  "#;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_everything_but_secrets() {
    let cfg = parse(REQUIRED).unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:3000");
    assert_eq!(cfg.clerk_api_url, "https://api.clerk.com");
    assert_eq!(cfg.stream_api_url, "https://chat.stream-io-api.com");
    assert_eq!(cfg.anthropic_api_url, "https://api.anthropic.com");
    assert_eq!(cfg.chat_channels, vec!["community", "announcements", "wins"]);
    assert_eq!(cfg.api().webhook_secret, "whsec_abc");
  }

  #[test]
  fn explicit_values_win() {
    let toml = format!("{REQUIRED}\nport = 8080\nchat_channels = [\"wins\"]\n");
    let cfg = parse(&toml).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.api().chat_channels, vec!["wins"]);
  }

  #[test]
  fn missing_secret_is_an_error() {
    assert!(parse("port = 1").is_err());
  }

  #[test]
  fn paths_without_tilde_are_unchanged() {
    let plain = Path::new("/var/lib/stride.db");
    assert_eq!(expand_tilde(plain), plain);
  }
}
