//! Slack Web API reply sink
//!
//! Posts replies through `chat.postMessage` and resolves the bot's own
//! identity through `auth.test`.

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::interface::{BotIdentity, OutboundReply, ReplySink};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

/// Default Slack Web API base
pub const SLACK_API_BASE: &str = "https://slack.com/api/";

/// Slack connection settings
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`)
    pub token: String,

    /// Display name used when `auth.test` does not report one
    pub name: String,

    /// Web API base URL
    pub api_base: String,

    pub request_timeout: Duration,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>) -> Self {
        let defaults = BotConfig::default();
        Self {
            token: token.into(),
            name: defaults.name,
            api_base: SLACK_API_BASE.to_string(),
            request_timeout: defaults.request_timeout,
        }
    }

    /// Settings from the bot configuration; fails without a token
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Ok(Self {
            token: config.require_token()?.to_string(),
            name: config.name.clone(),
            api_base: SLACK_API_BASE.to_string(),
            request_timeout: config.request_timeout,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    user: Option<String>,
}

impl ApiResponse {
    fn into_result(self, method: &str) -> Result<Self> {
        if self.ok {
            Ok(self)
        } else {
            Err(BotError::Transport(format!(
                "{method} failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )))
        }
    }
}

/// Slack Web API client
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    api_base: Url,
    token: String,
    name: String,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let mut base = config.api_base;
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base =
            Url::parse(&base).map_err(|e| BotError::Config(format!("invalid Slack API URL: {e}")))?;
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_base,
            token: config.token,
            name: config.name,
        })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        self.api_base
            .join(method)
            .map_err(|e| BotError::Config(format!("invalid Slack method {method}: {e}")))
    }

    async fn call(&self, method: &str, body: &Value) -> Result<ApiResponse> {
        let response = self
            .client
            .post(self.method_url(method)?)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::Transport(format!(
                "{method} HTTP error: {}",
                response.status()
            )));
        }

        response.json::<ApiResponse>().await?.into_result(method)
    }

    /// Resolve the identity the token authenticates as
    pub async fn auth_test(&self) -> Result<BotIdentity> {
        let response = self.call("auth.test", &json!({})).await?;
        let user_id = response
            .user_id
            .ok_or_else(|| BotError::Transport("auth.test returned no user_id".to_string()))?;
        let name = response.user.unwrap_or_else(|| self.name.clone());

        tracing::info!(%user_id, %name, "Authenticated with Slack");
        Ok(BotIdentity::new(user_id, name))
    }
}

/// `chat.postMessage` body for a reply
pub fn post_message_payload(reply: &OutboundReply) -> Value {
    let mut payload = json!({
        "channel": reply.channel_id,
        "text": reply.text,
        "as_user": true,
    });

    if let Some(attachment) = &reply.attachment {
        payload["attachments"] = json!([{
            "fallback": attachment.fallback_text,
            "color": attachment.color,
            "title": attachment.title,
            "text": attachment.body,
            "mrkdwn": true,
        }]);
    }

    payload
}

#[async_trait]
impl ReplySink for SlackClient {
    async fn post_message(&self, reply: OutboundReply) -> Result<()> {
        self.call("chat.postMessage", &post_message_payload(&reply))
            .await?;
        tracing::debug!(channel = %reply.channel_id, "Reply posted");
        Ok(())
    }
}
