//! Outbound reply delivery to the LINE Messaging API.
//!
//! Replies are sent once. There is no retry: reply tokens are single use and
//! expire quickly, so a failed delivery is reported back to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use super::types::{ReplyMessage, ReplyRequest};

/// Default LINE API host.
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Errors from a reply delivery.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("reply rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends a reply addressed by a one-time reply token.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), ReplyError>;
}

/// HTTP client for `POST /v2/bot/message/reply`.
#[derive(Clone)]
pub struct LineClient {
    http: Client,
    access_token: String,
    reply_url: String,
}

impl LineClient {
    /// Create a client for the given API base (e.g. [`DEFAULT_API_BASE`]).
    pub fn new(
        api_base: &str,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, ReplyError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            access_token,
            reply_url: format!("{}{}", api_base.trim_end_matches('/'), REPLY_PATH),
        })
    }

    pub fn reply_url(&self) -> &str {
        &self.reply_url
    }
}

#[async_trait]
impl ReplyClient for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<(), ReplyError> {
        let request = ReplyRequest {
            reply_token,
            messages,
        };

        let resp = self
            .http
            .post(&self.reply_url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(url = %self.reply_url, error = %e, "line_reply_timeout");
                } else {
                    error!(url = %self.reply_url, error = %e, "line_reply_request_error");
                }
                ReplyError::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status_code = status.as_u16(),
                response_body = %body,
                "line_reply_rejected"
            );
            return Err(ReplyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            status_code = status.as_u16(),
            message_count = messages.len(),
            "line_reply_sent"
        );

        Ok(())
    }
}
