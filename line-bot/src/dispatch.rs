//! Event dispatch: picks a canned reply per message kind and sends it.
//!
//! ## Routing
//!
//! ```text
//! text  → keyword acknowledgment | screenshot prompt
//! image → flex template          | plain-text menu
//! other → no reply
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::line::{Event, Message, MessageEvent, ReplyClient, ReplyError, ReplyMessage};
use crate::template::FlexTemplate;

/// Choices offered to the user after a screenshot. Matched exactly.
pub const SELECTION_KEYWORDS: [&str; 3] = ["削除候補", "非表示", "残す"];

pub const SCREENSHOT_PROMPT: &str =
    "LINEトークのスクリーンショットを送っていただくと、整理方法をアドバイスします。";

pub const FALLBACK_MENU: &str =
    "スクリーンショットを確認しました。どうしますか？\n・削除候補\n・非表示\n・残す";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("reply delivery failed: {0}")]
    Delivery(#[from] ReplyError),
}

/// Acknowledgment for a recognized selection keyword.
pub fn acknowledgment(keyword: &str) -> String {
    format!("「{}」を選択しました。お役に立てて良かったです！", keyword)
}

/// Routes authenticated events to a single reply each.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn ReplyClient>,
    template: Option<Arc<FlexTemplate>>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ReplyClient>, template: Option<FlexTemplate>) -> Self {
        Self {
            client,
            template: template.map(Arc::new),
        }
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Select the reply for `event` without sending anything.
    ///
    /// Returns the reply token and message, or `None` for unhandled kinds.
    pub fn reply_for<'e>(&self, event: &'e Event) -> Option<(&'e str, ReplyMessage)> {
        let Event::Message(MessageEvent {
            reply_token,
            message,
        }) = event
        else {
            return None;
        };

        let reply = match message {
            Message::Text(text) => {
                if SELECTION_KEYWORDS.contains(&text.text.as_str()) {
                    ReplyMessage::text(acknowledgment(&text.text))
                } else {
                    ReplyMessage::text(SCREENSHOT_PROMPT)
                }
            }
            Message::Image => match &self.template {
                Some(template) => template.to_reply(),
                None => ReplyMessage::text(FALLBACK_MENU),
            },
            Message::Other => return None,
        };

        Some((reply_token.as_str(), reply))
    }

    /// Reply to one event.
    ///
    /// Returns `true` if a reply was sent, `false` if the event kind has no
    /// handler.
    pub async fn dispatch(&self, event: &Event) -> Result<bool, DispatchError> {
        let kind = event.kind();

        let Some((reply_token, reply)) = self.reply_for(event) else {
            info!(kind, "event_ignored");
            return Ok(false);
        };

        info!(kind, "event_dispatching");
        self.client.reply(reply_token, std::slice::from_ref(&reply)).await?;
        info!(kind, "event_replied");

        Ok(true)
    }
}
