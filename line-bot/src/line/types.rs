//! LINE Messaging API wire types.
//!
//! This module defines:
//! - Inbound webhook payloads (`events` and their messages)
//! - Outbound reply messages (text and flex)

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

// =============================================================================
// Inbound Webhook Types
// =============================================================================

/// Body of a webhook delivery.
///
/// An empty `events` list is a verification ping from the LINE console.
/// Events stay as raw JSON until the signature has been checked; see
/// [`WebhookPayload::events`].
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    /// Bot user ID the events are addressed to
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, rename = "events")]
    raw_events: Vec<Box<RawValue>>,
}

impl WebhookPayload {
    /// Parse a raw body, treating anything unparseable as an empty payload.
    pub fn parse_lenient(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    body_length = body.len(),
                    "webhook_payload_unparseable"
                );
                Self::default()
            }
        }
    }

    /// Number of entries in `events`, decodable or not.
    pub fn event_count(&self) -> usize {
        self.raw_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_events.is_empty()
    }

    /// Decode each event on its own.
    ///
    /// An entry that does not match a known shape (e.g. a standby-mode
    /// message without `replyToken`) becomes [`Event::Other`] and does not
    /// affect the rest of the batch.
    pub fn events(&self) -> Vec<Event> {
        self.raw_events
            .iter()
            .enumerate()
            .map(|(index, raw)| Event::from_raw(raw, index))
            .collect()
    }
}

/// One webhook event, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    /// follow, unfollow, postback, ... (no handler)
    #[serde(other)]
    Other,
}

/// A `message` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// One-time token used to address the reply
    pub reply_token: String,
    pub message: Message,
}

/// Message content of a `message` event, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    Text(TextMessage),
    Image,
    /// video, audio, sticker, location, file
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextMessage {
    pub text: String,
}

impl Event {
    fn from_raw(raw: &RawValue, index: usize) -> Self {
        match serde_json::from_str(raw.get()) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    event_index = index,
                    "webhook_event_undecodable"
                );
                Event::Other
            }
        }
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(m) => match m.message {
                Message::Text(_) => "text",
                Message::Image => "image",
                Message::Other => "other_message",
            },
            Event::Other => "other",
        }
    }
}

// =============================================================================
// Outbound Reply Types
// =============================================================================

/// A message sent back through the reply endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplyMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        /// Flex container, replayed exactly as authored
        contents: Box<RawValue>,
    },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into() }
    }
}

/// Request body of `POST /v2/bot/message/reply`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [ReplyMessage],
}
