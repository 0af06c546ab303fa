//! LINE Messaging API module.
//!
//! This module provides:
//! - Webhook and reply message types
//! - The reply client used to answer events
//!
//! ## Flow
//!
//! ```text
//! LINE → POST /webhook → Dispatcher → ReplyClient → LINE reply API
//! ```

pub mod client;
pub mod types;

pub use client::{LineClient, ReplyClient, ReplyError, DEFAULT_API_BASE};
pub use types::{
    Event, Message, MessageEvent, ReplyMessage, ReplyRequest, TextMessage, WebhookPayload,
};
