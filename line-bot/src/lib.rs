//! Declutter Bot - LINE webhook that answers chat screenshots.
//!
//! A user sends a screenshot of a LINE talk; the bot answers with a fixed
//! flex message offering three choices, and acknowledges the choice when the
//! user taps one. Every request is handled on its own, with no stored state.
//!
//! ## Architecture
//!
//! ```text
//! LINE → POST /webhook → signature check → Dispatcher → LINE reply API
//! ```

pub mod config;
pub mod dispatch;
pub mod line;
pub mod template;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{DispatchError, Dispatcher};
pub use line::{LineClient, ReplyClient, ReplyError, ReplyMessage};
pub use template::FlexTemplate;
pub use web::{router, AppState};
