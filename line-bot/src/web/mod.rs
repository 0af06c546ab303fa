//! Web server module for the LINE webhook.
//!
//! Routes:
//! - `GET /` health check
//! - `POST /webhook` signed LINE events

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, line_webhook, AppState, StatusResponse, WebhookError};
pub use signature::{compute_signature, verify_signature, SIGNATURE_HEADER};

/// Path LINE delivers webhooks to.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(WEBHOOK_PATH, post(line_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
