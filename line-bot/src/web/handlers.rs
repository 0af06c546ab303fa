//! Webhook endpoint handlers.
//!
//! The webhook handler:
//! 1. Parses the body leniently (an empty event list is a verification ping)
//! 2. Verifies the `X-Line-Signature` header for any non-empty event list
//! 3. Decodes each event and dispatches it to at most one reply
//!
//! All status code decisions live here; the dispatcher only sees
//! authenticated, parsed events.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::line::WebhookPayload;
use crate::web::signature::{verify_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

/// Status body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            status: "error",
            message: Some(message),
        }
    }
}

/// Failures surfaced to the webhook caller.
///
/// Messages are generic; details only go to the server log.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            WebhookError::MissingSignature => StatusResponse::error("Missing signature"),
            WebhookError::InvalidSignature => StatusResponse::error("Invalid signature"),
            WebhookError::Dispatch(_) => StatusResponse::error("Internal server error"),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

// =============================================================================
// LINE Webhook
// =============================================================================

/// LINE webhook endpoint.
pub async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>, WebhookError> {
    let payload = WebhookPayload::parse_lenient(&body);

    info!(
        body_length = body.len(),
        event_count = payload.event_count(),
        destination = payload.destination.as_deref().unwrap_or_default(),
        has_signature = headers.contains_key(SIGNATURE_HEADER),
        "line_webhook_received"
    );

    if payload.is_empty() {
        info!("line_webhook_verification_ping");
        return Ok(Json(StatusResponse::ok()));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().unwrap_or_default());

    if !verify_signature(state.config.channel_secret.as_bytes(), &body, signature) {
        return Err(match signature {
            None | Some("") => {
                warn!("line_webhook_signature_missing");
                WebhookError::MissingSignature
            }
            Some(_) => {
                warn!("line_webhook_signature_invalid");
                WebhookError::InvalidSignature
            }
        });
    }

    // Decode only after the body is known to come from LINE
    let events = payload.events();

    let mut replied = 0usize;
    for event in &events {
        match state.dispatcher.dispatch(event).await {
            Ok(true) => replied += 1,
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, kind = event.kind(), "line_webhook_dispatch_failed");
                return Err(e.into());
            }
        }
    }

    info!(
        event_count = events.len(),
        replied,
        "line_webhook_handled"
    );

    Ok(Json(StatusResponse::ok()))
}
