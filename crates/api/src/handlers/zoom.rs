//! Zoom webhook.
//!
//! The body is parsed first so the URL validation challenge can be told
//! apart from signed events; each shape then takes its own path.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kopilot_core::zoom::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use kopilot_core::{EventSource, ZoomRequest};
use kopilot_events::Notification;

use crate::error::AppResult;
use crate::handlers::{header_str, parse_json_body};
use crate::response::AcceptedResponse;
use crate::state::AppState;

const SOURCE: EventSource = EventSource::Zoom;

/// POST /webhook/zoom
pub async fn zoom_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let body = body?;
    let (payload, raw) = parse_json_body(&body)?;

    match ZoomRequest::classify(&payload)? {
        ZoomRequest::UrlValidation { plain_token } => {
            Ok(answer_url_validation(&state, &plain_token).into_response())
        }
        ZoomRequest::SignedEvent { event } => {
            let accepted =
                accept_signed_event(&state, &headers, &body, raw, event.as_deref()).await?;
            Ok(accepted.into_response())
        }
    }
}

/// Prove ownership of the endpoint. Nothing is stored or published.
fn answer_url_validation(state: &AppState, plain_token: &str) -> impl IntoResponse {
    tracing::info!(source = %SOURCE, "Answered URL validation challenge");
    Json(state.zoom.challenge_response(plain_token))
}

/// Verify the signature over the untouched body, then store and announce
/// the event on `zoom.event`.
async fn accept_signed_event(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    raw: &str,
    event: Option<&str>,
) -> AppResult<Json<AcceptedResponse>> {
    state
        .zoom
        .verify(
            header_str(headers, SIGNATURE_HEADER),
            header_str(headers, TIMESTAMP_HEADER),
            body,
        )
        .inspect_err(|e| tracing::warn!(source = %SOURCE, error = %e, "Rejected webhook"))?;

    let event_id = state.store.insert(SOURCE, raw).await?;

    state
        .bus
        .publish(SOURCE.subject(), &Notification::new(event_id))
        .await
        .ignore_failure();

    tracing::info!(
        source = %SOURCE,
        event_id,
        event = event.unwrap_or("unknown"),
        "Stored webhook event"
    );
    Ok(Json(AcceptedResponse::ok(event_id)))
}
