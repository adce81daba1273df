//! Telegram bot webhook.
//!
//! The shared secret is checked before the body is parsed, so an
//! unauthenticated request with a malformed body gets 403, not 400.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use kopilot_core::secret_token::TELEGRAM_SECRET_HEADER;
use kopilot_core::EventSource;
use kopilot_events::Notification;

use crate::error::AppResult;
use crate::handlers::{header_str, parse_json_body};
use crate::response::AcceptedResponse;
use crate::state::AppState;

const SOURCE: EventSource = EventSource::Telegram;

/// POST /webhook/telegram
///
/// Store the update and announce it on `telegram.update` with the full
/// update echoed in the notification.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<AcceptedResponse>> {
    state
        .telegram
        .verify(header_str(&headers, TELEGRAM_SECRET_HEADER))
        .inspect_err(|e| tracing::warn!(source = %SOURCE, error = %e, "Rejected webhook"))?;

    let body = body?;
    let (update, raw) = parse_json_body(&body)?;
    tracing::debug!(source = %SOURCE, payload = %update, "Received update");

    let event_id = state.store.insert(SOURCE, raw).await?;

    state
        .bus
        .publish(SOURCE.subject(), &Notification::new(event_id).with_update(update))
        .await
        .ignore_failure();

    tracing::info!(source = %SOURCE, event_id, "Stored webhook event");
    Ok(Json(AcceptedResponse::ok(event_id)))
}
