pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the webhook route tree.
///
/// Each endpoint also answers with a trailing slash, since platforms are
/// registered with whichever form the operator typed.
///
/// ```text
/// POST /webhook/telegram[/]     shared-secret authenticated updates
/// POST /webhook/zoom[/]         URL validation challenge or signed event
/// ```
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/webhook/telegram", post(handlers::telegram::telegram_webhook))
        .route("/webhook/telegram/", post(handlers::telegram::telegram_webhook))
        .route("/webhook/zoom", post(handlers::zoom::zoom_webhook))
        .route("/webhook/zoom/", post(handlers::zoom::zoom_webhook))
}
