// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The carrier webhook route.

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use pawline_carrier::twiml;

use crate::state::AppState;

/// POST /webhooks/sms
///
/// Always HTTP 200 with a TwiML body, whatever happened internally; the
/// carrier retries on anything else and retries are never wanted here.
pub async fn post_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let reply = state.ingress.handle_inbound(&body, signature, Utc::now()).await;

    (
        [(header::CONTENT_TYPE, "text/xml")],
        twiml::message_response(&reply),
    )
        .into_response()
}
