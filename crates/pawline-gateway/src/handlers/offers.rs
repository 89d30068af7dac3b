// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated offer actions, sharing the SMS state machine.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use pawline_offers::{CommandSource, sweep};

use crate::handlers::error_response;
use crate::state::AppState;

/// Response body for offer accept/decline.
#[derive(Debug, Serialize)]
pub struct OfferActionResponse {
    pub outcome: &'static str,
    pub message: String,
}

/// POST /v1/offers/{id}/accept
pub async fn post_offer_accept(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .processor
        .accept_by_id(&id, Utc::now(), CommandSource::Api)
        .await
    {
        Ok(reply) => Json(OfferActionResponse {
            outcome: reply.outcome.as_str(),
            message: reply.message,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /v1/offers/{id}/decline
pub async fn post_offer_decline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .processor
        .decline_by_id(&id, Utc::now(), CommandSource::Api)
        .await
    {
        Ok(reply) => Json(OfferActionResponse {
            outcome: reply.outcome.as_str(),
            message: reply.message,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Response body for the expiry sweep.
#[derive(Debug, Serialize)]
pub struct ExpireResponse {
    pub success: bool,
    pub expired_count: usize,
    pub timestamp: String,
}

/// POST /v1/offers/expire
///
/// Cron-facing sweep; flips overdue `sent` offers to `expired`.
pub async fn post_offers_expire(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    match sweep::expire_overdue(state.store.as_ref(), now).await {
        Ok(expired) => Json(ExpireResponse {
            success: true,
            expired_count: expired.len(),
            timestamp: now.to_rfc3339(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
