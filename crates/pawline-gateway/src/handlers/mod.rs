// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! The webhook handler always answers 200/TwiML; the admin handlers map
//! engine errors onto conventional status codes.

pub mod conflicts;
pub mod health;
pub mod offers;
pub mod routing;
pub mod webhook;
pub mod windows;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use pawline_core::types::{AssignmentWindow, WindowStatus};
use pawline_core::PawlineError;

/// Error response body for admin routes.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map an engine error onto an admin-route response.
///
/// The webhook route never uses this: it answers 200 whatever happens.
pub(crate) fn error_response(err: PawlineError) -> Response {
    let (status, message) = match &err {
        PawlineError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        PawlineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        PawlineError::RoutingFailed { .. } => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        _ => {
            tracing::error!(error = %err, "admin request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Wire shape of an assignment window, with its derived status.
#[derive(Debug, Serialize)]
pub struct WindowResponse {
    pub id: String,
    pub thread_id: String,
    pub sitter_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub booking_ref: Option<String>,
    pub status: WindowStatus,
}

impl WindowResponse {
    pub(crate) fn from_window(window: &AssignmentWindow, now: DateTime<Utc>) -> Self {
        Self {
            id: window.id.clone(),
            thread_id: window.thread_id.clone(),
            sitter_id: window.sitter_id.clone(),
            starts_at: window.starts_at,
            ends_at: window.ends_at,
            booking_ref: window.booking_ref.clone(),
            status: window.status_at(now),
        }
    }
}
