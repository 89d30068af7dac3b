// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment window CRUD.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use pawline_core::traits::{WindowFilter, WindowPatch};
use pawline_core::types::{
    ActorType, AssignmentWindow, AuditEvent, WindowStatus, event_types,
};
use pawline_core::PawlineError;

use crate::handlers::{WindowResponse, error_response};
use crate::state::AppState;

/// Query parameters for GET /v1/assignments/windows.
#[derive(Debug, Deserialize)]
pub struct ListWindowsQuery {
    pub org_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub sitter_id: Option<String>,
    #[serde(default)]
    pub status: Option<WindowStatus>,
}

/// GET /v1/assignments/windows
pub async fn list_windows(
    State(state): State<AppState>,
    Query(query): Query<ListWindowsQuery>,
) -> Response {
    let now = Utc::now();
    let filter = WindowFilter {
        thread_id: query.thread_id,
        sitter_id: query.sitter_id,
        status: query.status,
        at: Some(now),
    };
    match state.store.list_windows(&query.org_id, &filter).await {
        Ok(windows) => {
            let body: Vec<WindowResponse> = windows
                .iter()
                .map(|w| WindowResponse::from_window(w, now))
                .collect();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/assignments/windows.
#[derive(Debug, Deserialize)]
pub struct CreateWindowRequest {
    pub org_id: String,
    pub thread_id: String,
    pub sitter_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub booking_ref: Option<String>,
}

/// POST /v1/assignments/windows
pub async fn create_window(
    State(state): State<AppState>,
    Json(body): Json<CreateWindowRequest>,
) -> Response {
    let now = Utc::now();
    let result = async {
        if body.starts_at >= body.ends_at {
            return Err(PawlineError::InvalidInput(
                "starts_at must be before ends_at".into(),
            ));
        }
        let thread = state
            .store
            .get_thread(&body.thread_id)
            .await?
            .filter(|t| t.org_id == body.org_id)
            .ok_or_else(|| PawlineError::NotFound {
                entity: "thread",
                id: body.thread_id.clone(),
            })?;

        let window = AssignmentWindow {
            id: uuid::Uuid::new_v4().to_string(),
            org_id: body.org_id.clone(),
            thread_id: thread.id,
            sitter_id: body.sitter_id.clone(),
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            booking_ref: body.booking_ref.clone(),
            created_at: now,
        };
        state.store.create_window(&window).await?;
        Ok(window)
    }
    .await;

    match result {
        Ok(window) => Json(WindowResponse::from_window(&window, now)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Request body for PATCH /v1/assignments/windows/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateWindowRequest {
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sitter_id: Option<String>,
    #[serde(default)]
    pub booking_ref: Option<String>,
}

/// PATCH /v1/assignments/windows/{id}
pub async fn update_window(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateWindowRequest>,
) -> Response {
    let now = Utc::now();
    let result = async {
        let existing = state
            .store
            .get_window(&id)
            .await?
            .ok_or_else(|| PawlineError::NotFound {
                entity: "assignment window",
                id: id.clone(),
            })?;

        let starts_at = body.starts_at.unwrap_or(existing.starts_at);
        let ends_at = body.ends_at.unwrap_or(existing.ends_at);
        if starts_at >= ends_at {
            return Err(PawlineError::InvalidInput(
                "starts_at must be before ends_at".into(),
            ));
        }

        let patch = WindowPatch {
            starts_at: body.starts_at,
            ends_at: body.ends_at,
            sitter_id: body.sitter_id.clone(),
            booking_ref: body.booking_ref.clone().map(Some),
        };
        state.store.update_window(&id, &patch).await
    }
    .await;

    match result {
        Ok(window) => Json(WindowResponse::from_window(&window, now)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Response body for DELETE /v1/assignments/windows/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteWindowResponse {
    pub success: bool,
    /// True when the window was active at deletion time; the thread's
    /// next inbound will re-route to the owner inbox.
    pub was_active: bool,
    pub message: String,
}

/// DELETE /v1/assignments/windows/{id}
pub async fn delete_window(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let now = Utc::now();
    let result = async {
        let window = state
            .store
            .get_window(&id)
            .await?
            .ok_or_else(|| PawlineError::NotFound {
                entity: "assignment window",
                id: id.clone(),
            })?;
        let was_active = window.is_active_at(now);
        state.store.delete_window(&id).await?;

        let audit = AuditEvent {
            org_id: window.org_id.clone(),
            event_type: event_types::WINDOW_DELETED.to_string(),
            actor_type: ActorType::Owner,
            actor_id: None,
            entity_type: Some("assignment_window".to_string()),
            entity_id: Some(window.id.clone()),
            correlation_id: None,
            metadata: json!({
                "thread_id": window.thread_id,
                "sitter_id": window.sitter_id,
                "was_active": was_active,
            }),
            created_at: now,
        };
        if let Err(e) = state.store.record_audit(&audit).await {
            tracing::error!(error = %e, "window deletion audit failed");
        }

        Ok(was_active)
    }
    .await;

    match result {
        Ok(was_active) => {
            let message = if was_active {
                "Active window deleted. Messages will now route to the owner inbox.".to_string()
            } else {
                "Window deleted.".to_string()
            };
            (
                StatusCode::OK,
                Json(DeleteWindowResponse {
                    success: true,
                    was_active,
                    message,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}
