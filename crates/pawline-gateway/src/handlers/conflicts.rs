// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conflict listing and resolution.
//!
//! Conflicts are computed, never stored: listing re-detects from the
//! current windows, and resolution re-derives the pair from the conflict
//! id before applying the chosen strategy.

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
use pawline_core::types::{ActorType, AssignmentWindow, AuditEvent, event_types};
use pawline_core::PawlineError;
use pawline_routing::{
    Conflict, ResolutionStrategy, WindowAction, detect_conflicts, plan_resolution,
};

use crate::handlers::{ErrorResponse, WindowResponse, error_response};
use crate::state::AppState;

/// Wire shape of a detected conflict.
#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub conflict_id: String,
    pub window_a: WindowResponse,
    pub window_b: WindowResponse,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
}

impl ConflictResponse {
    fn from_conflict(conflict: &Conflict, now: DateTime<Utc>) -> Self {
        Self {
            conflict_id: conflict.id.clone(),
            window_a: WindowResponse::from_window(&conflict.window_a, now),
            window_b: WindowResponse::from_window(&conflict.window_b, now),
            overlap_start: conflict.overlap_start,
            overlap_end: conflict.overlap_end,
        }
    }
}

/// Query parameters for GET /v1/assignments/conflicts.
#[derive(Debug, Deserialize)]
pub struct ListConflictsQuery {
    pub org_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// GET /v1/assignments/conflicts
pub async fn list_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ListConflictsQuery>,
) -> Response {
    let now = Utc::now();
    let filter = WindowFilter {
        thread_id: query.thread_id,
        ..Default::default()
    };
    match state.store.list_windows(&query.org_id, &filter).await {
        Ok(windows) => {
            let conflicts = detect_conflicts(&windows);
            let body: Vec<ConflictResponse> = conflicts
                .iter()
                .map(|c| ConflictResponse::from_conflict(c, now))
                .collect();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Request body for POST /v1/assignments/conflicts/{id}/resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveConflictRequest {
    pub org_id: String,
    pub strategy: ResolutionStrategy,
}

/// Response body for conflict resolution.
#[derive(Debug, Serialize)]
pub struct ResolveConflictResponse {
    pub success: bool,
    /// True when an active window was deleted; the thread's next inbound
    /// will re-route to the owner inbox.
    pub rerouted: bool,
    pub message: String,
}

/// POST /v1/assignments/conflicts/{id}/resolve
pub async fn resolve_conflict(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ResolveConflictRequest>,
) -> Response {
    let now = Utc::now();

    let Some((id_a, id_b)) = id.split_once('~') else {
        return error_response(PawlineError::InvalidInput(format!(
            "malformed conflict id: {id}"
        )));
    };

    let result = async {
        let window_a = require_window(&state, &body.org_id, id_a).await?;
        let window_b = require_window(&state, &body.org_id, id_b).await?;

        let pair = [window_a, window_b];
        let conflicts = detect_conflicts(&pair);
        let Some(conflict) = conflicts.first() else {
            // The windows no longer overlap; nothing to resolve.
            return Ok(None);
        };

        let plan = plan_resolution(conflict, body.strategy, now);
        let mut rerouted = false;
        for action in &plan.actions {
            match action {
                WindowAction::Delete {
                    window_id,
                    was_active,
                } => {
                    state.store.delete_window(window_id).await?;
                    rerouted = rerouted || *was_active;
                }
                WindowAction::Truncate {
                    window_id,
                    new_starts_at,
                    new_ends_at,
                } => {
                    state
                        .store
                        .update_window(
                            window_id,
                            &WindowPatch {
                                starts_at: Some(*new_starts_at),
                                ends_at: Some(*new_ends_at),
                                ..Default::default()
                            },
                        )
                        .await?;
                }
            }
        }

        let audit = AuditEvent {
            org_id: body.org_id.clone(),
            event_type: event_types::CONFLICT_RESOLVED.to_string(),
            actor_type: ActorType::Owner,
            actor_id: None,
            entity_type: Some("conflict".to_string()),
            entity_id: Some(conflict.id.clone()),
            correlation_id: None,
            metadata: json!({
                "strategy": body.strategy,
                "plan": plan,
            }),
            created_at: now,
        };
        if let Err(e) = state.store.record_audit(&audit).await {
            tracing::error!(error = %e, "conflict resolution audit failed");
        }

        Ok(Some(rerouted))
    }
    .await;

    match result {
        Ok(Some(rerouted)) => {
            let message = if rerouted {
                "Conflict resolved. An active window was removed; messages will now route \
                 to the owner inbox until a new window becomes active."
                    .to_string()
            } else {
                "Conflict resolved.".to_string()
            };
            Json(ResolveConflictResponse {
                success: true,
                rerouted,
                message,
            })
            .into_response()
        }
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "windows no longer overlap; nothing to resolve".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn require_window(
    state: &AppState,
    org_id: &str,
    id: &str,
) -> Result<AssignmentWindow, PawlineError> {
    state
        .store
        .get_window(id)
        .await?
        .filter(|w| w.org_id == org_id)
        .ok_or_else(|| PawlineError::NotFound {
            entity: "assignment window",
            id: id.to_string(),
        })
}
