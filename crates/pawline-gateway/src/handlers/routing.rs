// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing simulate endpoint.
//!
//! Read-only: loads the same snapshot the live path loads and evaluates
//! the same engine, persisting nothing.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use pawline_core::types::Direction;
use pawline_core::PawlineError;
use pawline_routing::{RoutingContext, evaluate};

use crate::handlers::error_response;
use crate::state::AppState;

/// Query parameters for GET /v1/routing/simulate.
#[derive(Debug, Deserialize)]
pub struct SimulateQuery {
    pub thread_id: String,
    /// Evaluation time; defaults to now.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    /// Message direction; defaults to inbound.
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// GET /v1/routing/simulate
pub async fn get_simulate(
    State(state): State<AppState>,
    Query(query): Query<SimulateQuery>,
) -> Response {
    let result = async {
        let thread = state
            .store
            .get_thread(&query.thread_id)
            .await?
            .ok_or_else(|| PawlineError::NotFound {
                entity: "thread",
                id: query.thread_id.clone(),
            })?;
        let windows = state.store.list_windows_for_thread(&thread.id).await?;
        let overrides = state.store.list_overrides_for_thread(&thread.id).await?;

        let at = query.at.unwrap_or_else(Utc::now);
        let direction = query.direction.unwrap_or(Direction::Inbound);
        Ok(evaluate(
            &RoutingContext {
                thread,
                windows,
                overrides,
            },
            at,
            direction,
        ))
    }
    .await;

    match result {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => error_response(e),
    }
}
