// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Route groups: the unauthenticated webhook + health routes, and the
//! bearer-gated `/v1` admin API.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pawline_core::PawlineError;

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;

/// Gateway server configuration (mirrors GatewayConfig from pawline-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Assemble the full route tree for the given state.
///
/// Exposed separately from [`start_server`] so tests can drive the router
/// without binding a socket.
pub fn build_router(state: AppState) -> Router {
    // Unauthenticated: the webhook (authenticated by carrier signature)
    // and liveness.
    let public_routes = Router::new()
        .route("/webhooks/sms", post(handlers::webhook::post_webhook))
        .route("/health", get(handlers::health::get_health))
        .with_state(state.clone());

    // Bearer-gated admin API.
    let api_routes = Router::new()
        .route("/v1/routing/simulate", get(handlers::routing::get_simulate))
        .route(
            "/v1/offers/expire",
            post(handlers::offers::post_offers_expire),
        )
        .route(
            "/v1/offers/{id}/accept",
            post(handlers::offers::post_offer_accept),
        )
        .route(
            "/v1/offers/{id}/decline",
            post(handlers::offers::post_offer_decline),
        )
        .route(
            "/v1/assignments/windows",
            get(handlers::windows::list_windows).post(handlers::windows::create_window),
        )
        .route(
            "/v1/assignments/windows/{id}",
            patch(handlers::windows::update_window).delete(handlers::windows::delete_window),
        )
        .route(
            "/v1/assignments/conflicts",
            get(handlers::conflicts::list_conflicts),
        )
        .route(
            "/v1/assignments/conflicts/{id}/resolve",
            post(handlers::conflicts::resolve_conflict),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), PawlineError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PawlineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| PawlineError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
