// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations: adapter wiring for `serve`, and the
//! store-backed `simulate` / `expire-offers` entry points.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

use pawline_carrier::{TwilioCarrier, TwilioConfig};
use pawline_config::PawlineConfig;
use pawline_core::traits::LoggingCalendarSync;
use pawline_core::types::Direction;
use pawline_core::{MessageStore, PawlineError};
use pawline_gateway::{AppState, AuthConfig, ServerConfig, start_server};
use pawline_ingress::IngressHandler;
use pawline_offers::OfferProcessor;
use pawline_routing::{RoutingContext, evaluate};
use pawline_storage::SqliteStore;

/// Start the gateway with all adapters wired.
pub async fn run(config: PawlineConfig) -> Result<(), PawlineError> {
    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let carrier = Arc::new(TwilioCarrier::new(TwilioConfig {
        account_sid: config.carrier.account_sid.clone(),
        auth_token: config.carrier.auth_token.clone(),
    }));
    let calendar = Arc::new(LoggingCalendarSync);

    // Signatures verify against the configured public URL, falling back to
    // the bind address for local development.
    let webhook_url = config.carrier.webhook_url.clone().unwrap_or_else(|| {
        format!(
            "http://{}:{}/webhooks/sms",
            config.gateway.host, config.gateway.port
        )
    });

    let ingress = IngressHandler::new(
        store.clone(),
        carrier,
        OfferProcessor::new(store.clone(), calendar.clone()),
        webhook_url,
    );

    let state = AppState {
        store: store.clone(),
        ingress: Arc::new(ingress),
        processor: Arc::new(OfferProcessor::new(store.clone(), calendar)),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        started_at: Instant::now(),
    };

    info!(service = %config.service.name, "starting gateway");
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    start_server(&server_config, state).await
}

/// Dry-run the routing engine for one thread and print the decision.
pub async fn simulate(
    config: PawlineConfig,
    thread_id: &str,
    at: Option<&str>,
    direction: &str,
) -> Result<(), PawlineError> {
    let at = match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| PawlineError::InvalidInput(format!("invalid --at timestamp: {e}")))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let direction: Direction = direction
        .parse()
        .map_err(|_| PawlineError::InvalidInput(format!("invalid --direction: {direction}")))?;

    let store = SqliteStore::open(&config.storage).await?;
    let thread = store
        .get_thread(thread_id)
        .await?
        .ok_or_else(|| PawlineError::NotFound {
            entity: "thread",
            id: thread_id.to_string(),
        })?;
    let windows = store.list_windows_for_thread(thread_id).await?;
    let overrides = store.list_overrides_for_thread(thread_id).await?;

    let decision = evaluate(
        &RoutingContext {
            thread,
            windows,
            overrides,
        },
        at,
        direction,
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&decision)
            .map_err(|e| PawlineError::Internal(e.to_string()))?
    );

    store.close().await
}

/// Expire overdue offers and report the count (cron entry point).
pub async fn expire_offers(config: PawlineConfig) -> Result<(), PawlineError> {
    let store = SqliteStore::open(&config.storage).await?;
    let expired = pawline_offers::sweep::expire_overdue(&store, Utc::now()).await?;
    println!("expired {} offer(s)", expired.len());
    store.close().await
}
