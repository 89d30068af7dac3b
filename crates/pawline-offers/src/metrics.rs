// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Standalone metrics window aggregator.
//!
//! The offer command path recomputes inside its primary transaction; this
//! entry point serves the admin API and backfills, reusing the same pure
//! computation so the two paths cannot drift.

use chrono::{DateTime, Duration, Utc};

use pawline_core::metrics::compute_metrics;
use pawline_core::types::{SitterMetricsWindow, WINDOW_TYPE_WEEKLY_7D};
use pawline_core::{MessageStore, PawlineError};

/// Recompute one sitter's trailing 7-day window from scratch and upsert it.
pub async fn recompute(
    store: &dyn MessageStore,
    org_id: &str,
    sitter_id: &str,
    now: DateTime<Utc>,
) -> Result<SitterMetricsWindow, PawlineError> {
    let window_start = now - Duration::days(7);
    let offers = store
        .list_offers_in_window(org_id, sitter_id, window_start, now)
        .await?;
    let m = compute_metrics(&offers, now);

    let window = SitterMetricsWindow {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_string(),
        sitter_id: sitter_id.to_string(),
        window_start,
        window_end: now,
        window_type: WINDOW_TYPE_WEEKLY_7D.to_string(),
        avg_response_seconds: m.avg_response_seconds,
        median_response_seconds: m.median_response_seconds,
        offer_accept_rate: m.offer_accept_rate,
        offer_decline_rate: m.offer_decline_rate,
        offer_expire_rate: m.offer_expire_rate,
        last_offer_responded_at: None,
        updated_at: now,
    };
    store.upsert_metrics_window(&window).await?;
    Ok(window)
}
