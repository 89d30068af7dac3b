// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar sync collaborator.
//!
//! Sync runs post-commit and fail-open: a failure is logged by the caller
//! and never rolls back the booking assignment that triggered it.

use async_trait::async_trait;

use crate::error::PawlineError;

/// Pushes a confirmed booking assignment to an external calendar.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn sync_booking(
        &self,
        org_id: &str,
        booking_id: &str,
        sitter_id: &str,
        note: &str,
    ) -> Result<(), PawlineError>;
}

/// Default implementation that records the sync intent in the log and
/// succeeds. Used until an org connects a real calendar backend.
pub struct LoggingCalendarSync;

#[async_trait]
impl CalendarSync for LoggingCalendarSync {
    async fn sync_booking(
        &self,
        org_id: &str,
        booking_id: &str,
        sitter_id: &str,
        note: &str,
    ) -> Result<(), PawlineError> {
        tracing::info!(org_id, booking_id, sitter_id, note, "calendar sync (no backend configured)");
        Ok(())
    }
}
