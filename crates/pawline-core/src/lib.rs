// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pawline routing engine.
//!
//! This crate provides the domain types, error type, pure metrics math,
//! and the adapter traits (`MessageStore`, `CarrierProvider`,
//! `CalendarSync`) the rest of the workspace programs against.

pub mod error;
pub mod metrics;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PawlineError;
pub use traits::{
    CalendarSync, CarrierProvider, InsertOutcome, MessageStore, OfferResolution,
    ResolutionApplied, SendReceipt, WindowFilter, WindowPatch,
};
pub use types::{
    ActorType, AssignmentWindow, AuditEvent, Booking, BookingStatus, Client, DeliveryStatus,
    Direction, MessageEvent, MessageNumber, NumberClass, NumberStatus, OfferEvent, OfferStatus,
    Participant, RouteTarget, RoutingOverride, Sitter, SitterMetricsWindow, Thread, ThreadScope,
    ThreadStatus, WindowStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = PawlineError::Config("test".into());
        let _storage = PawlineError::storage(std::io::Error::other("test"));
        let _carrier = PawlineError::Carrier {
            message: "test".into(),
            source: None,
        };
        let _routing = PawlineError::RoutingFailed {
            reason: "unmapped number".into(),
            remediation: "check provisioning".into(),
        };
        let _not_found = PawlineError::NotFound {
            entity: "thread",
            id: "t-1".into(),
        };
        let _invalid = PawlineError::InvalidInput("starts_at >= ends_at".into());
        let _internal = PawlineError::Internal("test".into());
    }

    #[test]
    fn routing_failed_display_omits_remediation() {
        // The remediation hint is operator guidance for the audit log,
        // not part of the user-visible error message.
        let err = PawlineError::RoutingFailed {
            reason: "no org for +15550001111".into(),
            remediation: "verify number provisioning".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no org for"));
        assert!(!msg.contains("verify number"));
    }

    #[test]
    fn trait_objects_are_constructible() {
        fn _assert_store<T: MessageStore>() {}
        fn _assert_carrier<T: CarrierProvider>() {}
        fn _assert_calendar<T: CalendarSync>() {}
        let _noop: &dyn CalendarSync = &traits::LoggingCalendarSync;
    }
}
