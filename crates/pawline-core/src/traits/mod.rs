// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by external collaborators.
//!
//! The engine crates program exclusively against these traits; concrete
//! backends (SQLite storage, Twilio carrier, calendar sync) live in their
//! own crates.

pub mod calendar;
pub mod carrier;
pub mod store;

pub use calendar::{CalendarSync, LoggingCalendarSync};
pub use carrier::{CarrierProvider, SendReceipt};
pub use store::{
    InsertOutcome, MessageStore, OfferResolution, ResolutionApplied, WindowFilter, WindowPatch,
};
