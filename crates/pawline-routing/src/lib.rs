// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing decision engine and assignment-window conflict detector.
//!
//! Everything in this crate is pure: callers load a snapshot from the
//! store, evaluate here, and apply any resulting mutations back through
//! the store. That keeps the live path, the simulate endpoint, and the
//! tests on one implementation.

pub mod conflict;
pub mod engine;

pub use conflict::{
    Conflict, ResolutionPlan, ResolutionStrategy, WindowAction, conflict_id, detect_conflicts,
    plan_resolution,
};
pub use engine::{RULESET_VERSION, RoutingContext, RoutingDecision, TraceStep, evaluate};
