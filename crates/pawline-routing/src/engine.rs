// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing decision engine.
//!
//! `evaluate` is a pure function of a thread snapshot, the active override
//! list, and the supplied time: no I/O, no randomness, no hidden clock
//! reads. The live webhook path and the operator-facing simulate endpoint
//! share this single implementation, and identical inputs produce
//! byte-identical decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawline_core::types::{
    AssignmentWindow, Direction, RouteTarget, RoutingOverride, Thread,
};

/// Version of the rule list below. Bump when rule order or semantics change
/// so persisted traces remain interpretable.
pub const RULESET_VERSION: u32 = 1;

/// One evaluated rule in a routing trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub step: usize,
    pub rule: String,
    pub condition: String,
    pub result: bool,
    pub explanation: String,
}

/// The outcome of evaluating the rule list for a thread at a point in time.
///
/// Persisted alongside live routing events so historical decisions stay
/// auditable even after the ruleset changes version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub target: RouteTarget,
    pub target_id: Option<String>,
    /// Marks decisions driven by a manual override rather than the rule
    /// list, for downstream consumers.
    pub via_override: bool,
    pub reason: String,
    pub ruleset_version: u32,
    pub trace: Vec<TraceStep>,
}

/// Snapshot of everything the engine reads: the thread, its assignment
/// windows, and its manual overrides.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub thread: Thread,
    pub windows: Vec<AssignmentWindow>,
    pub overrides: Vec<RoutingOverride>,
}

/// Evaluate the prioritized rule list for a thread at `at`.
///
/// Rule order (stable for [`RULESET_VERSION`]):
/// 1. An active manual override wins outright.
/// 2. Outbound messages deliver to the client.
/// 3. Exactly one active assignment window delivers to that sitter.
/// 4. Overlapping active windows deliver to the owner inbox.
/// 5. Fallback: the owner inbox.
pub fn evaluate(
    ctx: &RoutingContext,
    at: DateTime<Utc>,
    direction: Direction,
) -> RoutingDecision {
    let mut trace = Vec::new();

    // Rule 1: manual override. The most recently starting active override
    // wins; ties break on id so evaluation is order-independent.
    let mut active_overrides: Vec<&RoutingOverride> = ctx
        .overrides
        .iter()
        .filter(|o| o.is_active_at(at))
        .collect();
    active_overrides.sort_by(|a, b| b.starts_at.cmp(&a.starts_at).then(a.id.cmp(&b.id)));

    if let Some(winner) = active_overrides.first() {
        trace.push(TraceStep {
            step: trace.len() + 1,
            rule: "routing_override".into(),
            condition: format!("override active at {}", at.to_rfc3339()),
            result: true,
            explanation: format!(
                "manual override {} ({}) preempts rule evaluation: {}",
                winner.id, winner.target, winner.reason
            ),
        });
        return RoutingDecision {
            target: winner.target,
            target_id: winner.target_sitter_id.clone(),
            via_override: true,
            reason: format!("manual override: {}", winner.reason),
            ruleset_version: RULESET_VERSION,
            trace,
        };
    }
    trace.push(TraceStep {
        step: trace.len() + 1,
        rule: "routing_override".into(),
        condition: format!("override active at {}", at.to_rfc3339()),
        result: false,
        explanation: "no active manual override".into(),
    });

    // Rule 2: outbound traffic always targets the client.
    if direction == Direction::Outbound {
        trace.push(TraceStep {
            step: trace.len() + 1,
            rule: "outbound_to_client".into(),
            condition: "direction = outbound".into(),
            result: true,
            explanation: "outbound messages deliver to the client".into(),
        });
        return RoutingDecision {
            target: RouteTarget::Client,
            target_id: ctx.thread.client_id.clone(),
            via_override: false,
            reason: "outbound messages deliver to the client".into(),
            ruleset_version: RULESET_VERSION,
            trace,
        };
    }
    trace.push(TraceStep {
        step: trace.len() + 1,
        rule: "outbound_to_client".into(),
        condition: "direction = outbound".into(),
        result: false,
        explanation: "inbound message, continuing rule evaluation".into(),
    });

    // Rules 3 and 4: active assignment windows.
    let mut active: Vec<&AssignmentWindow> = ctx
        .windows
        .iter()
        .filter(|w| w.is_active_at(at))
        .collect();
    active.sort_by(|a, b| a.id.cmp(&b.id));

    match active.len() {
        1 => {
            let window = active[0];
            trace.push(TraceStep {
                step: trace.len() + 1,
                rule: "single_active_window".into(),
                condition: format!(
                    "window {}: {} <= {} < {}",
                    window.id,
                    window.starts_at.to_rfc3339(),
                    at.to_rfc3339(),
                    window.ends_at.to_rfc3339()
                ),
                result: true,
                explanation: format!(
                    "exactly one active assignment window; deliver to sitter {}",
                    window.sitter_id
                ),
            });
            RoutingDecision {
                target: RouteTarget::Sitter,
                target_id: Some(window.sitter_id.clone()),
                via_override: false,
                reason: "exactly one active assignment window matches the timestamp".into(),
                ruleset_version: RULESET_VERSION,
                trace,
            }
        }
        0 => {
            trace.push(TraceStep {
                step: trace.len() + 1,
                rule: "single_active_window".into(),
                condition: "exactly one window active".into(),
                result: false,
                explanation: "no active assignment window".into(),
            });
            trace.push(TraceStep {
                step: trace.len() + 1,
                rule: "owner_inbox_fallback".into(),
                condition: "no earlier rule matched".into(),
                result: true,
                explanation: "no active assignment window; deliver to the owner inbox".into(),
            });
            RoutingDecision {
                target: RouteTarget::OwnerInbox,
                target_id: None,
                via_override: false,
                reason: "no active assignment window at the message timestamp".into(),
                ruleset_version: RULESET_VERSION,
                trace,
            }
        }
        n => {
            let ids: Vec<&str> = active.iter().map(|w| w.id.as_str()).collect();
            trace.push(TraceStep {
                step: trace.len() + 1,
                rule: "overlapping_windows".into(),
                condition: format!("{n} windows active simultaneously"),
                result: true,
                explanation: format!(
                    "overlapping active windows [{}] represent an unresolved handoff; \
                     deliver to the owner inbox",
                    ids.join(", ")
                ),
            });
            RoutingDecision {
                target: RouteTarget::OwnerInbox,
                target_id: None,
                via_override: false,
                reason: format!(
                    "{n} overlapping active assignment windows require owner intervention"
                ),
                ruleset_version: RULESET_VERSION,
                trace,
            }
        }
    }
}
