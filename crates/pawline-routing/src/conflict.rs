// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment-window conflict detection and resolution planning.
//!
//! Detection is a pairwise O(n²) scan; windows per thread are bounded by
//! realistic booking cadence, so no interval tree is warranted. Planning
//! is pure; applying a plan (deletes and truncations) goes through the
//! store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use pawline_core::types::AssignmentWindow;

/// Two overlapping windows on the same thread.
///
/// Computed, never persisted: the id is derived from the ordered window id
/// pair so detection is stable across runs and resolution can re-derive
/// the pair without a conflicts table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub id: String,
    pub window_a: AssignmentWindow,
    pub window_b: AssignmentWindow,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
}

/// Stable conflict id for a window pair.
pub fn conflict_id(window_a: &str, window_b: &str) -> String {
    if window_a <= window_b {
        format!("{window_a}~{window_b}")
    } else {
        format!("{window_b}~{window_a}")
    }
}

/// Pairwise overlap scan.
///
/// Two windows conflict iff they belong to the same thread and
/// `start_a < end_b && start_b < end_a` (half-open; touching endpoints are
/// not conflicts), regardless of sitter: a thread claimed by two windows
/// is an unresolved handoff even when both belong to the same sitter.
pub fn detect_conflicts(windows: &[AssignmentWindow]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, a) in windows.iter().enumerate() {
        for b in &windows[i + 1..] {
            if a.thread_id != b.thread_id {
                continue;
            }
            if a.starts_at < b.ends_at && b.starts_at < a.ends_at {
                conflicts.push(Conflict {
                    id: conflict_id(&a.id, &b.id),
                    window_a: a.clone(),
                    window_b: b.clone(),
                    overlap_start: a.starts_at.max(b.starts_at),
                    overlap_end: a.ends_at.min(b.ends_at),
                });
            }
        }
    }
    conflicts
}

/// Operator-selected resolution strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    KeepA,
    KeepB,
    Split,
}

/// One store mutation a resolution plan requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WindowAction {
    Delete {
        window_id: String,
        /// Whether the window was active at resolution time; deleting an
        /// active window re-routes the next inbound to the owner inbox.
        was_active: bool,
    },
    Truncate {
        window_id: String,
        new_starts_at: DateTime<Utc>,
        new_ends_at: DateTime<Utc>,
    },
}

/// The mutations that resolve one conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionPlan {
    pub conflict_id: String,
    pub strategy: ResolutionStrategy,
    pub actions: Vec<WindowAction>,
}

/// Plan the resolution of a conflict.
///
/// - `keep_a` / `keep_b`: the losing window is deleted.
/// - `split`: the earlier window is truncated to end where the later one
///   starts, leaving the two adjacent. A window whose truncation would
///   leave `ends_at <= starts_at` is deleted instead, and a fully-nested
///   window is deleted outright with the containing window left untouched.
pub fn plan_resolution(
    conflict: &Conflict,
    strategy: ResolutionStrategy,
    now: DateTime<Utc>,
) -> ResolutionPlan {
    let delete = |w: &AssignmentWindow| WindowAction::Delete {
        window_id: w.id.clone(),
        was_active: w.is_active_at(now),
    };

    let actions = match strategy {
        ResolutionStrategy::KeepA => vec![delete(&conflict.window_b)],
        ResolutionStrategy::KeepB => vec![delete(&conflict.window_a)],
        ResolutionStrategy::Split => {
            // Order by start so "earlier" and "later" are well-defined;
            // ties break toward the shorter window first.
            let (first, second) = if (conflict.window_a.starts_at, conflict.window_a.ends_at)
                <= (conflict.window_b.starts_at, conflict.window_b.ends_at)
            {
                (&conflict.window_a, &conflict.window_b)
            } else {
                (&conflict.window_b, &conflict.window_a)
            };

            if second.ends_at <= first.ends_at {
                // Fully nested: delete the contained window; truncating the
                // container would silently drop its tail coverage.
                vec![delete(second)]
            } else if first.starts_at >= second.starts_at {
                // Identical starts: truncation would leave the earlier
                // window degenerate, so it is deleted instead.
                vec![delete(first)]
            } else {
                vec![WindowAction::Truncate {
                    window_id: first.id.clone(),
                    new_starts_at: first.starts_at,
                    new_ends_at: second.starts_at,
                }]
            }
        }
    };

    ResolutionPlan {
        conflict_id: conflict.id.clone(),
        strategy,
        actions,
    }
}
