// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure computation of rolling offer statistics.
//!
//! Shared by the transactional offer path (recompute inside the primary
//! transaction) and the standalone aggregator/expiry sweep, so all callers
//! agree on counting rules.

use chrono::{DateTime, Utc};

use crate::types::{OfferEvent, OfferStatus};

/// Result of recomputing one sitter's metrics over a window.
///
/// Rates are `None` when there are no offers in the window; they are never
/// substituted with zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsComputation {
    pub total_offers: usize,
    pub accepted: usize,
    pub declined: usize,
    pub expired: usize,
    pub avg_response_seconds: Option<f64>,
    pub median_response_seconds: Option<f64>,
    pub offer_accept_rate: Option<f64>,
    pub offer_decline_rate: Option<f64>,
    pub offer_expire_rate: Option<f64>,
}

/// Recompute metrics from scratch over the supplied offer population.
///
/// Counting rules:
/// - excluded offers are skipped entirely;
/// - terminal status drives the accepted/declined/expired counts, with a
///   fallback to `accepted_at`/`declined_at` presence and `expires_at < now`
///   for legacy rows that never recorded a terminal status;
/// - response times are `resolved_at - offered_at` over resolved offers
///   only; unresolved offers still count in rate denominators.
pub fn compute_metrics(offers: &[OfferEvent], now: DateTime<Utc>) -> MetricsComputation {
    let offers: Vec<&OfferEvent> = offers.iter().filter(|o| !o.excluded).collect();
    let total = offers.len();

    let accepted = offers
        .iter()
        .filter(|o| o.status == OfferStatus::Accepted || o.accepted_at.is_some())
        .count();
    let declined = offers
        .iter()
        .filter(|o| {
            o.status == OfferStatus::Declined
                || (o.declined_at.is_some() && o.status != OfferStatus::Expired)
        })
        .count();
    let expired = offers
        .iter()
        .filter(|o| {
            o.status == OfferStatus::Expired
                || (o.expires_at < now && o.accepted_at.is_none() && o.declined_at.is_none())
        })
        .count();

    let mut response_times: Vec<i64> = offers
        .iter()
        .filter_map(|o| o.resolved_at().map(|r| (r - o.offered_at).num_seconds()))
        .collect();
    response_times.sort_unstable();

    let avg_response_seconds = if response_times.is_empty() {
        None
    } else {
        Some(response_times.iter().sum::<i64>() as f64 / response_times.len() as f64)
    };
    // Upper-middle element for even-length populations.
    let median_response_seconds = if response_times.is_empty() {
        None
    } else {
        Some(response_times[response_times.len() / 2] as f64)
    };

    let rate = |count: usize| {
        if total > 0 {
            Some(count as f64 / total as f64)
        } else {
            None
        }
    };

    MetricsComputation {
        total_offers: total,
        accepted,
        declined,
        expired,
        avg_response_seconds,
        median_response_seconds,
        offer_accept_rate: rate(accepted),
        offer_decline_rate: rate(declined),
        offer_expire_rate: rate(expired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn offer(id: &str, status: OfferStatus, response_secs: Option<i64>) -> OfferEvent {
        let offered_at = base_time();
        let resolved = response_secs.map(|s| offered_at + Duration::seconds(s));
        OfferEvent {
            id: id.into(),
            org_id: "org1".into(),
            sitter_id: "s1".into(),
            booking_id: "b1".into(),
            status,
            offered_at,
            expires_at: offered_at + Duration::hours(1),
            accepted_at: if status == OfferStatus::Accepted {
                resolved
            } else {
                None
            },
            declined_at: if status == OfferStatus::Declined {
                resolved
            } else {
                None
            },
            decline_reason: None,
            excluded: false,
        }
    }

    #[test]
    fn empty_population_yields_null_rates() {
        let m = compute_metrics(&[], base_time());
        assert_eq!(m.total_offers, 0);
        assert!(m.offer_accept_rate.is_none());
        assert!(m.offer_decline_rate.is_none());
        assert!(m.offer_expire_rate.is_none());
        assert!(m.avg_response_seconds.is_none());
        assert!(m.median_response_seconds.is_none());
    }

    #[test]
    fn rates_sum_to_at_most_one() {
        let offers = vec![
            offer("a", OfferStatus::Accepted, Some(10)),
            offer("b", OfferStatus::Declined, Some(20)),
            offer("c", OfferStatus::Expired, None),
            offer("d", OfferStatus::Sent, None),
        ];
        let m = compute_metrics(&offers, base_time());
        assert_eq!(m.total_offers, 4);
        let sum = m.offer_accept_rate.unwrap()
            + m.offer_decline_rate.unwrap()
            + m.offer_expire_rate.unwrap();
        assert!(sum <= 1.0, "rate sum {sum} exceeds 1.0");
        assert_eq!(m.offer_accept_rate, Some(0.25));
    }

    #[test]
    fn response_times_cover_resolved_offers_only() {
        let offers = vec![
            offer("a", OfferStatus::Accepted, Some(10)),
            offer("b", OfferStatus::Declined, Some(30)),
            offer("c", OfferStatus::Sent, None),
        ];
        let m = compute_metrics(&offers, base_time());
        // The unresolved offer widens the denominator but not the averages.
        assert_eq!(m.total_offers, 3);
        assert_eq!(m.avg_response_seconds, Some(20.0));
        assert_eq!(m.median_response_seconds, Some(30.0));
    }

    #[test]
    fn excluded_offers_are_invisible() {
        let mut excluded = offer("a", OfferStatus::Accepted, Some(5));
        excluded.excluded = true;
        let m = compute_metrics(&[excluded], base_time());
        assert_eq!(m.total_offers, 0);
        assert!(m.offer_accept_rate.is_none());
    }

    #[test]
    fn legacy_row_without_terminal_status_counts_as_expired() {
        let mut o = offer("a", OfferStatus::Sent, None);
        o.expires_at = base_time() - Duration::hours(2);
        let m = compute_metrics(&[o], base_time());
        assert_eq!(m.expired, 1);
        assert_eq!(m.offer_expire_rate, Some(1.0));
    }

    #[test]
    fn median_takes_upper_middle() {
        let offers = vec![
            offer("a", OfferStatus::Accepted, Some(10)),
            offer("b", OfferStatus::Accepted, Some(20)),
            offer("c", OfferStatus::Accepted, Some(30)),
            offer("d", OfferStatus::Accepted, Some(40)),
        ];
        let m = compute_metrics(&offers, base_time());
        assert_eq!(m.median_response_seconds, Some(30.0));
    }
}
