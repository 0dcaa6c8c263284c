//! Occupancy tracking.
//!
//! Keeps the set of identities currently considered present. Every
//! successful authentication toggles the caller's membership: the first
//! one is an arrival, the next a departure. The tracker reports whether
//! the toggle crossed the empty/non-empty boundary so the alarm can be
//! armed or disarmed.
//!
//! The set starts empty on every process start. Anyone physically present
//! at that moment is not recorded until they authenticate again.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

/// Occupancy boundary event produced by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    /// Nothing changed (authentication failed before a toggle).
    None,
    /// Set went from empty to one member.
    FirstArrival,
    /// Set went from one member to empty.
    LastDeparture,
    /// Membership changed without crossing the empty boundary.
    InteriorChange,
}

impl Transition {
    /// Classify a single-element change from `before` to `after` members.
    pub fn from_sizes(before: usize, after: usize) -> Self {
        match (before, after) {
            (0, 1) => Transition::FirstArrival,
            (1, 0) => Transition::LastDeparture,
            (b, a) if b == a => Transition::None,
            _ => Transition::InteriorChange,
        }
    }

    /// Whether the transition crosses the empty/non-empty boundary.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Transition::FirstArrival | Transition::LastDeparture)
    }

    /// Stable label for logs and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::None => "none",
            Transition::FirstArrival => "first-arrival",
            Transition::LastDeparture => "last-departure",
            Transition::InteriorChange => "interior-change",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Arrived,
    Departed,
}

/// Result of [`OccupancyTracker::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub presence: Presence,
    pub transition: Transition,
    /// Number of identities present after the toggle.
    pub present: usize,
}

/// Owner of the occupancy set.
///
/// One mutex covers membership test, mutation and transition computation,
/// so concurrent toggles are linearized: an empty set can produce only one
/// `FirstArrival` no matter how many arrivals race. The lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct OccupancyTracker {
    present: Mutex<HashSet<String>>,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // Every critical section leaves the set consistent, so a panic
        // elsewhere while holding the lock cannot corrupt it.
        self.present.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flip `identity`'s membership and report the resulting transition.
    pub fn toggle(&self, identity: &str) -> ToggleOutcome {
        self.toggle_then(identity, |_| ()).0
    }

    /// Flip `identity`'s membership and run `on_toggle` with the outcome
    /// before the lock is released.
    ///
    /// Whatever `on_toggle` records or enqueues is therefore ordered exactly
    /// like the toggles themselves. `on_toggle` must not block.
    pub fn toggle_then<R>(
        &self,
        identity: &str,
        on_toggle: impl FnOnce(&ToggleOutcome) -> R,
    ) -> (ToggleOutcome, R) {
        let mut present = self.lock();
        let before = present.len();
        let presence = if present.remove(identity) {
            Presence::Departed
        } else {
            present.insert(identity.to_string());
            Presence::Arrived
        };
        let after = present.len();
        let outcome = ToggleOutcome {
            presence,
            transition: Transition::from_sizes(before, after),
            present: after,
        };
        let result = on_toggle(&outcome);
        (outcome, result)
    }

    /// Whether `identity` is currently present.
    pub fn is_present(&self, identity: &str) -> bool {
        self.lock().contains(identity)
    }

    /// Number of identities currently present.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Sorted snapshot of present identities.
    pub fn snapshot(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.lock().iter().cloned().collect();
        identities.sort();
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_transition_from_sizes() {
        assert_eq!(Transition::from_sizes(0, 1), Transition::FirstArrival);
        assert_eq!(Transition::from_sizes(1, 0), Transition::LastDeparture);
        assert_eq!(Transition::from_sizes(1, 2), Transition::InteriorChange);
        assert_eq!(Transition::from_sizes(3, 2), Transition::InteriorChange);
        assert_eq!(Transition::from_sizes(2, 2), Transition::None);
    }

    #[test]
    fn test_transition_labels() {
        assert_eq!(Transition::FirstArrival.to_string(), "first-arrival");
        assert_eq!(Transition::LastDeparture.to_string(), "last-departure");
        assert_eq!(Transition::InteriorChange.to_string(), "interior-change");
        assert_eq!(Transition::None.to_string(), "none");
        assert!(Transition::FirstArrival.is_boundary());
        assert!(Transition::LastDeparture.is_boundary());
        assert!(!Transition::InteriorChange.is_boundary());
        assert!(!Transition::None.is_boundary());
    }

    #[test]
    fn test_toggle_involution() {
        let tracker = OccupancyTracker::new();

        let first = tracker.toggle("alice");
        assert_eq!(first.presence, Presence::Arrived);
        assert_eq!(first.transition, Transition::FirstArrival);
        assert!(tracker.is_present("alice"));

        let second = tracker.toggle("alice");
        assert_eq!(second.presence, Presence::Departed);
        assert_eq!(second.transition, Transition::LastDeparture);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_toggle_involution_with_others_present() {
        let tracker = OccupancyTracker::new();
        tracker.toggle("bob");
        let before = tracker.snapshot();

        assert_eq!(tracker.toggle("alice").transition, Transition::InteriorChange);
        assert_eq!(tracker.toggle("alice").transition, Transition::InteriorChange);
        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn test_last_departure_only_when_empty() {
        let tracker = OccupancyTracker::new();
        assert_eq!(tracker.toggle("a").transition, Transition::FirstArrival);
        assert_eq!(tracker.toggle("b").transition, Transition::InteriorChange);
        assert_eq!(tracker.toggle("a").transition, Transition::InteriorChange);
        let last = tracker.toggle("b");
        assert_eq!(last.transition, Transition::LastDeparture);
        assert_eq!(last.present, 0);
    }

    #[test]
    fn test_concurrent_toggles_yield_exactly_one_boundary_each_way() {
        let tracker = Arc::new(OccupancyTracker::new());
        let identities: Vec<String> = (0..64).map(|i| format!("user-{}", i)).collect();

        let run_round = |tracker: &Arc<OccupancyTracker>| -> Vec<Transition> {
            let handles: Vec<_> = identities
                .iter()
                .cloned()
                .map(|id| {
                    let tracker = Arc::clone(tracker);
                    std::thread::spawn(move || tracker.toggle(&id).transition)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        };

        let arrivals = run_round(&tracker);
        assert_eq!(
            arrivals.iter().filter(|t| **t == Transition::FirstArrival).count(),
            1
        );
        assert_eq!(
            arrivals.iter().filter(|t| **t == Transition::InteriorChange).count(),
            63
        );
        assert_eq!(tracker.count(), 64);

        let departures = run_round(&tracker);
        assert_eq!(
            departures.iter().filter(|t| **t == Transition::LastDeparture).count(),
            1
        );
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_same_identity_racing_toggles_stay_consistent() {
        let tracker = Arc::new(OccupancyTracker::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.toggle("alice").transition)
            })
            .collect();
        let transitions: Vec<Transition> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Ten toggles alternate arrival/departure: five of each boundary.
        assert_eq!(
            transitions.iter().filter(|t| **t == Transition::FirstArrival).count(),
            5
        );
        assert_eq!(
            transitions.iter().filter(|t| **t == Transition::LastDeparture).count(),
            5
        );
        assert!(!tracker.is_present("alice"));
    }

    #[test]
    fn test_toggle_then_records_transitions_in_toggle_order() {
        let tracker = Arc::new(OccupancyTracker::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.toggle_then("alice", |outcome| {
                            log.lock().unwrap().push(outcome.transition)
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 400);
        for (i, transition) in log.iter().enumerate() {
            let expected = if i % 2 == 0 {
                Transition::FirstArrival
            } else {
                Transition::LastDeparture
            };
            assert_eq!(*transition, expected, "out of order at {}", i);
        }
        assert!(!tracker.is_present("alice"));
    }

    #[test]
    fn test_toggle_then_returns_callback_result() {
        let tracker = OccupancyTracker::new();
        let (outcome, seen) = tracker.toggle_then("alice", |o| o.present);
        assert_eq!(outcome.presence, Presence::Arrived);
        assert_eq!(seen, 1);
    }
}
