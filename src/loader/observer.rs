//! VisibilityObserver: one-shot viewport entry subscriptions
//!
//! Wraps the host's IntersectionObserver into observe/unobserve bookkeeping.
//! The host forwards raw entry batches to `deliver`; a subscription fires at
//! most once and is released when it does. Re-firing requires a new `observe`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::loader::candidate::CandidateId;

/// Which concern an observer serves. Callback sets stay disjoint per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObserverConcern {
    LazyLoad,
    Prefetch,
}

/// One IntersectionObserverEntry, reduced to what the scheduler needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionEntry {
    pub id: CandidateId,
    /// `intersectionRatio`
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn entering(id: CandidateId, ratio: f64) -> Self {
        Self {
            id,
            ratio,
            is_intersecting: true,
        }
    }

    pub fn leaving(id: CandidateId) -> Self {
        Self {
            id,
            ratio: 0.0,
            is_intersecting: false,
        }
    }
}

/// Observation set for a single concern.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    concern: ObserverConcern,
    threshold: f64,
    members: HashSet<CandidateId>,
    fired: u64,
}

impl VisibilityObserver {
    /// `threshold` is clamped into 0..=1.
    pub fn new(concern: ObserverConcern, threshold: f64) -> Self {
        Self {
            concern,
            threshold: threshold.clamp(0.0, 1.0),
            members: HashSet::new(),
            fired: 0,
        }
    }

    pub fn concern(&self) -> ObserverConcern {
        self.concern
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Subscribe. Returns false (no-op) if already subscribed.
    pub fn observe(&mut self, id: CandidateId) -> bool {
        self.members.insert(id)
    }

    /// Returns false if the candidate was not subscribed.
    pub fn unobserve(&mut self, id: CandidateId) -> bool {
        self.members.remove(&id)
    }

    pub fn is_observing(&self, id: CandidateId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Total subscriptions that have fired.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    fn crosses(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.threshold
    }

    /// Process an entry batch. Returns the candidates that crossed the
    /// threshold, in entry order; each is unsubscribed as it fires.
    pub fn deliver(&mut self, entries: &[IntersectionEntry]) -> Vec<CandidateId> {
        let mut visible = Vec::new();
        for entry in entries {
            if self.crosses(entry) && self.members.remove(&entry.id) {
                self.fired += 1;
                visible.push(entry.id);
            }
        }
        visible
    }

    /// Release every subscription, returning the released ids (sorted).
    pub fn drain(&mut self) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self.members.drain().collect();
        ids.sort_unstable();
        ids
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> VisibilityObserver {
        VisibilityObserver::new(ObserverConcern::Prefetch, 0.1)
    }

    #[test]
    fn test_fires_once_per_observe() {
        let mut obs = observer();
        obs.observe(1);

        assert_eq!(obs.deliver(&[IntersectionEntry::entering(1, 0.5)]), vec![1]);
        assert!(obs.deliver(&[IntersectionEntry::entering(1, 0.5)]).is_empty());
        assert!(!obs.is_observing(1));

        obs.observe(1);
        assert_eq!(obs.deliver(&[IntersectionEntry::entering(1, 0.5)]), vec![1]);
        assert_eq!(obs.fired_count(), 2);
    }

    #[test]
    fn test_double_observe_single_firing() {
        let mut obs = observer();
        assert!(obs.observe(3));
        assert!(!obs.observe(3));

        let fired = obs.deliver(&[
            IntersectionEntry::entering(3, 0.2),
            IntersectionEntry::entering(3, 0.9),
        ]);
        assert_eq!(fired, vec![3]);
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let mut obs = observer();
        obs.observe(1);
        assert!(obs.deliver(&[IntersectionEntry::entering(1, 0.05)]).is_empty());
        assert!(obs.deliver(&[IntersectionEntry::leaving(1)]).is_empty());
        assert!(obs.is_observing(1));
        assert_eq!(obs.deliver(&[IntersectionEntry::entering(1, 0.1)]), vec![1]);
    }

    #[test]
    fn test_unobserved_entries_are_ignored() {
        let mut obs = observer();
        obs.observe(1);
        obs.unobserve(1);
        assert!(obs.deliver(&[IntersectionEntry::entering(1, 1.0)]).is_empty());
        assert!(obs.deliver(&[IntersectionEntry::entering(99, 1.0)]).is_empty());
    }

    #[test]
    fn test_entry_order_preserved() {
        let mut obs = observer();
        for id in [1, 2, 3] {
            obs.observe(id);
        }
        let fired = obs.deliver(&[
            IntersectionEntry::entering(2, 1.0),
            IntersectionEntry::entering(1, 1.0),
            IntersectionEntry::entering(3, 1.0),
        ]);
        assert_eq!(fired, vec![2, 1, 3]);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(VisibilityObserver::new(ObserverConcern::LazyLoad, 4.0).threshold(), 1.0);
        assert_eq!(VisibilityObserver::new(ObserverConcern::LazyLoad, -1.0).threshold(), 0.0);
    }

    #[test]
    fn test_drain_releases_all() {
        let mut obs = observer();
        obs.observe(5);
        obs.observe(2);
        assert_eq!(obs.drain(), vec![2, 5]);
        assert!(obs.is_empty());
    }
}
