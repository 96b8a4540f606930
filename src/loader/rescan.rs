//! RescanTrigger: re-admits hidden links once they become displayable
//!
//! Only links rejected as `Hidden` are watched; denylisted links are never
//! reconsidered through this path. The watch set is bounded, and a link
//! already in the ProcessedSet is never re-admitted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::loader::candidate::{Candidate, CandidateId, ProcessedSet};
use crate::loader::host::Effect;
use crate::loader::prefetch::{Discovery, RejectReason};

/// Attributes whose changes can flip effective visibility.
pub const WATCHED_ATTRIBUTES: &[&str] = &["style", "class", "hidden"];

/// MutationRecord for an attribute change, with the element's fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMutation {
    pub attribute_name: String,
    pub target: Candidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RescanDecision {
    /// Hidden → displayable: run discovery again
    Readmit,
    StillHidden,
    NotWatched,
    /// Attribute outside the filter
    Irrelevant,
    AlreadyProcessed,
}

#[derive(Debug, Clone)]
pub struct RescanTrigger {
    enabled: bool,
    capacity: usize,
    watched: HashSet<CandidateId>,
    readmitted: u64,
    overflow: u64,
}

impl RescanTrigger {
    pub fn new(capacity: usize) -> Self {
        Self {
            enabled: true,
            capacity,
            watched: HashSet::new(),
            readmitted: 0,
            overflow: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_watching(&self, id: CandidateId) -> bool {
        self.watched.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    pub fn readmitted_count(&self) -> u64 {
        self.readmitted
    }

    /// Hidden links not watched because the set was full.
    pub fn overflow_count(&self) -> u64 {
        self.overflow
    }

    /// Start watching a hidden link. False if disabled, full or already watched.
    pub fn watch(&mut self, id: CandidateId, effects: &mut Vec<Effect>) -> bool {
        if !self.enabled || self.watched.contains(&id) {
            return false;
        }
        if self.watched.len() >= self.capacity {
            self.overflow += 1;
            return false;
        }
        self.watched.insert(id);
        effects.push(Effect::WatchAttributes {
            id,
            attributes: WATCHED_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        });
        true
    }

    pub fn unwatch(&mut self, id: CandidateId, effects: &mut Vec<Effect>) -> bool {
        if self.watched.remove(&id) {
            effects.push(Effect::UnwatchAttributes { id });
            true
        } else {
            false
        }
    }

    /// Stop and release every watch (capability missing, or unload).
    pub fn disable(&mut self, effects: &mut Vec<Effect>) {
        self.enabled = false;
        self.release_all(effects);
    }

    pub fn release_all(&mut self, effects: &mut Vec<Effect>) -> usize {
        let mut ids: Vec<CandidateId> = self.watched.drain().collect();
        ids.sort_unstable();
        for &id in &ids {
            effects.push(Effect::UnwatchAttributes { id });
        }
        ids.len()
    }

    pub fn check(&self, mutation: &AttributeMutation, processed: &ProcessedSet) -> RescanDecision {
        let id = mutation.target.id;
        if !self.watched.contains(&id) {
            return RescanDecision::NotWatched;
        }
        if processed.contains(id) {
            return RescanDecision::AlreadyProcessed;
        }
        let relevant = WATCHED_ATTRIBUTES
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&mutation.attribute_name));
        if !relevant {
            return RescanDecision::Irrelevant;
        }
        if mutation.target.displayed {
            RescanDecision::Readmit
        } else {
            RescanDecision::StillHidden
        }
    }

    /// Update the watch set after a re-admission attempt. Only a link that is
    /// still hidden stays watched.
    pub fn settle(&mut self, id: CandidateId, discovery: Discovery, effects: &mut Vec<Effect>) {
        match discovery {
            Discovery::Rejected(RejectReason::Hidden) => {}
            Discovery::Observed => {
                self.readmitted += 1;
                self.unwatch(id, effects);
            }
            _ => {
                self.unwatch(id, effects);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(id: CandidateId, attribute: &str, displayed: bool) -> AttributeMutation {
        let mut target = Candidate::link(id, "/x");
        target.displayed = displayed;
        AttributeMutation {
            attribute_name: attribute.to_string(),
            target,
        }
    }

    #[test]
    fn test_watch_is_bounded() {
        let mut trigger = RescanTrigger::new(2);
        let mut effects = Vec::new();
        assert!(trigger.watch(1, &mut effects));
        assert!(!trigger.watch(1, &mut effects));
        assert!(trigger.watch(2, &mut effects));
        assert!(!trigger.watch(3, &mut effects));
        assert_eq!(trigger.overflow_count(), 1);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_readmit_on_display() {
        let mut trigger = RescanTrigger::new(8);
        trigger.watch(1, &mut Vec::new());
        let processed = ProcessedSet::new();

        assert_eq!(trigger.check(&mutation(1, "style", false), &processed), RescanDecision::StillHidden);
        assert_eq!(trigger.check(&mutation(1, "class", true), &processed), RescanDecision::Readmit);
        assert_eq!(trigger.check(&mutation(1, "title", true), &processed), RescanDecision::Irrelevant);
        assert_eq!(trigger.check(&mutation(2, "style", true), &processed), RescanDecision::NotWatched);
    }

    #[test]
    fn test_processed_never_readmitted() {
        let mut trigger = RescanTrigger::new(8);
        trigger.watch(1, &mut Vec::new());
        let mut processed = ProcessedSet::new();
        processed.insert(1);
        assert_eq!(
            trigger.check(&mutation(1, "style", true), &processed),
            RescanDecision::AlreadyProcessed
        );
    }

    #[test]
    fn test_settle_keeps_only_hidden() {
        let mut trigger = RescanTrigger::new(8);
        let mut effects = Vec::new();
        for id in [1, 2, 3] {
            trigger.watch(id, &mut effects);
        }

        trigger.settle(1, Discovery::Rejected(RejectReason::Hidden), &mut effects);
        trigger.settle(2, Discovery::Observed, &mut effects);
        trigger.settle(3, Discovery::Rejected(RejectReason::Denylisted), &mut effects);

        assert!(trigger.is_watching(1));
        assert!(!trigger.is_watching(2));
        assert!(!trigger.is_watching(3));
        assert_eq!(trigger.readmitted_count(), 1);
    }

    #[test]
    fn test_disable_releases_and_blocks() {
        let mut trigger = RescanTrigger::new(8);
        let mut effects = Vec::new();
        trigger.watch(4, &mut effects);
        effects.clear();

        trigger.disable(&mut effects);
        assert_eq!(effects, vec![Effect::UnwatchAttributes { id: 4 }]);
        assert!(!trigger.watch(5, &mut effects));
    }
}
