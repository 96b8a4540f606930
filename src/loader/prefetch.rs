//! PrefetchScheduler: bounded link prefetching
//!
//! # Lifecycle per link
//! `Discovered → (Rejected | Pending) → (SkippedByBudget | Emitted)`
//!
//! 1. Discovery rejects denylisted links and unusable targets before any
//!    observation starts; nothing is re-checked after.
//! 2. The first links to cross the visibility threshold win the budget.
//!    No priorities, no retries: budget exhaustion is terminal.
//! 3. While the user is scrolling (scroll-settle gate), entries are queued in
//!    arrival order and released on `tick` once scrolling pauses.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::loader::candidate::{Candidate, CandidateId, CandidateRegistry, ProcessedSet};
use crate::loader::filter::Denylist;
use crate::loader::host::Effect;
use crate::loader::log::ActionLog;
use crate::loader::observer::{IntersectionEntry, ObserverConcern, VisibilityObserver};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    Denylisted,
    /// Empty, fragment-only or non-navigational (`javascript:`, `mailto:`, ...)
    MissingTarget,
    /// Direct link to an image or video file
    MediaTarget,
    /// Not displayed; eligible for re-admission by the re-scan trigger
    Hidden,
    LowPriority,
    /// Same href already prefetched
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum LinkState {
    Pending,
    /// Entered the viewport while the scroll gate was closed
    Queued,
    Emitted,
    SkippedByBudget,
    Rejected(RejectReason),
}

impl LinkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinkState::Emitted | LinkState::SkippedByBudget)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchHint {
    pub id: CandidateId,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "reason", rename_all = "camelCase")]
pub enum Discovery {
    Observed,
    /// Already pending or queued; re-subscribing is a no-op
    AlreadyObserved,
    AlreadyProcessed,
    /// Emitted or skipped earlier; never revisited
    Settled,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum EntryOutcome {
    Emitted { hint: PrefetchHint },
    SkippedByBudget,
    /// Held by the scroll gate
    Deferred,
    Rejected { reason: RejectReason },
    /// Already processed through another path
    Ignored,
}

// =============================================================================
// PrefetchBudget
// =============================================================================

/// Monotonic counter capped at `limit`. Never decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchBudget {
    used: u32,
    limit: u32,
}

impl PrefetchBudget {
    pub fn new(limit: u32) -> Self {
        Self { used: 0, limit }
    }

    /// Take one unit. Returns false once the cap is reached.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

// =============================================================================
// ScrollGate
// =============================================================================

/// Holds visibility entries while the user is actively scrolling.
#[derive(Debug, Clone, Default)]
pub struct ScrollGate {
    settle_ms: u32,
    last_scroll_ms: Option<f64>,
    queue: VecDeque<CandidateId>,
}

impl ScrollGate {
    pub fn new(settle_ms: u32) -> Self {
        Self {
            settle_ms,
            last_scroll_ms: None,
            queue: VecDeque::new(),
        }
    }

    pub fn record_scroll(&mut self, now_ms: f64) {
        if self.settle_ms > 0 {
            self.last_scroll_ms = Some(now_ms);
        }
    }

    pub fn is_settled(&self, now_ms: f64) -> bool {
        match self.last_scroll_ms {
            _ if self.settle_ms == 0 => true,
            None => true,
            Some(last) => now_ms - last >= self.settle_ms as f64,
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

// =============================================================================
// Stats
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionCounts {
    pub denylisted: u32,
    pub missing_target: u32,
    pub media_target: u32,
    pub hidden: u32,
    pub low_priority: u32,
    pub duplicate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchStats {
    pub budget_used: u32,
    pub budget_limit: u32,
    pub emitted: u32,
    pub skipped_by_budget: u32,
    pub pending: u32,
    pub queued: u32,
    pub rejected: RejectionCounts,
}

// =============================================================================
// PrefetchScheduler
// =============================================================================

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Trimmed href if it names something worth prefetching.
pub fn usable_target(href: Option<&str>) -> Option<&str> {
    let href = href?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let blocked = BLOCKED_SCHEMES.iter().any(|scheme| {
        href.len() >= scheme.len() && href.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    });
    if blocked {
        None
    } else {
        Some(href)
    }
}

#[derive(Debug, Clone)]
pub struct PrefetchScheduler {
    denylist: Denylist,
    observer: VisibilityObserver,
    budget: PrefetchBudget,
    gate: ScrollGate,
    states: HashMap<CandidateId, LinkState>,
    emitted: Vec<PrefetchHint>,
    skipped: Vec<CandidateId>,
    emitted_targets: HashSet<String>,
    dedupe_targets: bool,
    media_target_re: Regex,
    log: ActionLog,
}

impl PrefetchScheduler {
    pub fn new(denylist: Denylist, limit: u32, threshold: f64) -> Self {
        Self {
            denylist,
            observer: VisibilityObserver::new(ObserverConcern::Prefetch, threshold),
            budget: PrefetchBudget::new(limit),
            gate: ScrollGate::default(),
            states: HashMap::new(),
            emitted: Vec::new(),
            skipped: Vec::new(),
            emitted_targets: HashSet::new(),
            dedupe_targets: true,
            media_target_re: Regex::new(r"(?i)\.(?:jpe?g|png|gif|webp|mp4|webm)(?:[?#].*)?$").expect("valid media target regex"),
            log: ActionLog::default(),
        }
    }

    pub fn with_scroll_settle(mut self, settle_ms: u32) -> Self {
        self.gate = ScrollGate::new(settle_ms);
        self
    }

    pub fn with_dedupe(mut self, dedupe_targets: bool) -> Self {
        self.dedupe_targets = dedupe_targets;
        self
    }

    pub fn with_log(mut self, log: ActionLog) -> Self {
        self.log = log;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn budget(&self) -> &PrefetchBudget {
        &self.budget
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    pub fn state(&self, id: CandidateId) -> Option<LinkState> {
        self.states.get(&id).copied()
    }

    pub fn is_observing(&self, id: CandidateId) -> bool {
        self.observer.is_observing(id)
    }

    /// Hints in emission order.
    pub fn emitted(&self) -> &[PrefetchHint] {
        &self.emitted
    }

    /// Links that lost the budget race, in entry order.
    pub fn skipped(&self) -> &[CandidateId] {
        &self.skipped
    }

    pub fn is_media_target(&self, href: &str) -> bool {
        self.media_target_re.is_match(href)
    }

    pub fn stats(&self) -> PrefetchStats {
        let mut stats = PrefetchStats {
            budget_used: self.budget.used(),
            budget_limit: self.budget.limit(),
            emitted: self.emitted.len() as u32,
            skipped_by_budget: self.skipped.len() as u32,
            pending: self.observer.len() as u32,
            queued: self.gate.queued() as u32,
            ..PrefetchStats::default()
        };
        for state in self.states.values() {
            if let LinkState::Rejected(reason) = state {
                let counter = match reason {
                    RejectReason::Denylisted => &mut stats.rejected.denylisted,
                    RejectReason::MissingTarget => &mut stats.rejected.missing_target,
                    RejectReason::MediaTarget => &mut stats.rejected.media_target,
                    RejectReason::Hidden => &mut stats.rejected.hidden,
                    RejectReason::LowPriority => &mut stats.rejected.low_priority,
                    RejectReason::Duplicate => &mut stats.rejected.duplicate,
                };
                *counter += 1;
            }
        }
        stats
    }

    // -------------------------------------------------------------------------
    // Discovery
    // -------------------------------------------------------------------------

    /// Record a rejection decided outside the scheduler (priority policy).
    pub fn reject(&mut self, id: CandidateId, reason: RejectReason) {
        if !matches!(self.states.get(&id), Some(state) if state.is_terminal()) {
            self.states.insert(id, LinkState::Rejected(reason));
        }
    }

    fn admission_check(&self, candidate: &Candidate) -> Result<(), RejectReason> {
        if self.denylist.is_denylisted(candidate) {
            return Err(RejectReason::Denylisted);
        }
        let href = usable_target(candidate.href.as_deref()).ok_or(RejectReason::MissingTarget)?;
        if self.is_media_target(href) {
            return Err(RejectReason::MediaTarget);
        }
        if !candidate.displayed {
            return Err(RejectReason::Hidden);
        }
        Ok(())
    }

    pub fn discover(
        &mut self,
        candidate: &Candidate,
        processed: &ProcessedSet,
        effects: &mut Vec<Effect>,
    ) -> Discovery {
        let id = candidate.id;
        if processed.contains(id) {
            return Discovery::AlreadyProcessed;
        }
        match self.states.get(&id) {
            Some(LinkState::Pending) | Some(LinkState::Queued) => return Discovery::AlreadyObserved,
            Some(state) if state.is_terminal() => return Discovery::Settled,
            _ => {}
        }

        if let Err(reason) = self.admission_check(candidate) {
            self.states.insert(id, LinkState::Rejected(reason));
            return Discovery::Rejected(reason);
        }

        if self.observer.observe(id) {
            effects.push(Effect::Observe {
                concern: ObserverConcern::Prefetch,
                id,
            });
        }
        self.states.insert(id, LinkState::Pending);
        self.log.action("Observing link for prefetching", &candidate.describe());
        Discovery::Observed
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    pub fn on_scroll(&mut self, now_ms: f64) {
        self.gate.record_scroll(now_ms);
    }

    /// Route an IntersectionObserver batch. Outcomes are in entry order.
    pub fn on_intersections(
        &mut self,
        entries: &[IntersectionEntry],
        registry: &CandidateRegistry,
        processed: &mut ProcessedSet,
        now_ms: f64,
        effects: &mut Vec<Effect>,
    ) -> Vec<(CandidateId, EntryOutcome)> {
        let visible = self.observer.deliver(entries);
        for &id in &visible {
            effects.push(Effect::Unobserve {
                concern: ObserverConcern::Prefetch,
                id,
            });
        }

        if !self.gate.is_settled(now_ms) {
            return visible
                .into_iter()
                .map(|id| {
                    self.gate.queue.push_back(id);
                    self.states.insert(id, LinkState::Queued);
                    (id, EntryOutcome::Deferred)
                })
                .collect();
        }

        let mut outcomes = self.drain_queue(registry, processed, effects);
        for id in visible {
            let outcome = self.emit(id, registry, processed, effects);
            outcomes.push((id, outcome));
        }
        outcomes
    }

    /// Release queued entries if scrolling has settled.
    pub fn tick(
        &mut self,
        registry: &CandidateRegistry,
        processed: &mut ProcessedSet,
        now_ms: f64,
        effects: &mut Vec<Effect>,
    ) -> Vec<(CandidateId, EntryOutcome)> {
        if !self.gate.is_settled(now_ms) {
            return Vec::new();
        }
        self.drain_queue(registry, processed, effects)
    }

    fn drain_queue(
        &mut self,
        registry: &CandidateRegistry,
        processed: &mut ProcessedSet,
        effects: &mut Vec<Effect>,
    ) -> Vec<(CandidateId, EntryOutcome)> {
        let mut outcomes = Vec::with_capacity(self.gate.queue.len());
        while let Some(id) = self.gate.queue.pop_front() {
            let outcome = self.emit(id, registry, processed, effects);
            outcomes.push((id, outcome));
        }
        outcomes
    }

    fn emit(
        &mut self,
        id: CandidateId,
        registry: &CandidateRegistry,
        processed: &mut ProcessedSet,
        effects: &mut Vec<Effect>,
    ) -> EntryOutcome {
        if processed.contains(id) {
            return EntryOutcome::Ignored;
        }

        let href = match registry
            .get(id)
            .and_then(|c| usable_target(c.href.as_deref()))
        {
            Some(href) => href.to_string(),
            None => {
                self.log.action("Skipping link without target", &format!("#{}", id));
                self.states.insert(id, LinkState::Rejected(RejectReason::MissingTarget));
                return EntryOutcome::Rejected {
                    reason: RejectReason::MissingTarget,
                };
            }
        };

        if self.dedupe_targets && self.emitted_targets.contains(&href) {
            self.states.insert(id, LinkState::Rejected(RejectReason::Duplicate));
            return EntryOutcome::Rejected {
                reason: RejectReason::Duplicate,
            };
        }

        if !self.budget.try_consume() {
            self.log.action("Prefetch budget exhausted, skipping", &href);
            self.states.insert(id, LinkState::SkippedByBudget);
            self.skipped.push(id);
            return EntryOutcome::SkippedByBudget;
        }

        self.log.action("Prefetching link", &href);
        effects.push(Effect::Prefetch { href: href.clone() });
        self.emitted_targets.insert(href.clone());
        self.states.insert(id, LinkState::Emitted);
        processed.insert(id);

        let hint = PrefetchHint { id, href };
        self.emitted.push(hint.clone());
        EntryOutcome::Emitted { hint }
    }

    /// Unsubscribe everything still pending and drop entries held by the
    /// scroll gate (document unload).
    pub fn release_all(&mut self, effects: &mut Vec<Effect>) -> usize {
        let released = self.observer.drain();
        for &id in &released {
            self.states.remove(&id);
            effects.push(Effect::Unobserve {
                concern: ObserverConcern::Prefetch,
                id,
            });
        }
        let queued: Vec<CandidateId> = self.gate.queue.drain(..).collect();
        for id in &queued {
            self.states.remove(id);
        }
        released.len() + queued.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::candidate::Signature;
    use crate::loader::filter::DenylistRule;

    struct Fixture {
        scheduler: PrefetchScheduler,
        registry: CandidateRegistry,
        processed: ProcessedSet,
        effects: Vec<Effect>,
    }

    impl Fixture {
        fn new(limit: u32) -> Self {
            Self {
                scheduler: PrefetchScheduler::new(Denylist::standard(), limit, 0.1),
                registry: CandidateRegistry::new(),
                processed: ProcessedSet::new(),
                effects: Vec::new(),
            }
        }

        fn add(&mut self, candidate: Candidate) -> Discovery {
            let discovery = self
                .scheduler
                .discover(&candidate, &self.processed, &mut self.effects);
            self.registry.upsert(candidate);
            discovery
        }

        fn enter(&mut self, ids: &[CandidateId], now: f64) -> Vec<(CandidateId, EntryOutcome)> {
            let entries: Vec<_> = ids.iter().map(|&id| IntersectionEntry::entering(id, 0.5)).collect();
            self.scheduler.on_intersections(
                &entries,
                &self.registry,
                &mut self.processed,
                now,
                &mut self.effects,
            )
        }
    }

    #[test]
    fn test_budget_never_exceeds_limit() {
        let mut budget = PrefetchBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_zero_limit_emits_nothing() {
        let mut fx = Fixture::new(0);
        fx.add(Candidate::link(1, "/a"));
        let outcomes = fx.enter(&[1], 0.0);
        assert_eq!(outcomes, vec![(1, EntryOutcome::SkippedByBudget)]);
        assert!(fx.scheduler.emitted().is_empty());
    }

    #[test]
    fn test_first_to_enter_wins_budget() {
        let mut fx = Fixture::new(2);
        for (id, href) in [(1, "/a"), (2, "/b"), (3, "/c")] {
            assert_eq!(fx.add(Candidate::link(id, href)), Discovery::Observed);
        }

        fx.enter(&[2, 1, 3], 0.0);

        let emitted: Vec<_> = fx.scheduler.emitted().iter().map(|h| h.id).collect();
        assert_eq!(emitted, vec![2, 1]);
        assert_eq!(fx.scheduler.skipped(), &[3]);
        assert_eq!(fx.scheduler.state(3), Some(LinkState::SkippedByBudget));
        assert!(!fx.scheduler.is_observing(3));
    }

    #[test]
    fn test_denylisted_link_is_never_observed() {
        let mut fx = Fixture::new(5);
        let ad = Candidate::link(1, "/promo").with_signature(Signature::with_classes(&["ad-banner"]));

        assert_eq!(fx.add(ad), Discovery::Rejected(RejectReason::Denylisted));
        assert!(!fx.scheduler.is_observing(1));
        assert!(fx.enter(&[1], 0.0).is_empty());
        assert!(fx.effects.is_empty());
    }

    #[test]
    fn test_custom_prefix_rule() {
        let denylist = Denylist::new(vec![DenylistRule::class_prefix("ad-").unwrap()]).unwrap();
        let mut scheduler = PrefetchScheduler::new(denylist, 5, 0.1);
        let mut effects = Vec::new();
        let ad = Candidate::link(1, "/promo").with_signature(Signature::with_classes(&["ad-banner"]));
        assert_eq!(
            scheduler.discover(&ad, &ProcessedSet::new(), &mut effects),
            Discovery::Rejected(RejectReason::Denylisted)
        );
    }

    #[test]
    fn test_unusable_targets_rejected_at_discovery() {
        let mut fx = Fixture::new(5);
        assert_eq!(
            fx.add(Candidate::link(1, "")),
            Discovery::Rejected(RejectReason::MissingTarget)
        );
        assert_eq!(
            fx.add(Candidate::link(2, "#top")),
            Discovery::Rejected(RejectReason::MissingTarget)
        );
        assert_eq!(
            fx.add(Candidate::link(3, "JavaScript:void(0)")),
            Discovery::Rejected(RejectReason::MissingTarget)
        );
        assert_eq!(
            fx.add(Candidate::link(4, "/gallery/cat.JPG?w=300")),
            Discovery::Rejected(RejectReason::MediaTarget)
        );
        assert_eq!(
            fx.add(Candidate::link(5, "/next").hidden()),
            Discovery::Rejected(RejectReason::Hidden)
        );
        assert_eq!(fx.scheduler.stats().rejected.missing_target, 3);
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let mut fx = Fixture::new(5);
        assert_eq!(fx.add(Candidate::link(1, "/a")), Discovery::Observed);
        assert_eq!(fx.add(Candidate::link(1, "/a")), Discovery::AlreadyObserved);
        let observes = fx
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::Observe { .. }))
            .count();
        assert_eq!(observes, 1);

        fx.enter(&[1], 0.0);
        assert_eq!(fx.add(Candidate::link(1, "/a")), Discovery::AlreadyProcessed);
    }

    #[test]
    fn test_target_removed_before_emission() {
        let mut fx = Fixture::new(5);
        fx.add(Candidate::link(1, "/a"));
        fx.registry.get_mut(1).unwrap().href = None;

        let outcomes = fx.enter(&[1], 0.0);
        assert_eq!(
            outcomes,
            vec![(
                1,
                EntryOutcome::Rejected {
                    reason: RejectReason::MissingTarget
                }
            )]
        );
        assert_eq!(fx.scheduler.budget().used(), 0);
    }

    #[test]
    fn test_duplicate_href_does_not_consume_budget() {
        let mut fx = Fixture::new(5);
        fx.add(Candidate::link(1, "/same"));
        fx.add(Candidate::link(2, "/same"));
        fx.enter(&[1, 2], 0.0);

        assert_eq!(fx.scheduler.budget().used(), 1);
        assert_eq!(fx.scheduler.state(2), Some(LinkState::Rejected(RejectReason::Duplicate)));
    }

    #[test]
    fn test_dedupe_can_be_disabled() {
        let mut fx = Fixture::new(5);
        fx.scheduler = fx.scheduler.clone().with_dedupe(false);
        fx.add(Candidate::link(1, "/same"));
        fx.add(Candidate::link(2, "/same"));
        fx.enter(&[1, 2], 0.0);
        assert_eq!(fx.scheduler.budget().used(), 2);
    }

    #[test]
    fn test_scroll_gate_queues_in_entry_order() {
        let mut fx = Fixture::new(2);
        fx.scheduler = fx.scheduler.clone().with_scroll_settle(200);
        for (id, href) in [(1, "/a"), (2, "/b"), (3, "/c")] {
            fx.add(Candidate::link(id, href));
        }

        fx.scheduler.on_scroll(1000.0);
        let outcomes = fx.enter(&[3, 1], 1050.0);
        assert!(outcomes.iter().all(|(_, o)| *o == EntryOutcome::Deferred));
        assert_eq!(fx.scheduler.state(3), Some(LinkState::Queued));

        // Still scrolling
        assert!(fx
            .scheduler
            .tick(&fx.registry, &mut fx.processed, 1100.0, &mut fx.effects)
            .is_empty());

        let released = fx
            .scheduler
            .tick(&fx.registry, &mut fx.processed, 1250.0, &mut fx.effects);
        let ids: Vec<_> = released.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![3, 1]);

        // Budget is gone; a later entry is skipped
        let late = fx.enter(&[2], 1300.0);
        assert_eq!(late, vec![(2, EntryOutcome::SkippedByBudget)]);
    }

    #[test]
    fn test_settled_entry_drains_queue_first() {
        let mut fx = Fixture::new(1);
        fx.scheduler = fx.scheduler.clone().with_scroll_settle(100);
        fx.add(Candidate::link(1, "/a"));
        fx.add(Candidate::link(2, "/b"));

        fx.scheduler.on_scroll(0.0);
        fx.enter(&[1], 10.0);
        let outcomes = fx.enter(&[2], 500.0);

        assert!(matches!(outcomes[0], (1, EntryOutcome::Emitted { .. })));
        assert_eq!(outcomes[1], (2, EntryOutcome::SkippedByBudget));
    }

    #[test]
    fn test_release_all_unobserves_pending() {
        let mut fx = Fixture::new(5);
        fx.add(Candidate::link(1, "/a"));
        fx.add(Candidate::link(2, "/b"));
        fx.effects.clear();

        assert_eq!(fx.scheduler.release_all(&mut fx.effects), 2);
        assert_eq!(fx.effects.len(), 2);
        assert_eq!(fx.scheduler.stats().pending, 0);
    }

    #[test]
    fn test_usable_target() {
        assert_eq!(usable_target(Some("  /a ")), Some("/a"));
        assert_eq!(usable_target(Some("mailto:x@y.z")), None);
        assert_eq!(usable_target(Some("tel:")), None);
        assert_eq!(usable_target(None), None);
    }
}
