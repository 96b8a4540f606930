//! PageConductor: one page pass, then event routing for the document's lifetime
//!
//! # Design Principles
//! 1. The pass runs at most once per conductor, whichever lifecycle signal
//!    arrives first (already-interactive start, DOMContentLoaded, or the
//!    late `load` fallback). The flag is set before any one-shot mutation.
//! 2. Every step runs inside its own error boundary; a failing step is
//!    logged and reported, later steps still run, nothing is rolled back.
//! 3. After the pass, host events (intersections, attribute mutations,
//!    scroll, idle) are routed to the observers, materializer, scheduler
//!    and re-scan trigger. All state is owned here, one conductor per document.
//!
//! # Usage
//! ```rust,ignore
//! let mut conductor = PageConductor::new(OptimizerConfig::default())?;
//! conductor.start(DocumentReadiness::Interactive, &mut host);
//! conductor.on_intersections(&entries, now_ms, &mut host);
//! ```

use serde::{Deserialize, Serialize};

use crate::loader::candidate::{
    Candidate, CandidateId, CandidateKind, CandidateRegistry, ProcessedSet, VisibilityState,
};
use crate::loader::config::OptimizerConfig;
use crate::loader::error::{ConfigError, HostError, PassError};
use crate::loader::host::{Capabilities, Effect, PageHost};
use crate::loader::log::{self, ActionLog};
use crate::loader::materializer::{Materialization, ResourceMaterializer};
use crate::loader::observer::{IntersectionEntry, ObserverConcern, VisibilityObserver};
use crate::loader::prefetch::{Discovery, EntryOutcome, PrefetchScheduler, PrefetchStats, RejectReason};
use crate::loader::priority::{ContainerPriority, PriorityPolicy, UniformPriority};
use crate::loader::rescan::{AttributeMutation, RescanDecision, RescanTrigger};

// =============================================================================
// Lifecycle
// =============================================================================

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentReadiness {
    Loading,
    Interactive,
    Complete,
}

impl DocumentReadiness {
    /// Unknown states are treated as ready.
    pub fn parse(state: &str) -> Self {
        match state {
            "loading" => DocumentReadiness::Loading,
            "complete" => DocumentReadiness::Complete,
            _ => DocumentReadiness::Interactive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleSignal {
    /// `DOMContentLoaded`
    ContentLoaded,
    /// `load`, the late-injection fallback
    FullyLoaded,
}

impl LifecycleSignal {
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "DOMContentLoaded" | "contentLoaded" => Some(LifecycleSignal::ContentLoaded),
            "load" | "fullyLoaded" => Some(LifecycleSignal::FullyLoaded),
            _ => None,
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub name: String,
    pub ok: bool,
    pub detail: String,
    pub duration_us: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub steps: Vec<StepReport>,
}

impl PassReport {
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn failed(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| !s.ok)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionReport {
    pub materialized: Vec<Materialization>,
    pub prefetch: Vec<(CandidateId, EntryOutcome)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductorStats {
    pub has_run: bool,
    pub candidates: u32,
    pub processed: u32,
    pub materialized: u64,
    pub lazy_pending: u32,
    pub rescan_watched: u32,
    pub readmitted: u64,
    pub idle_pending: bool,
    pub prefetch: PrefetchStats,
}

// =============================================================================
// PageConductor
// =============================================================================

pub struct PageConductor {
    config: OptimizerConfig,
    policy: Box<dyn PriorityPolicy>,
    registry: CandidateRegistry,
    processed: ProcessedSet,
    lazy: VisibilityObserver,
    materializer: ResourceMaterializer,
    scheduler: PrefetchScheduler,
    rescan: RescanTrigger,
    capabilities: Capabilities,
    has_run: bool,
    idle_pending: bool,
    hidden_links: Vec<CandidateId>,
    log: ActionLog,
}

impl PageConductor {
    pub fn new(config: OptimizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let log = ActionLog::new(config.log_actions);
        let scheduler = PrefetchScheduler::new(
            config.denylist()?,
            config.prefetch_limit,
            config.visibility_threshold,
        )
        .with_scroll_settle(config.scroll_settle_delay_ms)
        .with_dedupe(config.dedupe_targets)
        .with_log(log);

        let policy: Box<dyn PriorityPolicy> =
            if config.high_priority_classes.is_empty() && config.low_priority_classes.is_empty() {
                Box::new(UniformPriority)
            } else {
                Box::new(ContainerPriority::new(
                    config.high_priority_classes.clone(),
                    config.low_priority_classes.clone(),
                ))
            };

        Ok(Self {
            lazy: VisibilityObserver::new(ObserverConcern::LazyLoad, config.visibility_threshold),
            materializer: ResourceMaterializer::new(&config.placeholder_class),
            rescan: RescanTrigger::new(config.rescan_capacity),
            scheduler,
            policy,
            registry: CandidateRegistry::new(),
            processed: ProcessedSet::new(),
            capabilities: Capabilities::default(),
            has_run: false,
            idle_pending: false,
            hidden_links: Vec::new(),
            log,
            config,
        })
    }

    /// Replace the priority policy applied before discovery.
    pub fn with_policy(mut self, policy: Box<dyn PriorityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    pub fn rescan(&self) -> &RescanTrigger {
        &self.rescan
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.registry.get(id)
    }

    pub fn is_lazy_observing(&self, id: CandidateId) -> bool {
        self.lazy.is_observing(id)
    }

    pub fn stats(&self) -> ConductorStats {
        ConductorStats {
            has_run: self.has_run,
            candidates: self.registry.len() as u32,
            processed: self.processed.len() as u32,
            materialized: self.materializer.applied_count(),
            lazy_pending: self.lazy.len() as u32,
            rescan_watched: self.rescan.len() as u32,
            readmitted: self.rescan.readmitted_count(),
            idle_pending: self.idle_pending,
            prefetch: self.scheduler.stats(),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Run now unless the document is still loading.
    pub fn start<H: PageHost + ?Sized>(
        &mut self,
        readiness: DocumentReadiness,
        host: &mut H,
    ) -> Option<PassReport> {
        if readiness == DocumentReadiness::Loading {
            self.log.action("Document is loading, waiting for DOMContentLoaded", "");
            return None;
        }
        self.run_pass(host)
    }

    pub fn on_lifecycle<H: PageHost + ?Sized>(
        &mut self,
        signal: LifecycleSignal,
        host: &mut H,
    ) -> Option<PassReport> {
        if self.has_run {
            return None;
        }
        if signal == LifecycleSignal::FullyLoaded {
            self.log.action("Running pass from load fallback", "");
        }
        self.run_pass(host)
    }

    /// The page pass. Returns None if it already ran.
    pub fn run_pass<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Option<PassReport> {
        if self.has_run {
            return None;
        }
        self.has_run = true;
        self.capabilities = host.capabilities();

        let mut report = PassReport::default();
        self.step(&mut report, host, "purge", Self::purge);
        self.step(&mut report, host, "autoplay", Self::disable_autoplay);
        self.step(&mut report, host, "scripts", Self::defer_scripts);
        self.step(&mut report, host, "head", Self::head_mutations);
        self.step(&mut report, host, "discoverMedia", Self::discover_media);
        self.step(&mut report, host, "discoverLinks", Self::discover_links);
        self.step(&mut report, host, "rescan", Self::start_rescan);
        self.step(&mut report, host, "idle", Self::schedule_idle);
        Some(report)
    }

    fn step<H, F>(&mut self, report: &mut PassReport, host: &mut H, name: &'static str, run: F)
    where
        H: PageHost + ?Sized,
        F: FnOnce(&mut Self, &mut H) -> Result<String, PassError>,
    {
        let start = instant::Instant::now();
        let result = run(self, host);
        let duration_us = start.elapsed().as_micros() as u64;

        let (ok, detail) = match result {
            Ok(detail) => (true, detail),
            Err(err @ PassError::Skipped { .. }) => {
                log::warn(&err.to_string());
                (false, err.to_string())
            }
            Err(err) => {
                log::error(&format!("Step `{}` failed: {}", name, err));
                (false, err.to_string())
            }
        };
        report.steps.push(StepReport {
            name: name.to_string(),
            ok,
            detail,
            duration_us,
        });
    }

    // -------------------------------------------------------------------------
    // Pass steps
    // -------------------------------------------------------------------------

    fn purge<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        let mut removed = 0;
        for selector in &self.config.purge_selectors {
            let count = host.remove_matching(selector)?;
            if count > 0 {
                self.log.action("Removed", &format!("{} x {}", count, selector));
            }
            removed += count;
        }
        Ok(format!("removed {} elements", removed))
    }

    fn disable_autoplay<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        if !self.config.disable_autoplay {
            return Ok("disabled by config".to_string());
        }
        let count = host.disable_autoplay()?;
        self.log.action("Disabled video autoplay", &count.to_string());
        Ok(format!("{} videos", count))
    }

    fn defer_scripts<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        if !self.config.defer_scripts {
            return Ok("disabled by config".to_string());
        }
        let count = host.defer_scripts(&self.config.defer_keep_substring)?;
        self.log.action("Deferred blocking scripts", &count.to_string());
        Ok(format!("{} scripts", count))
    }

    fn head_mutations<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        let mut done = Vec::new();
        if self.config.placeholder_style {
            host.inject_style(&self.materializer.placeholder_css())?;
            self.log.action("Added placeholder style", &self.config.placeholder_class);
            done.push("placeholder style".to_string());
        }
        if let Some(content) = &self.config.viewport_content {
            if host.ensure_viewport_meta(content)? {
                self.log.action("Added viewport meta tag", content);
                done.push("viewport".to_string());
            }
        }
        for origin in &self.config.preconnect_origins {
            host.preconnect(origin)?;
            self.log.action("Preconnecting", origin);
            done.push(origin.clone());
        }
        Ok(done.join(", "))
    }

    fn admitted_by_policy(&self, candidate: &Candidate) -> bool {
        self.policy.classify(candidate) >= self.config.min_priority
    }

    fn discover_media<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        if !self.capabilities.visibility_observer {
            return Err(PassError::Skipped {
                step: "discoverMedia",
                reason: HostError::Unsupported("IntersectionObserver").to_string(),
            });
        }

        let mut effects = Vec::new();
        let mut observed = 0;
        for candidate in host.media_candidates()? {
            if candidate.kind == CandidateKind::Link || !self.admitted_by_policy(&candidate) {
                continue;
            }
            if self.scheduler.denylist().is_denylisted(&candidate) {
                self.log.action("Not lazy loading denylisted media", &candidate.describe());
                continue;
            }
            let has_reference = candidate
                .deferred_src
                .as_deref()
                .map(|src| !src.trim().is_empty())
                .unwrap_or(false);
            if !has_reference || self.processed.contains(candidate.id) {
                continue;
            }

            let id = candidate.id;
            self.log
                .action("Observing media for lazy loading", &candidate.describe());
            self.registry.upsert(candidate).state = VisibilityState::Pending;
            if self.lazy.observe(id) {
                effects.push(self.materializer.placeholder(id));
                effects.push(Effect::Observe {
                    concern: ObserverConcern::LazyLoad,
                    id,
                });
                observed += 1;
            }
        }
        apply_all(host, effects);
        Ok(format!("observing {} media", observed))
    }

    fn discover_links<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        if !self.capabilities.visibility_observer {
            return Err(PassError::Skipped {
                step: "discoverLinks",
                reason: HostError::Unsupported("IntersectionObserver").to_string(),
            });
        }

        let mut effects = Vec::new();
        let mut observed = 0;
        for candidate in host.link_candidates()? {
            let id = candidate.id;
            if !self.admitted_by_policy(&candidate) {
                self.scheduler.reject(id, RejectReason::LowPriority);
                continue;
            }
            match self.admit_link(candidate, &mut effects) {
                Discovery::Observed => observed += 1,
                Discovery::Rejected(RejectReason::Hidden) => self.hidden_links.push(id),
                _ => {}
            }
        }
        apply_all(host, effects);
        Ok(format!(
            "observing {} links, {} hidden",
            observed,
            self.hidden_links.len()
        ))
    }

    fn admit_link(&mut self, candidate: Candidate, effects: &mut Vec<Effect>) -> Discovery {
        let discovery = self.scheduler.discover(&candidate, &self.processed, effects);
        let entry = self.registry.upsert(candidate);
        if discovery == Discovery::Observed {
            entry.state = VisibilityState::Pending;
        }
        discovery
    }

    fn start_rescan<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        let mut effects = Vec::new();
        let hidden = std::mem::take(&mut self.hidden_links);

        if !self.capabilities.mutation_observer {
            self.rescan.disable(&mut effects);
            apply_all(host, effects);
            return Err(PassError::Skipped {
                step: "rescan",
                reason: HostError::Unsupported("MutationObserver").to_string(),
            });
        }

        let watched = hidden
            .into_iter()
            .filter(|&id| self.rescan.watch(id, &mut effects))
            .count();
        apply_all(host, effects);
        Ok(format!("watching {} hidden links", watched))
    }

    fn schedule_idle<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<String, PassError> {
        if self.config.animation_duration_ms.is_none() {
            return Ok("animation normalization disabled".to_string());
        }
        if !self.capabilities.idle_callback {
            return Err(PassError::Skipped {
                step: "idle",
                reason: HostError::Unsupported("requestIdleCallback").to_string(),
            });
        }
        host.request_idle()?;
        self.idle_pending = true;
        Ok("idle callback requested".to_string())
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Idle-time work: animation/transition normalization.
    pub fn on_idle<H: PageHost + ?Sized>(&mut self, host: &mut H) -> Result<bool, PassError> {
        if !self.idle_pending {
            return Ok(false);
        }
        self.idle_pending = false;
        if let Some(duration_ms) = self.config.animation_duration_ms {
            if let Err(err) = host.normalize_animations(duration_ms) {
                log::error(&format!("Idle work failed: {}", err));
                return Err(err.into());
            }
            self.log
                .action("Normalized animations and transitions", &format!("{}ms", duration_ms));
        }
        Ok(true)
    }

    /// Route an IntersectionObserver batch to both concerns.
    pub fn on_intersections<H: PageHost + ?Sized>(
        &mut self,
        entries: &[IntersectionEntry],
        now_ms: f64,
        host: &mut H,
    ) -> IntersectionReport {
        let mut effects = Vec::new();
        let mut report = IntersectionReport::default();

        for id in self.lazy.deliver(entries) {
            effects.push(Effect::Unobserve {
                concern: ObserverConcern::LazyLoad,
                id,
            });
            self.registry.set_state(id, VisibilityState::Visible);
            if let Some(outcome) = self.materialize_id(id, &mut effects) {
                report.materialized.push(outcome);
            }
        }

        report.prefetch = self.scheduler.on_intersections(
            entries,
            &self.registry,
            &mut self.processed,
            now_ms,
            &mut effects,
        );
        self.mark_processed(&report.prefetch);

        apply_all(host, effects);
        report
    }

    /// Materialize outside the observer path (timers, explicit triggers).
    pub fn materialize_now<H: PageHost + ?Sized>(
        &mut self,
        id: CandidateId,
        host: &mut H,
    ) -> Option<Materialization> {
        let mut effects = Vec::new();
        if self.lazy.unobserve(id) {
            effects.push(Effect::Unobserve {
                concern: ObserverConcern::LazyLoad,
                id,
            });
        }
        let outcome = self.materialize_id(id, &mut effects);
        apply_all(host, effects);
        outcome
    }

    fn materialize_id(&mut self, id: CandidateId, effects: &mut Vec<Effect>) -> Option<Materialization> {
        let candidate = self.registry.get_mut(id)?;
        let outcome = self
            .materializer
            .materialize(candidate, &mut self.processed, effects);
        match &outcome {
            Materialization::Applied { url, .. } => self.log.action("Lazy loading element", url),
            Materialization::MissingReference { id } => {
                self.log.action("No deferred reference, skipping", &format!("#{}", id))
            }
            Materialization::AlreadyProcessed { .. } => {}
        }
        Some(outcome)
    }

    fn mark_processed(&mut self, outcomes: &[(CandidateId, EntryOutcome)]) {
        for (id, outcome) in outcomes {
            match outcome {
                EntryOutcome::Emitted { .. } => self.registry.set_state(*id, VisibilityState::Processed),
                EntryOutcome::Deferred => self.registry.set_state(*id, VisibilityState::Visible),
                _ => {}
            }
        }
    }

    pub fn on_scroll(&mut self, now_ms: f64) {
        self.scheduler.on_scroll(now_ms);
    }

    /// Release entries held by the scroll gate once scrolling settles.
    pub fn tick<H: PageHost + ?Sized>(
        &mut self,
        now_ms: f64,
        host: &mut H,
    ) -> Vec<(CandidateId, EntryOutcome)> {
        let mut effects = Vec::new();
        let outcomes = self
            .scheduler
            .tick(&self.registry, &mut self.processed, now_ms, &mut effects);
        self.mark_processed(&outcomes);
        apply_all(host, effects);
        outcomes
    }

    /// Attribute change on a watched element.
    pub fn on_mutation<H: PageHost + ?Sized>(
        &mut self,
        mutation: AttributeMutation,
        host: &mut H,
    ) -> RescanDecision {
        let decision = self.rescan.check(&mutation, &self.processed);
        let mut effects = Vec::new();
        match decision {
            RescanDecision::Readmit => {
                self.log
                    .action("Element became visible", &mutation.target.describe());
                let id = mutation.target.id;
                let discovery = if self.admitted_by_policy(&mutation.target) {
                    self.admit_link(mutation.target, &mut effects)
                } else {
                    self.registry.upsert(mutation.target);
                    self.scheduler.reject(id, RejectReason::LowPriority);
                    Discovery::Rejected(RejectReason::LowPriority)
                };
                self.rescan.settle(id, discovery, &mut effects);
            }
            RescanDecision::AlreadyProcessed => {
                self.rescan.unwatch(mutation.target.id, &mut effects);
            }
            RescanDecision::StillHidden | RescanDecision::Irrelevant => {
                self.registry.upsert(mutation.target);
            }
            RescanDecision::NotWatched => {}
        }
        apply_all(host, effects);
        decision
    }

    /// Document unload: release every subscription and attribute watch.
    pub fn teardown<H: PageHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut effects = Vec::new();
        let lazy = self.lazy.drain();
        for &id in &lazy {
            effects.push(Effect::Unobserve {
                concern: ObserverConcern::LazyLoad,
                id,
            });
        }
        let released = lazy.len()
            + self.scheduler.release_all(&mut effects)
            + self.rescan.release_all(&mut effects);
        apply_all(host, effects);
        released
    }
}

fn apply_all<H: PageHost + ?Sized>(host: &mut H, effects: Vec<Effect>) {
    for effect in effects {
        host.apply(effect);
    }
}
