
use std::collections::HashSet;

use crate::loader::candidate::{Candidate, CandidateId};
use crate::loader::error::HostError;
use crate::loader::host::{Capabilities, Effect, PageHost};
use crate::loader::observer::ObserverConcern;

/// In-memory host: serves fixed candidate lists and records everything applied.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub caps: Capabilities,
    pub media: Vec<Candidate>,
    pub links: Vec<Candidate>,
    pub effects: Vec<Effect>,
    pub removed: Vec<String>,
    pub viewport_present: bool,
    pub viewport_inserts: usize,
    pub preconnects: Vec<String>,
    pub styles: Vec<String>,
    pub deferred_with: Vec<String>,
    pub idle_requests: usize,
    pub normalized: Vec<u32>,
    /// Host calls that throw
    pub failing: HashSet<&'static str>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(mut self, links: Vec<Candidate>) -> Self {
        self.links = links;
        self
    }

    pub fn with_media(mut self, media: Vec<Candidate>) -> Self {
        self.media = media;
        self
    }

    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    fn check(&self, call: &'static str) -> Result<(), HostError> {
        if self.failing.contains(call) {
            Err(HostError::call(call, "TypeError: boom"))
        } else {
            Ok(())
        }
    }

    pub fn prefetched(&self) -> Vec<String> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Prefetch { href } => Some(href.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn resources_set(&self, id: CandidateId) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::SetResource { id: target, .. } if *target == id))
            .count()
    }

    pub fn observed(&self, concern: ObserverConcern) -> Vec<CandidateId> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Observe { concern: c, id } if *c == concern => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl PageHost for RecordingHost {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn remove_matching(&mut self, selector: &str) -> Result<usize, HostError> {
        self.check("removeMatching")?;
        self.removed.push(selector.to_string());
        Ok(1)
    }

    fn disable_autoplay(&mut self) -> Result<usize, HostError> {
        self.check("disableAutoplay")?;
        Ok(0)
    }

    fn ensure_viewport_meta(&mut self, _content: &str) -> Result<bool, HostError> {
        self.check("ensureViewportMeta")?;
        if self.viewport_present {
            return Ok(false);
        }
        self.viewport_present = true;
        self.viewport_inserts += 1;
        Ok(true)
    }

    fn preconnect(&mut self, origin: &str) -> Result<(), HostError> {
        self.check("preconnect")?;
        self.preconnects.push(origin.to_string());
        Ok(())
    }

    fn inject_style(&mut self, css: &str) -> Result<(), HostError> {
        self.check("injectStyle")?;
        self.styles.push(css.to_string());
        Ok(())
    }

    fn defer_scripts(&mut self, keep_substring: &str) -> Result<usize, HostError> {
        self.check("deferScripts")?;
        self.deferred_with.push(keep_substring.to_string());
        Ok(2)
    }

    fn normalize_animations(&mut self, duration_ms: u32) -> Result<(), HostError> {
        self.check("normalizeAnimations")?;
        self.normalized.push(duration_ms);
        Ok(())
    }

    fn media_candidates(&mut self) -> Result<Vec<Candidate>, HostError> {
        self.check("mediaCandidates")?;
        Ok(self.media.clone())
    }

    fn link_candidates(&mut self) -> Result<Vec<Candidate>, HostError> {
        self.check("linkCandidates")?;
        Ok(self.links.clone())
    }

    fn request_idle(&mut self) -> Result<(), HostError> {
        self.check("requestIdle")?;
        self.idle_requests += 1;
        Ok(())
    }

    fn apply(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
