//! Candidate: host-provided snapshot of a document element
//!
//! The host owns the real element. The loader only ever sees a numeric id
//! plus the attributes it needs for filtering, materializing and prefetching.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Types
// =============================================================================

/// Opaque element handle assigned by the host.
pub type CandidateId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// `img[data-src]`, `video[data-src]`
    Media,
    /// `a[href]`
    Link,
    /// Deferred stylesheet (`link[data-href]`)
    Stylesheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    #[default]
    Unknown,
    /// Subscribed, waiting for a viewport entry
    Pending,
    /// Entered the viewport, terminal transition not yet applied
    Visible,
    Processed,
}

/// Class/attribute signature used for denylist matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Signature {
    pub classes: Vec<String>,
    /// Attribute names present on the element
    pub attributes: Vec<String>,
    /// Classes of the nearest enclosing container (div, section, article, aside, header, main, footer)
    pub container_classes: Vec<String>,
}

impl Signature {
    pub fn with_classes(classes: &[&str]) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Own classes followed by container classes.
    pub fn all_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .chain(self.container_classes.iter())
            .map(String::as_str)
    }
}

fn default_displayed() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub kind: CandidateKind,
    /// Real resource location, applied on materialization
    #[serde(default)]
    pub deferred_src: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub signature: Signature,
    /// False when the element is `display: none` or otherwise not rendered
    #[serde(default = "default_displayed")]
    pub displayed: bool,
    #[serde(skip)]
    pub state: VisibilityState,
}

impl Candidate {
    pub fn media(id: CandidateId, deferred_src: &str) -> Self {
        Self {
            id,
            kind: CandidateKind::Media,
            deferred_src: Some(deferred_src.to_string()),
            href: None,
            signature: Signature::default(),
            displayed: true,
            state: VisibilityState::Unknown,
        }
    }

    pub fn link(id: CandidateId, href: &str) -> Self {
        Self {
            id,
            kind: CandidateKind::Link,
            deferred_src: None,
            href: Some(href.to_string()),
            signature: Signature::default(),
            displayed: true,
            state: VisibilityState::Unknown,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Short description for action logs
    pub fn describe(&self) -> String {
        if !self.signature.classes.is_empty() {
            return self.signature.classes.join(" ");
        }
        self.deferred_src
            .as_deref()
            .or(self.href.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

// =============================================================================
// ProcessedSet
// =============================================================================

/// Candidates that reached a materialized/prefetched terminal state.
///
/// Membership is permanent for the lifetime of the page.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    ids: HashSet<CandidateId>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the candidate was already processed.
    pub fn insert(&mut self, id: CandidateId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// CandidateRegistry
// =============================================================================

/// Latest snapshot per candidate, owned by the conductor.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    candidates: HashMap<CandidateId, Candidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a snapshot. The tracked visibility state survives refreshes.
    pub fn upsert(&mut self, mut candidate: Candidate) -> &mut Candidate {
        match self.candidates.entry(candidate.id) {
            Entry::Occupied(mut slot) => {
                candidate.state = slot.get().state;
                slot.insert(candidate);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(candidate),
        }
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(&id)
    }

    pub fn get_mut(&mut self, id: CandidateId) -> Option<&mut Candidate> {
        self.candidates.get_mut(&id)
    }

    pub fn set_state(&mut self, id: CandidateId, state: VisibilityState) {
        if let Some(candidate) = self.candidates.get_mut(&id) {
            candidate.state = state;
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_set_insert_is_once() {
        let mut processed = ProcessedSet::new();
        assert!(processed.insert(7));
        assert!(!processed.insert(7));
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn test_registry_upsert_keeps_state() {
        let mut registry = CandidateRegistry::new();
        registry.upsert(Candidate::link(1, "/a"));
        registry.set_state(1, VisibilityState::Pending);

        registry.upsert(Candidate::link(1, "/b"));
        let candidate = registry.get(1).unwrap();
        assert_eq!(candidate.state, VisibilityState::Pending);
        assert_eq!(candidate.href.as_deref(), Some("/b"));
    }

    #[test]
    fn test_candidate_deserializes_from_camel_case() {
        let json = r#"{
            "id": 4,
            "kind": "media",
            "deferredSrc": "/img/hero.webp",
            "signature": { "classes": ["hero"], "containerClasses": ["main"] }
        }"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.kind, CandidateKind::Media);
        assert_eq!(candidate.deferred_src.as_deref(), Some("/img/hero.webp"));
        assert!(candidate.displayed, "displayed defaults to true");
        assert_eq!(candidate.signature.container_classes, vec!["main"]);
        assert_eq!(candidate.state, VisibilityState::Unknown);
    }

    #[test]
    fn test_signature_attribute_lookup_ignores_case() {
        let signature = Signature {
            attributes: vec!["HIDDEN".to_string()],
            ..Signature::default()
        };
        assert!(signature.has_attribute("hidden"));
        assert!(!signature.has_attribute("aria-hidden"));
    }

    #[test]
    fn test_describe_prefers_classes() {
        let candidate = Candidate::link(2, "/next")
            .with_signature(Signature::with_classes(&["nav", "primary"]));
        assert_eq!(candidate.describe(), "nav primary");
        assert_eq!(Candidate::link(3, "/next").describe(), "/next");
    }
}
