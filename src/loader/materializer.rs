//! ResourceMaterializer: deferred reference → live resource, once per element
//!
//! The ProcessedSet check is the guard, not the observer's one-shot firing:
//! timers, re-scans and the observer may all race to the same element.

use serde::{Deserialize, Serialize};

use crate::loader::candidate::{Candidate, CandidateId, ProcessedSet, VisibilityState};
use crate::loader::host::Effect;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Materialization {
    Applied { id: CandidateId, url: String },
    AlreadyProcessed { id: CandidateId },
    /// No usable deferred reference. Nothing applied.
    MissingReference { id: CandidateId },
}

#[derive(Debug, Clone)]
pub struct ResourceMaterializer {
    placeholder_class: String,
    applied: u64,
}

impl ResourceMaterializer {
    pub fn new(placeholder_class: &str) -> Self {
        Self {
            placeholder_class: placeholder_class.to_string(),
            applied: 0,
        }
    }

    pub fn placeholder_class(&self) -> &str {
        &self.placeholder_class
    }

    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Pulse animation for elements carrying the placeholder class.
    pub fn placeholder_css(&self) -> String {
        format!(
            "@keyframes pagetune-pulse {{ 0% {{ opacity: 0.3; }} 50% {{ opacity: 0.15; }} 100% {{ opacity: 0.3; }} }}\n\
             .{} {{ animation: pagetune-pulse 1s infinite ease-in-out; }}",
            self.placeholder_class
        )
    }

    /// Effect marking a media candidate as waiting.
    pub fn placeholder(&self, id: CandidateId) -> Effect {
        Effect::AddClass {
            id,
            class: self.placeholder_class.clone(),
        }
    }

    pub fn materialize(
        &mut self,
        candidate: &mut Candidate,
        processed: &mut ProcessedSet,
        effects: &mut Vec<Effect>,
    ) -> Materialization {
        let id = candidate.id;
        if processed.contains(id) {
            return Materialization::AlreadyProcessed { id };
        }

        let usable = candidate
            .deferred_src
            .as_deref()
            .map(|src| !src.trim().is_empty())
            .unwrap_or(false);
        if !usable {
            return Materialization::MissingReference { id };
        }
        let Some(url) = candidate.deferred_src.take() else {
            return Materialization::MissingReference { id };
        };

        effects.push(Effect::SetResource {
            id,
            url: url.clone(),
        });
        effects.push(Effect::ClearDeferred { id });
        effects.push(Effect::RemoveClass {
            id,
            class: self.placeholder_class.clone(),
        });

        candidate.state = VisibilityState::Processed;
        processed.insert(id);
        self.applied += 1;

        Materialization::Applied { id, url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_and_clears_reference() {
        let mut materializer = ResourceMaterializer::new("skeleton");
        let mut processed = ProcessedSet::new();
        let mut effects = Vec::new();
        let mut img = Candidate::media(1, "/img/a.jpg");

        let outcome = materializer.materialize(&mut img, &mut processed, &mut effects);

        assert_eq!(
            outcome,
            Materialization::Applied {
                id: 1,
                url: "/img/a.jpg".to_string()
            }
        );
        assert!(img.deferred_src.is_none());
        assert_eq!(img.state, VisibilityState::Processed);
        assert!(processed.contains(1));
        assert_eq!(
            effects,
            vec![
                Effect::SetResource {
                    id: 1,
                    url: "/img/a.jpg".to_string()
                },
                Effect::ClearDeferred { id: 1 },
                Effect::RemoveClass {
                    id: 1,
                    class: "skeleton".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_second_call_is_noop() {
        let mut materializer = ResourceMaterializer::new("skeleton");
        let mut processed = ProcessedSet::new();
        let mut effects = Vec::new();
        let mut img = Candidate::media(1, "/img/a.jpg");

        materializer.materialize(&mut img, &mut processed, &mut effects);
        // Host re-sent the snapshot with the old reference still attached
        img.deferred_src = Some("/img/a.jpg".to_string());
        let outcome = materializer.materialize(&mut img, &mut processed, &mut effects);

        assert_eq!(outcome, Materialization::AlreadyProcessed { id: 1 });
        assert_eq!(effects.len(), 3);
        assert_eq!(materializer.applied_count(), 1);
    }

    #[test]
    fn test_missing_reference_not_processed() {
        let mut materializer = ResourceMaterializer::new("skeleton");
        let mut processed = ProcessedSet::new();
        let mut effects = Vec::new();
        let mut img = Candidate::media(2, "  ");

        let outcome = materializer.materialize(&mut img, &mut processed, &mut effects);

        assert_eq!(outcome, Materialization::MissingReference { id: 2 });
        assert!(effects.is_empty());
        assert!(!processed.contains(2));
        assert_eq!(img.deferred_src.as_deref(), Some("  "));
    }

    #[test]
    fn test_placeholder_css_uses_configured_class() {
        let css = ResourceMaterializer::new("lazy-wait").placeholder_css();
        assert!(css.contains("@keyframes pagetune-pulse"));
        assert!(css.contains(".lazy-wait { animation: pagetune-pulse"));
    }
}
