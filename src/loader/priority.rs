//! PriorityPolicy: optional gating applied before discovery
//!
//! The scheduler itself is priority-agnostic (budget goes to whoever enters
//! the viewport first). A policy only decides which candidates are
//! discovered at all.

use serde::{Deserialize, Serialize};

use crate::loader::candidate::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityBand {
    Low,
    Normal,
    High,
}

impl Default for PriorityBand {
    fn default() -> Self {
        PriorityBand::Normal
    }
}

pub trait PriorityPolicy {
    fn classify(&self, candidate: &Candidate) -> PriorityBand;
}

/// Every candidate is `Normal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPriority;

impl PriorityPolicy for UniformPriority {
    fn classify(&self, _candidate: &Candidate) -> PriorityBand {
        PriorityBand::Normal
    }
}

/// Bands by class name on the element or its container.
///
/// High wins over low when both lists match.
#[derive(Debug, Clone, Default)]
pub struct ContainerPriority {
    high: Vec<String>,
    low: Vec<String>,
}

impl ContainerPriority {
    pub fn new(high: Vec<String>, low: Vec<String>) -> Self {
        Self { high, low }
    }

    fn any_in(list: &[String], candidate: &Candidate) -> bool {
        candidate
            .signature
            .all_classes()
            .any(|class| list.iter().any(|wanted| wanted == class))
    }
}

impl PriorityPolicy for ContainerPriority {
    fn classify(&self, candidate: &Candidate) -> PriorityBand {
        if Self::any_in(&self.high, candidate) {
            PriorityBand::High
        } else if Self::any_in(&self.low, candidate) {
            PriorityBand::Low
        } else {
            PriorityBand::Normal
        }
    }
}
