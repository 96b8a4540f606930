//! PageHost: the live document, as seen by the loader
//!
//! Everything that touches the real DOM sits behind this trait: static
//! cleanup, head mutations, candidate queries and the per-element effects
//! the scheduler decides on. Browser builds implement it over a JS object
//! (see `wasm.rs`); tests implement it with an in-memory recorder.

use serde::{Deserialize, Serialize};

use crate::loader::candidate::{Candidate, CandidateId};
use crate::loader::error::HostError;
use crate::loader::observer::ObserverConcern;

// =============================================================================
// Effects
// =============================================================================

/// A single element mutation requested by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Effect {
    /// Subscribe the element on the host observer for `concern`
    #[serde(rename_all = "camelCase")]
    Observe { concern: ObserverConcern, id: CandidateId },
    #[serde(rename_all = "camelCase")]
    Unobserve { concern: ObserverConcern, id: CandidateId },
    /// Start a MutationObserver on the element, filtered to `attributes`
    #[serde(rename_all = "camelCase")]
    WatchAttributes { id: CandidateId, attributes: Vec<String> },
    #[serde(rename_all = "camelCase")]
    UnwatchAttributes { id: CandidateId },
    /// `src` for media, `href` for stylesheets
    #[serde(rename_all = "camelCase")]
    SetResource { id: CandidateId, url: String },
    /// Remove `data-src` / `data-href`
    #[serde(rename_all = "camelCase")]
    ClearDeferred { id: CandidateId },
    #[serde(rename_all = "camelCase")]
    AddClass { id: CandidateId, class: String },
    #[serde(rename_all = "camelCase")]
    RemoveClass { id: CandidateId, class: String },
    /// Append `<link rel="prefetch" href=...>` to the head
    #[serde(rename_all = "camelCase")]
    Prefetch { href: String },
}

// =============================================================================
// Capabilities
// =============================================================================

/// Optional environment primitives. A missing one disables only its feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub visibility_observer: bool,
    pub mutation_observer: bool,
    pub idle_callback: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            visibility_observer: true,
            mutation_observer: true,
            idle_callback: true,
        }
    }
}

impl Capabilities {
    pub fn none() -> Self {
        Self {
            visibility_observer: false,
            mutation_observer: false,
            idle_callback: false,
        }
    }
}

// =============================================================================
// PageHost
// =============================================================================

pub trait PageHost {
    fn capabilities(&self) -> Capabilities;

    /// Remove every element matching `selector`, returning how many were removed.
    fn remove_matching(&mut self, selector: &str) -> Result<usize, HostError>;

    /// Strip `autoplay` from videos, returning how many were changed.
    fn disable_autoplay(&mut self) -> Result<usize, HostError>;

    /// Insert the viewport meta tag unless one exists. Returns true if inserted.
    fn ensure_viewport_meta(&mut self, content: &str) -> Result<bool, HostError>;

    fn preconnect(&mut self, origin: &str) -> Result<(), HostError>;

    /// Append a `<style>` element with `css` to the head.
    fn inject_style(&mut self, css: &str) -> Result<(), HostError>;

    /// Set `defer` on blocking scripts (`script:not([async]):not([defer])`)
    /// whose src does not contain `keep_substring`. Returns how many changed.
    fn defer_scripts(&mut self, keep_substring: &str) -> Result<usize, HostError>;

    /// Clamp animation/transition durations page-wide.
    fn normalize_animations(&mut self, duration_ms: u32) -> Result<(), HostError>;

    /// `img[data-src]`, `video[data-src]`, deferred stylesheets
    fn media_candidates(&mut self) -> Result<Vec<Candidate>, HostError>;

    /// `a[href]`
    fn link_candidates(&mut self) -> Result<Vec<Candidate>, HostError>;

    /// Ask for an idle-time callback; the host later calls back into `on_idle`.
    fn request_idle(&mut self) -> Result<(), HostError>;

    /// Apply one element effect. Fire-and-forget.
    fn apply(&mut self, effect: Effect);
}

// =============================================================================
// Tests
// =============================================================================
