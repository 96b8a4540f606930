//! PageTune: Opportunistic Resource Loading for Injected Page Optimizers
//!
//! A Rust/WASM implementation of the page optimizer's scheduling core.
//!
//! # Architecture
//!
//! ## Loader Components
//! - `filter.rs` - Denylist: structural pattern rules (exact, prefix, substring, attribute)
//! - `observer.rs` - VisibilityObserver: one-shot viewport entry subscriptions
//! - `materializer.rs` - ResourceMaterializer: deferred `data-src` → live resource, once
//! - `prefetch.rs` - PrefetchScheduler: bounded, entry-ordered link prefetch hints
//! - `rescan.rs` - RescanTrigger: re-admits hidden links once they become displayable
//! - `priority.rs` - PriorityPolicy: optional container-based gating before discovery
//! - `conductor.rs` - PageConductor: one-shot page pass + event routing
//! - `wasm.rs` - PageOptimizer: JS surface over a duck-typed DOM host
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PageOptimizer } from 'pagetune';
//!
//! await init();
//!
//! const optimizer = new PageOptimizer({ prefetchLimit: 5, visibilityThreshold: 0.1 }, host);
//!
//! // Runs now unless the document is still loading
//! optimizer.start(document.readyState);
//! document.addEventListener('DOMContentLoaded', () => optimizer.onLifecycle('DOMContentLoaded'));
//! window.addEventListener('load', () => optimizer.onLifecycle('load'));
//!
//! // Forward IntersectionObserver batches
//! optimizer.onIntersections([{ id: 3, ratio: 0.4, isIntersecting: true }]);
//! console.log(optimizer.stats());
//! ```

pub mod loader;

pub use loader::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("pagetune v{}", env!("CARGO_PKG_VERSION"))
}
