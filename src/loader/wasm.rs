//! JS surface: `PageOptimizer` over a duck-typed DOM host
//!
//! The glue script passes an object implementing the host methods below;
//! exceptions thrown by it become `HostError`s and stay inside the step (or
//! event) that triggered them.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::loader::candidate::Candidate;
use crate::loader::conductor::{DocumentReadiness, LifecycleSignal, PageConductor};
use crate::loader::config::OptimizerConfig;
use crate::loader::error::{ConfigError, HostError};
use crate::loader::host::{Capabilities, Effect, PageHost};
use crate::loader::log;
use crate::loader::observer::IntersectionEntry;
use crate::loader::rescan::AttributeMutation;

// =============================================================================
// JS Host
// =============================================================================

#[wasm_bindgen]
extern "C" {
    /// Host object supplied by the glue script.
    pub type JsPageHost;

    #[wasm_bindgen(method, catch, js_name = capabilities)]
    fn js_capabilities(this: &JsPageHost) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeMatching)]
    fn js_remove_matching(this: &JsPageHost, selector: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = disableAutoplay)]
    fn js_disable_autoplay(this: &JsPageHost) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = ensureViewportMeta)]
    fn js_ensure_viewport_meta(this: &JsPageHost, content: &str) -> Result<bool, JsValue>;

    #[wasm_bindgen(method, catch, js_name = preconnect)]
    fn js_preconnect(this: &JsPageHost, origin: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = injectStyle)]
    fn js_inject_style(this: &JsPageHost, css: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = deferScripts)]
    fn js_defer_scripts(this: &JsPageHost, keep_substring: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = normalizeAnimations)]
    fn js_normalize_animations(this: &JsPageHost, duration_ms: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = mediaCandidates)]
    fn js_media_candidates(this: &JsPageHost) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = linkCandidates)]
    fn js_link_candidates(this: &JsPageHost) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = requestIdle)]
    fn js_request_idle(this: &JsPageHost) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = apply)]
    fn js_apply(this: &JsPageHost, effect: JsValue) -> Result<(), JsValue>;
}

fn js_error_message(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    match err.dyn_into::<js_sys::Error>() {
        Ok(error) => String::from(error.message()),
        Err(other) => format!("{:?}", other),
    }
}

fn parse_candidates(call: &'static str, value: JsValue) -> Result<Vec<Candidate>, HostError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| HostError::call(call, format!("Failed to parse candidates: {}", e)))
}

impl PageHost for JsPageHost {
    fn capabilities(&self) -> Capabilities {
        self.js_capabilities()
            .ok()
            .and_then(|value| serde_wasm_bindgen::from_value(value).ok())
            .unwrap_or_default()
    }

    fn remove_matching(&mut self, selector: &str) -> Result<usize, HostError> {
        self.js_remove_matching(selector)
            .map(|n| n as usize)
            .map_err(|e| HostError::call("removeMatching", js_error_message(e)))
    }

    fn disable_autoplay(&mut self) -> Result<usize, HostError> {
        self.js_disable_autoplay()
            .map(|n| n as usize)
            .map_err(|e| HostError::call("disableAutoplay", js_error_message(e)))
    }

    fn ensure_viewport_meta(&mut self, content: &str) -> Result<bool, HostError> {
        self.js_ensure_viewport_meta(content)
            .map_err(|e| HostError::call("ensureViewportMeta", js_error_message(e)))
    }

    fn preconnect(&mut self, origin: &str) -> Result<(), HostError> {
        self.js_preconnect(origin)
            .map_err(|e| HostError::call("preconnect", js_error_message(e)))
    }

    fn inject_style(&mut self, css: &str) -> Result<(), HostError> {
        self.js_inject_style(css)
            .map_err(|e| HostError::call("injectStyle", js_error_message(e)))
    }

    fn defer_scripts(&mut self, keep_substring: &str) -> Result<usize, HostError> {
        self.js_defer_scripts(keep_substring)
            .map(|n| n as usize)
            .map_err(|e| HostError::call("deferScripts", js_error_message(e)))
    }

    fn normalize_animations(&mut self, duration_ms: u32) -> Result<(), HostError> {
        self.js_normalize_animations(duration_ms)
            .map_err(|e| HostError::call("normalizeAnimations", js_error_message(e)))
    }

    fn media_candidates(&mut self) -> Result<Vec<Candidate>, HostError> {
        let value = self
            .js_media_candidates()
            .map_err(|e| HostError::call("mediaCandidates", js_error_message(e)))?;
        parse_candidates("mediaCandidates", value)
    }

    fn link_candidates(&mut self) -> Result<Vec<Candidate>, HostError> {
        let value = self
            .js_link_candidates()
            .map_err(|e| HostError::call("linkCandidates", js_error_message(e)))?;
        parse_candidates("linkCandidates", value)
    }

    fn request_idle(&mut self) -> Result<(), HostError> {
        self.js_request_idle()
            .map_err(|e| HostError::call("requestIdle", js_error_message(e)))
    }

    fn apply(&mut self, effect: Effect) {
        let value = match serde_wasm_bindgen::to_value(&effect) {
            Ok(v) => v,
            Err(e) => {
                log::error(&format!("Effect serialization failed: {:?}", e));
                return;
            }
        };
        if let Err(e) = self.js_apply(value) {
            log::error(&format!("Applying effect failed: {}", js_error_message(e)));
        }
    }
}

// =============================================================================
// PageOptimizer
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// One optimizer per document.
#[wasm_bindgen]
pub struct PageOptimizer {
    conductor: PageConductor,
    host: JsPageHost,
}

#[wasm_bindgen]
impl PageOptimizer {
    /// `config` may be undefined; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, host: JsPageHost) -> Result<PageOptimizer, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            OptimizerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        let conductor = PageConductor::new(config)?;
        Ok(PageOptimizer { conductor, host })
    }

    /// Run the pass now unless `readyState` is "loading". Returns the PassReport or null.
    #[wasm_bindgen(js_name = start)]
    pub fn js_start(&mut self, ready_state: &str) -> JsValue {
        let readiness = DocumentReadiness::parse(ready_state);
        match self.conductor.start(readiness, &mut self.host) {
            Some(report) => to_js(&report),
            None => JsValue::NULL,
        }
    }

    /// "DOMContentLoaded" or "load". Returns the PassReport, or null if the pass already ran.
    #[wasm_bindgen(js_name = onLifecycle)]
    pub fn js_on_lifecycle(&mut self, event: &str) -> JsValue {
        let Some(signal) = LifecycleSignal::parse(event) else {
            log::warn(&format!("Ignoring unknown lifecycle event `{}`", event));
            return JsValue::NULL;
        };
        match self.conductor.on_lifecycle(signal, &mut self.host) {
            Some(report) => to_js(&report),
            None => JsValue::NULL,
        }
    }

    /// Expects an array of { id, ratio, isIntersecting }
    #[wasm_bindgen(js_name = onIntersections)]
    pub fn js_on_intersections(&mut self, entries: JsValue) -> Result<JsValue, JsValue> {
        let entries: Vec<IntersectionEntry> = serde_wasm_bindgen::from_value(entries)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse entries: {}", e)))?;
        let report = self
            .conductor
            .on_intersections(&entries, js_sys::Date::now(), &mut self.host);
        Ok(to_js(&report))
    }

    /// Expects { attributeName, target: Candidate }. Returns the re-scan decision.
    #[wasm_bindgen(js_name = onMutation)]
    pub fn js_on_mutation(&mut self, mutation: JsValue) -> Result<JsValue, JsValue> {
        let mutation: AttributeMutation = serde_wasm_bindgen::from_value(mutation)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse mutation: {}", e)))?;
        let decision = self.conductor.on_mutation(mutation, &mut self.host);
        Ok(to_js(&decision))
    }

    #[wasm_bindgen(js_name = onScroll)]
    pub fn js_on_scroll(&mut self) {
        self.conductor.on_scroll(js_sys::Date::now());
    }

    /// Call periodically (or after scroll end) to release entries held while scrolling.
    #[wasm_bindgen(js_name = tick)]
    pub fn js_tick(&mut self) -> JsValue {
        let outcomes = self.conductor.tick(js_sys::Date::now(), &mut self.host);
        to_js(&outcomes)
    }

    /// requestIdleCallback target.
    #[wasm_bindgen(js_name = onIdle)]
    pub fn js_on_idle(&mut self) -> Result<bool, JsValue> {
        self.conductor
            .on_idle(&mut self.host)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = materializeNow)]
    pub fn js_materialize_now(&mut self, id: u32) -> JsValue {
        match self.conductor.materialize_now(id, &mut self.host) {
            Some(outcome) => to_js(&outcome),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = hasRun)]
    pub fn js_has_run(&self) -> bool {
        self.conductor.has_run()
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn js_stats(&self) -> JsValue {
        to_js(&self.conductor.stats())
    }

    /// `pagehide` / `unload` hook. Returns the number of released subscriptions.
    #[wasm_bindgen(js_name = teardown)]
    pub fn js_teardown(&mut self) -> usize {
        self.conductor.teardown(&mut self.host)
    }
}

/// Parse and validate a config object without building an optimizer.
#[wasm_bindgen(js_name = validateConfig)]
pub fn validate_config(config: JsValue) -> Result<(), JsValue> {
    let config: OptimizerConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(())
}
