//! Console logging for the page optimizer.
//!
//! Browser builds write to `console` with a `[pagetune]` prefix. Native builds
//! (unit tests, benches) compile the calls away; web_sys imports panic off wasm32.

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Info => web_sys::console::log_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Error => web_sys::console::error_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, _line: &str) {}

#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Warn,
    Error,
}

/// Action log, gated by `logActions`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLog {
    enabled: bool,
}

impl ActionLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `[pagetune] Prefetching link: https://example.com/next`
    pub fn action(&self, action: &str, detail: &str) {
        if !self.enabled {
            return;
        }
        if detail.is_empty() {
            emit(Level::Info, &format!("[pagetune] {}", action));
        } else {
            emit(Level::Info, &format!("[pagetune] {}: {}", action, detail));
        }
    }
}

pub fn warn(message: &str) {
    emit(Level::Warn, &format!("[pagetune] {}", message));
}

pub fn error(message: &str) {
    emit(Level::Error, &format!("[pagetune] {}", message));
}
