//! Browser-side checks for the JS surface. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn version_is_set() {
    assert!(!pagetune::version().is_empty());
}

#[wasm_bindgen_test]
fn validate_config_accepts_partial_object() {
    let config = js_sys::JSON::parse(r#"{"prefetchLimit": 3}"#).unwrap();
    assert!(pagetune::validate_config(config).is_ok());
}

#[wasm_bindgen_test]
fn validate_config_rejects_bad_threshold() {
    let config = js_sys::JSON::parse(r#"{"visibilityThreshold": 2.5}"#).unwrap();
    let err = pagetune::validate_config(config).unwrap_err();
    assert!(err.as_string().unwrap_or_default().contains("2.5"));
}

#[wasm_bindgen_test]
fn validate_config_rejects_empty_rule() {
    let config = js_sys::JSON::parse(r#"{"denylistRules": [".*"]}"#).unwrap();
    assert!(pagetune::validate_config(config).is_err());
}
