//! Configuration types and defaults for the page optimizer
//!
//! Field names are camelCase on the JS side; every field has a default so a
//! partial object (or `{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::loader::error::ConfigError;
use crate::loader::filter::{default_rule_strings, Denylist};
use crate::loader::priority::PriorityBand;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PREFETCH_LIMIT: u32 = 10;
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_PLACEHOLDER_CLASS: &str = "skeleton";
pub const DEFAULT_VIEWPORT_CONTENT: &str = "width=device-width, initial-scale=1.0, viewport-fit=cover";
pub const DEFAULT_ANIMATION_DURATION_MS: u32 = 2000;
pub const DEFAULT_RESCAN_CAPACITY: usize = 256;
pub const DEFAULT_DEFER_KEEP_SUBSTRING: &str = "critical";

fn default_purge_selectors() -> Vec<String> {
    vec![
        r#"iframe[src*="ads"]"#.to_string(),
        r#"iframe[src*="track"]"#.to_string(),
        r#"iframe[src*="analytics"]"#.to_string(),
    ]
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizerConfig {
    /// Hard cap on prefetch hints for the page lifetime. Default: 10
    pub prefetch_limit: u32,
    /// Fraction of the element that must be visible. Default: 0.1
    pub visibility_threshold: f64,
    /// Selector-like denylist rules (see `filter.rs`)
    pub denylist_rules: Vec<String>,
    /// Hold visibility entries until scrolling has paused this long. 0 disables. Default: 0
    pub scroll_settle_delay_ms: u32,
    /// Elements removed during static cleanup
    pub purge_selectors: Vec<String>,
    pub disable_autoplay: bool,
    /// Set `defer` on blocking scripts. Default: true
    pub defer_scripts: bool,
    /// Scripts whose src contains this stay blocking. Default: "critical"
    pub defer_keep_substring: String,
    /// `None` skips viewport meta insertion
    pub viewport_content: Option<String>,
    pub preconnect_origins: Vec<String>,
    /// Class applied to media while it waits for materialization. Default: "skeleton"
    pub placeholder_class: String,
    /// Inject the pulse animation rule for the placeholder class. Default: true
    pub placeholder_style: bool,
    pub high_priority_classes: Vec<String>,
    pub low_priority_classes: Vec<String>,
    /// Candidates classified below this band are never discovered. Default: low
    pub min_priority: PriorityBand,
    /// `None` skips idle-time animation normalization. Default: 2000
    pub animation_duration_ms: Option<u32>,
    /// Max hidden links tracked for re-admission. Default: 256
    pub rescan_capacity: usize,
    /// Emit at most one hint per distinct href. Default: true
    pub dedupe_targets: bool,
    pub log_actions: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            prefetch_limit: DEFAULT_PREFETCH_LIMIT,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            denylist_rules: default_rule_strings(),
            scroll_settle_delay_ms: 0,
            purge_selectors: default_purge_selectors(),
            disable_autoplay: true,
            defer_scripts: true,
            defer_keep_substring: DEFAULT_DEFER_KEEP_SUBSTRING.to_string(),
            viewport_content: Some(DEFAULT_VIEWPORT_CONTENT.to_string()),
            preconnect_origins: Vec::new(),
            placeholder_class: DEFAULT_PLACEHOLDER_CLASS.to_string(),
            placeholder_style: true,
            high_priority_classes: Vec::new(),
            low_priority_classes: Vec::new(),
            min_priority: PriorityBand::Low,
            animation_duration_ms: Some(DEFAULT_ANIMATION_DURATION_MS),
            rescan_capacity: DEFAULT_RESCAN_CAPACITY,
            dedupe_targets: true,
            log_actions: false,
        }
    }
}

impl OptimizerConfig {
    /// Few hints, wait for scrolling to settle, leave animations alone
    pub fn conservative() -> Self {
        Self {
            prefetch_limit: 3,
            visibility_threshold: 0.5,
            scroll_settle_delay_ms: 150,
            animation_duration_ms: None,
            ..Self::default()
        }
    }

    /// Prefetch nearly everything that scrolls by
    pub fn aggressive() -> Self {
        Self {
            prefetch_limit: 1000,
            visibility_threshold: 0.0,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(ConfigError::InvalidThreshold(self.visibility_threshold));
        }
        if self.placeholder_class.trim().is_empty() {
            return Err(ConfigError::EmptyPlaceholderClass);
        }
        self.denylist()?;
        Ok(())
    }

    pub fn denylist(&self) -> Result<Denylist, ConfigError> {
        Ok(Denylist::parse(&self.denylist_rules)?)
    }
}

// =============================================================================
// Tests
// =============================================================================
