//! Denylist: structural pattern filter for candidates
//!
//! Decides whether an element is excluded from lazy loading and prefetching
//! (ads, trackers, overlays, hidden containers). Pure over the candidate's
//! signature; a candidate is rejected if ANY rule matches, no match means allow.
//!
//! # Rule syntax
//! - `.banner` - exact class
//! - `.ad*` / `[class^="ad-"]` - class prefix
//! - `[class*="track"]` - class substring (Aho-Corasick)
//! - `[class~="promo"]` / `[class="promo"]` - exact class
//! - `[hidden]` - attribute presence
//! - trailing ` i` inside brackets: ASCII case-insensitive (`[class*="Ad" i]`)

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::loader::candidate::{Candidate, Signature};
use crate::loader::error::FilterError;

// =============================================================================
// Rules
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    ExactClass,
    ClassPrefix,
    ClassSubstring,
    AttributePresent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenylistRule {
    pub kind: RuleKind,
    pub pattern: String,
    pub case_sensitive: bool,
}

fn class_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.(-?[_A-Za-z][-_A-Za-z0-9]*)(\*)?$").expect("valid class rule regex"))
}

fn class_attr_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\[\s*class\s*([~^*]?=)\s*["']([^"']*)["']\s*([iIsS])?\s*\]$"#)
            .expect("valid class attribute rule regex")
    })
}

fn presence_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\s*([A-Za-z_][-A-Za-z0-9_:.]*)\s*\]$").expect("valid presence rule regex"))
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

impl DenylistRule {
    fn new(kind: RuleKind, pattern: &str, case_sensitive: bool) -> Result<Self, FilterError> {
        if pattern.is_empty() {
            return Err(FilterError::EmptyPattern(pattern.to_string()));
        }
        Ok(Self {
            kind,
            pattern: pattern.to_string(),
            case_sensitive,
        })
    }

    pub fn exact_class(pattern: &str) -> Result<Self, FilterError> {
        Self::new(RuleKind::ExactClass, pattern, true)
    }

    pub fn class_prefix(pattern: &str) -> Result<Self, FilterError> {
        Self::new(RuleKind::ClassPrefix, pattern, true)
    }

    pub fn class_substring(pattern: &str) -> Result<Self, FilterError> {
        Self::new(RuleKind::ClassSubstring, pattern, true)
    }

    pub fn attribute(name: &str) -> Result<Self, FilterError> {
        Self::new(RuleKind::AttributePresent, name, false)
    }

    pub fn ignore_case(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Parse a selector-like rule string.
    pub fn parse(rule: &str) -> Result<Self, FilterError> {
        let trimmed = rule.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".*" {
            return Err(FilterError::EmptyPattern(rule.to_string()));
        }

        if let Some(caps) = class_rule_re().captures(trimmed) {
            let kind = if caps.get(2).is_some() {
                RuleKind::ClassPrefix
            } else {
                RuleKind::ExactClass
            };
            return Self::new(kind, &caps[1], true);
        }

        if let Some(caps) = class_attr_rule_re().captures(trimmed) {
            let value = &caps[2];
            if value.is_empty() {
                return Err(FilterError::EmptyPattern(rule.to_string()));
            }
            let kind = match &caps[1] {
                "^=" => RuleKind::ClassPrefix,
                "*=" => RuleKind::ClassSubstring,
                _ => RuleKind::ExactClass,
            };
            let insensitive = caps
                .get(3)
                .map(|flag| flag.as_str().eq_ignore_ascii_case("i"))
                .unwrap_or(false);
            return Self::new(kind, value, !insensitive);
        }

        if let Some(caps) = presence_rule_re().captures(trimmed) {
            return Self::new(RuleKind::AttributePresent, &caps[1], false);
        }

        Err(FilterError::Unrecognized(rule.to_string()))
    }

    fn matches_class(&self, class: &str) -> bool {
        match (self.kind, self.case_sensitive) {
            (RuleKind::ExactClass, true) => class == self.pattern,
            (RuleKind::ExactClass, false) => class.eq_ignore_ascii_case(&self.pattern),
            (RuleKind::ClassPrefix, true) => class.starts_with(&self.pattern),
            (RuleKind::ClassPrefix, false) => starts_with_ignore_case(class, &self.pattern),
            (RuleKind::ClassSubstring, true) => class.contains(&self.pattern),
            (RuleKind::ClassSubstring, false) => class
                .to_ascii_lowercase()
                .contains(&self.pattern.to_ascii_lowercase()),
            (RuleKind::AttributePresent, _) => false,
        }
    }

    /// Evaluate this single rule against a signature.
    pub fn matches(&self, signature: &Signature) -> bool {
        match self.kind {
            RuleKind::AttributePresent => signature.has_attribute(&self.pattern),
            _ => signature.all_classes().any(|class| self.matches_class(class)),
        }
    }
}

// =============================================================================
// Denylist
// =============================================================================

/// Static rule set for one pass.
///
/// Substring rules are compiled into two automata (case-sensitive and
/// ASCII case-insensitive); the remaining kinds are checked directly.
#[derive(Debug, Clone)]
pub struct Denylist {
    rules: Vec<DenylistRule>,
    sensitive: Option<SubstringMatcher>,
    insensitive: Option<SubstringMatcher>,
}

#[derive(Debug, Clone)]
struct SubstringMatcher {
    automaton: AhoCorasick,
    /// pattern id -> index into `rules`
    rule_index: Vec<usize>,
}

impl SubstringMatcher {
    fn build(rules: &[DenylistRule], case_sensitive: bool) -> Result<Option<Self>, FilterError> {
        let (patterns, rule_index): (Vec<&str>, Vec<usize>) = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == RuleKind::ClassSubstring && r.case_sensitive == case_sensitive)
            .map(|(i, r)| (r.pattern.as_str(), i))
            .unzip();

        if patterns.is_empty() {
            return Ok(None);
        }

        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(!case_sensitive)
            .build(&patterns)
            .map_err(|e| FilterError::Matcher(e.to_string()))?;

        Ok(Some(Self {
            automaton,
            rule_index,
        }))
    }

    fn find(&self, haystack: &str) -> Option<usize> {
        self.automaton
            .find(haystack)
            .map(|m| self.rule_index[m.pattern().as_usize()])
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::standard()
    }
}

impl Denylist {
    pub fn new(rules: Vec<DenylistRule>) -> Result<Self, FilterError> {
        let sensitive = SubstringMatcher::build(&rules, true)?;
        let insensitive = SubstringMatcher::build(&rules, false)?;
        Ok(Self {
            rules,
            sensitive,
            insensitive,
        })
    }

    /// A denylist that allows everything.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            sensitive: None,
            insensitive: None,
        }
    }

    pub fn parse<S: AsRef<str>>(rules: &[S]) -> Result<Self, FilterError> {
        let parsed = rules
            .iter()
            .map(|r| DenylistRule::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Ads, trackers, overlays, chrome and hidden containers.
    pub fn standard() -> Self {
        let rules = default_rule_strings();
        let parsed: Vec<DenylistRule> = rules
            .iter()
            .filter_map(|r| DenylistRule::parse(r).ok())
            .collect();
        Self::new(parsed).unwrap_or_else(|_| Self::empty())
    }

    pub fn rules(&self) -> &[DenylistRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching the signature, if any.
    pub fn matching_rule(&self, signature: &Signature) -> Option<&DenylistRule> {
        let direct = self
            .rules
            .iter()
            .filter(|r| r.kind != RuleKind::ClassSubstring)
            .find(|r| r.matches(signature));
        if direct.is_some() {
            return direct;
        }

        for class in signature.all_classes() {
            for matcher in [&self.sensitive, &self.insensitive].into_iter().flatten() {
                if let Some(index) = matcher.find(class) {
                    return self.rules.get(index);
                }
            }
        }
        None
    }

    pub fn is_denylisted(&self, candidate: &Candidate) -> bool {
        self.matching_rule(&candidate.signature).is_some()
    }
}

/// Rule strings used when the configuration does not override them.
pub fn default_rule_strings() -> Vec<String> {
    const PREFIXES: &[&str] = &[
        "ad", "track", "analytics", "popup", "modal", "overlay", "signup", "paywall", "cookie",
        "subscribe", "banner", "notification", "announce", "footer", "sidebar", "related",
        "partner", "admin", "dashboard", "settings", "hidden", "offscreen",
    ];
    PREFIXES
        .iter()
        .map(|p| format!(".{}*", p))
        .chain(std::iter::once("[hidden]".to_string()))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
