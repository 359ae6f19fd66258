use serde::{Deserialize, Serialize};

use crate::types::element::ParsedElement;

/// Lookup strategy kind used by the selector chain.
///
/// `AriaLabel` and `TextMatch` both resolve against the element's `name`
/// field because the textual snapshot format collapses the two DOM
/// attributes into one; they remain distinct types so a richer snapshot
/// source can split them later without changing callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorType {
    Name,
    AriaLabel,
    HrefPath,
    TextMatch,
    Placeholder,
    Css,
    Ref,
}

impl SelectorType {
    /// Default priority order, most stable strategy first. `Ref` is listed
    /// last because ephemeral session references go stale the moment the
    /// page re-renders.
    pub const DEFAULT_PRIORITY: [SelectorType; 7] = [
        SelectorType::Name,
        SelectorType::AriaLabel,
        SelectorType::HrefPath,
        SelectorType::TextMatch,
        SelectorType::Placeholder,
        SelectorType::Css,
        SelectorType::Ref,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SelectorType::Name => "name",
            SelectorType::AriaLabel => "aria_label",
            SelectorType::HrefPath => "href_path",
            SelectorType::TextMatch => "text_match",
            SelectorType::Placeholder => "placeholder",
            SelectorType::Css => "css",
            SelectorType::Ref => "ref",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(SelectorType::Name),
            "aria_label" => Some(SelectorType::AriaLabel),
            "href_path" => Some(SelectorType::HrefPath),
            "text_match" => Some(SelectorType::TextMatch),
            "placeholder" => Some(SelectorType::Placeholder),
            "css" => Some(SelectorType::Css),
            "ref" => Some(SelectorType::Ref),
            _ => None,
        }
    }
}

/// One candidate lookup: a strategy, the value to match, and the fixed
/// confidence assigned to that strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeterministicSelector {
    #[serde(rename = "type")]
    pub selector_type: SelectorType,
    pub value: String,
    pub confidence: f64,
}

impl DeterministicSelector {
    pub fn new(selector_type: SelectorType, value: impl Into<String>, confidence: f64) -> Self {
        Self {
            selector_type,
            value: value.into(),
            confidence,
        }
    }
}

/// Element metadata captured at crawl time: the candidate selector values a
/// chain can be built from. Every field is optional; absent fields simply
/// contribute no candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorDefinition {
    pub data_testid: Option<String>,
    pub aria_label: Option<String>,
    pub href_path: Option<String>,
    pub text_match: Option<String>,
    pub placeholder: Option<String>,
    pub css: Option<String>,
    /// Ephemeral uid observed in an earlier snapshot of the same session.
    pub session_ref: Option<String>,
}

/// Outcome of executing a selector chain against one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectorChainResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ParsedElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_selector: Option<DeterministicSelector>,
    /// Every selector actually attempted, winner included. Selectors skipped
    /// for falling below the minimum-confidence threshold are not recorded.
    pub tried_selectors: Vec<DeterministicSelector>,
    /// Confidence of the winning selector, 0.0 when nothing matched.
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SelectorChainResult {
    pub fn not_found(tried: Vec<DeterministicSelector>, error: impl Into<String>) -> Self {
        Self {
            found: false,
            tried_selectors: tried,
            confidence: 0.0,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Flatten into the externally-facing result shape handed to the
    /// automation host. Pure structural mapping.
    pub fn to_resolution_result(&self) -> ResolutionResult {
        ResolutionResult {
            success: self.found,
            uid: self.uid.clone(),
            method: self
                .used_selector
                .as_ref()
                .map(|selector| selector.selector_type.as_str().to_string()),
            confidence: self.confidence,
            attempts: self.tried_selectors.len(),
            error: self.error.clone(),
        }
    }
}

/// Externally-facing element resolution result. Only `uid` is required to
/// perform the browser action; the rest is telemetry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub confidence: f64,
    pub attempts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
