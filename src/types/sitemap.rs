use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to an exact-path entry in the sitemap document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StaticRoute {
    pub title: Option<String>,
    pub page_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// A URL template containing `{variable}` placeholders plus metadata
/// describing the expected variable values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DynamicRoute {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// The declarative route/alias/shortcut document an external crawler
/// maintains. Loaded once at router construction and treated as immutable;
/// an explicit reload is the only way in-memory state changes.
///
/// Ordered maps keep fuzzy workspace matching deterministic; dynamic routes
/// keep their file-declaration order because matching is first-hit-wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct UrlSitemap {
    pub version: String,
    pub tenant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_crawled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub static_routes: BTreeMap<String, StaticRoute>,
    pub dynamic_routes: Vec<DynamicRoute>,
    pub workspace_mapping: BTreeMap<String, String>,
    pub resource_shortcuts: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_coverage: Option<Value>,
}

/// Which of the five resolution strategies produced a URL result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Static,
    Workspace,
    Shortcut,
    Dynamic,
    Direct,
}

impl ResolutionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionMethod::Static => "static",
            ResolutionMethod::Workspace => "workspace",
            ResolutionMethod::Shortcut => "shortcut",
            ResolutionMethod::Dynamic => "dynamic",
            ResolutionMethod::Direct => "direct",
        }
    }
}

/// Outcome of resolving a navigation target.
///
/// A result with `is_complete: false` is a valid partial success meaning
/// "supply more variables", not an error; only a missing `url` is a failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UrlResolutionResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_method: Option<ResolutionMethod>,
    pub is_complete: bool,
    /// Placeholder names left unsubstituted in `url`, in template order.
    pub unresolved_variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlResolutionResult {
    pub fn resolved(
        url: String,
        method: ResolutionMethod,
        unresolved_variables: Vec<String>,
    ) -> Self {
        Self {
            found: true,
            url: Some(url),
            resolution_method: Some(method),
            is_complete: unresolved_variables.is_empty(),
            unresolved_variables,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            found: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}
