//! URL route resolution over a declarative sitemap document.
//!
//! The router loads the sitemap JSON once at construction (the only fatal
//! condition in this crate: there is no sane default document to fall back
//! to) and afterwards resolves logical navigation targets through a fixed
//! five-method chain: static route, workspace alias, resource shortcut,
//! dynamic pattern, direct path. Resolution failures are structured results,
//! never errors; a partially-substituted template (`is_complete: false`) is a
//! valid outcome meaning "supply more variables".

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;
use thiserror::Error;

use crate::config::NavigatorConfig;
use crate::logging::NavigatorLogger;
use crate::types::{ResolutionMethod, UrlResolutionResult, UrlSitemap};

/// Errors raised while loading the sitemap document. These are the only
/// unrecoverable failures in the resolution core.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("failed to read sitemap document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse sitemap document: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
    #[error("no sitemap path configured")]
    MissingPath,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_]\w*)\}").expect("placeholder regex is valid"))
}

/// Resolves logical navigation targets to concrete console URLs.
#[derive(Debug)]
pub struct UrlRouter {
    sitemap: UrlSitemap,
    default_namespace: Option<String>,
    logger: Option<NavigatorLogger>,
}

impl UrlRouter {
    /// Load the sitemap document from disk. Fatal if the file is missing or
    /// malformed.
    pub fn from_path(
        path: impl AsRef<Path>,
        default_namespace: Option<String>,
    ) -> Result<Self, RouterError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RouterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, default_namespace)
    }

    /// Parse an in-memory sitemap document.
    pub fn from_json(raw: &str, default_namespace: Option<String>) -> Result<Self, RouterError> {
        let sitemap: UrlSitemap =
            serde_json::from_str(raw).map_err(|source| RouterError::Parse { source })?;
        Ok(Self::from_sitemap(sitemap, default_namespace))
    }

    /// Wrap an already-deserialized sitemap.
    pub fn from_sitemap(sitemap: UrlSitemap, default_namespace: Option<String>) -> Self {
        Self {
            sitemap,
            default_namespace,
            logger: None,
        }
    }

    /// Construct from configuration: sitemap path and default namespace.
    pub fn with_config(config: &NavigatorConfig) -> Result<Self, RouterError> {
        let path = config.sitemap_path.as_ref().ok_or(RouterError::MissingPath)?;
        Self::from_path(path, config.default_namespace.clone())
    }

    pub fn with_logger(mut self, logger: NavigatorLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn sitemap(&self) -> &UrlSitemap {
        &self.sitemap
    }

    /// Replace the in-memory sitemap with a fresh copy of the document.
    /// State only ever changes through this explicit call; an external
    /// updater rewriting the file on disk has no effect until then.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), RouterError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RouterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.sitemap = serde_json::from_str(&raw).map_err(|source| RouterError::Parse { source })?;
        if let Some(logger) = &self.logger {
            logger.info(
                format!("reloaded sitemap from {}", path.display()),
                Some("routes"),
                None,
            );
        }
        Ok(())
    }

    /// Known workspace aliases, in deterministic order.
    pub fn list_workspaces(&self) -> Vec<&str> {
        self.sitemap
            .workspace_mapping
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Known resource shortcut aliases, in deterministic order.
    pub fn list_shortcuts(&self) -> Vec<&str> {
        self.sitemap
            .resource_shortcuts
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Resolve a navigation target with the caller's variables.
    pub fn resolve(
        &self,
        target: &str,
        variables: &HashMap<String, String>,
    ) -> UrlResolutionResult {
        self.resolve_with(target, variables, None, None)
    }

    /// Resolve with convenience `namespace` / `resource_name` parameters
    /// merged into the variables map (as `namespace` and `name`) before the
    /// method chain runs.
    pub fn resolve_with(
        &self,
        target: &str,
        variables: &HashMap<String, String>,
        namespace: Option<&str>,
        resource_name: Option<&str>,
    ) -> UrlResolutionResult {
        let mut vars = variables.clone();
        if let Some(namespace) = namespace {
            vars.insert("namespace".to_string(), namespace.to_string());
        }
        if let Some(name) = resource_name {
            vars.insert("name".to_string(), name.to_string());
        }

        let result = self
            .resolve_static(target)
            .or_else(|| self.resolve_workspace(target))
            .or_else(|| self.resolve_shortcut_inner(target, &vars))
            .or_else(|| self.resolve_dynamic(target, &vars))
            .or_else(|| self.resolve_direct(target))
            .unwrap_or_else(|| {
                UrlResolutionResult::failure(format!(
                    "could not resolve navigation target '{target}'"
                ))
            });

        if let Some(logger) = &self.logger {
            match (&result.url, &result.resolution_method) {
                (Some(url), Some(method)) => logger.debug(
                    format!("resolved '{target}' to {url} via {}", method.as_str()),
                    Some("routes"),
                    Some(json!({ "isComplete": result.is_complete })),
                ),
                _ => logger.debug(
                    format!("no resolution method matched '{target}'"),
                    Some("routes"),
                    None,
                ),
            }
        }

        result
    }

    /// Resolve a resource shortcut alias directly, skipping the earlier
    /// methods of the chain.
    pub fn resolve_shortcut(
        &self,
        alias: &str,
        variables: &HashMap<String, String>,
    ) -> UrlResolutionResult {
        self.resolve_shortcut_inner(alias, variables)
            .unwrap_or_else(|| {
                UrlResolutionResult::failure(format!("unknown resource shortcut '{alias}'"))
            })
    }

    fn resolve_static(&self, target: &str) -> Option<UrlResolutionResult> {
        self.sitemap.static_routes.get(target).map(|_| {
            UrlResolutionResult::resolved(target.to_string(), ResolutionMethod::Static, Vec::new())
        })
    }

    fn resolve_workspace(&self, target: &str) -> Option<UrlResolutionResult> {
        let normalized = normalize_target(target);

        if let Some(path) = self.sitemap.workspace_mapping.get(&normalized) {
            return Some(UrlResolutionResult::resolved(
                path.clone(),
                ResolutionMethod::Workspace,
                Vec::new(),
            ));
        }

        // Fuzzy pass: substring containment in either direction against both
        // the alias keys and the mapped path values. The mapping is an
        // ordered map, so ties resolve deterministically.
        for (alias, path) in &self.sitemap.workspace_mapping {
            let alias_lower = alias.to_lowercase();
            let path_lower = path.to_lowercase();
            if alias_lower.contains(&normalized)
                || normalized.contains(&alias_lower)
                || path_lower.contains(&normalized)
                || normalized.contains(&path_lower)
            {
                return Some(UrlResolutionResult::resolved(
                    path.clone(),
                    ResolutionMethod::Workspace,
                    Vec::new(),
                ));
            }
        }

        None
    }

    fn resolve_shortcut_inner(
        &self,
        target: &str,
        variables: &HashMap<String, String>,
    ) -> Option<UrlResolutionResult> {
        let normalized = normalize_target(target);
        let template = self.sitemap.resource_shortcuts.get(&normalized)?;
        let (url, unresolved) = self.substitute(template, variables);
        Some(UrlResolutionResult::resolved(
            url,
            ResolutionMethod::Shortcut,
            unresolved,
        ))
    }

    fn resolve_dynamic(
        &self,
        target: &str,
        variables: &HashMap<String, String>,
    ) -> Option<UrlResolutionResult> {
        // A target that is itself a template is substituted directly.
        if target.contains('{') {
            let (url, unresolved) = self.substitute(target, variables);
            return Some(UrlResolutionResult::resolved(
                url,
                ResolutionMethod::Dynamic,
                unresolved,
            ));
        }

        // Patterns are tried in file-declaration order, first regex match
        // wins; there is no specificity tie-break.
        for route in &self.sitemap.dynamic_routes {
            let Some(regex) = pattern_regex(&route.pattern) else {
                continue;
            };
            let Some(captures) = regex.captures(target) else {
                continue;
            };

            let mut merged: HashMap<String, String> = HashMap::new();
            for name in regex.capture_names().flatten() {
                if let Some(value) = captures.name(name) {
                    merged.insert(name.to_string(), value.as_str().to_string());
                }
            }
            // Explicitly supplied variables override extracted ones.
            for (key, value) in variables {
                merged.insert(key.clone(), value.clone());
            }

            let (url, unresolved) = self.substitute(&route.pattern, &merged);
            return Some(UrlResolutionResult::resolved(
                url,
                ResolutionMethod::Dynamic,
                unresolved,
            ));
        }

        None
    }

    fn resolve_direct(&self, target: &str) -> Option<UrlResolutionResult> {
        if target.starts_with('/') {
            Some(UrlResolutionResult::resolved(
                target.to_string(),
                ResolutionMethod::Direct,
                Vec::new(),
            ))
        } else {
            None
        }
    }

    /// Substitute `{name}` placeholders: supplied value first, then the
    /// built-in default table, else the placeholder stays intact and the
    /// name is recorded as unresolved.
    fn substitute(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
    ) -> (String, Vec<String>) {
        let mut unresolved = Vec::new();
        let url = placeholder_re()
            .replace_all(template, |captures: &regex::Captures<'_>| {
                let name = &captures[1];
                if let Some(value) = variables.get(name) {
                    return value.clone();
                }
                if let Some(value) = self.builtin_default(name) {
                    return value.to_string();
                }
                if !unresolved.iter().any(|existing| existing == name) {
                    unresolved.push(name.to_string());
                }
                captures[0].to_string()
            })
            .into_owned();
        (url, unresolved)
    }

    fn builtin_default(&self, name: &str) -> Option<&str> {
        match name {
            "namespace" => self.default_namespace.as_deref(),
            _ => None,
        }
    }
}

/// Normalize an alias for workspace/shortcut lookup: lowercase, spaces and
/// underscores become dashes.
fn normalize_target(target: &str) -> String {
    target
        .trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}

/// Convert a `{var}` pattern into an anchored regex with one named capture
/// group per placeholder, matching one-or-more non-slash characters. Literal
/// segments are escaped; a pattern that still fails to compile is skipped
/// rather than aborting resolution.
fn pattern_regex(pattern: &str) -> Option<Regex> {
    let mut source = String::from("^");
    let mut last = 0;
    for captures in placeholder_re().captures_iter(pattern) {
        let whole = captures.get(0).expect("capture group 0 always present");
        source.push_str(&regex::escape(&pattern[last..whole.start()]));
        source.push_str(&format!("(?P<{}>[^/]+)", &captures[1]));
        last = whole.end();
    }
    source.push_str(&regex::escape(&pattern[last..]));
    source.push('$');
    Regex::new(&source).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DynamicRoute, StaticRoute};

    fn sitemap() -> UrlSitemap {
        let mut sitemap = UrlSitemap {
            version: "1.2.0".to_string(),
            tenant: "example-tenant".to_string(),
            ..UrlSitemap::default()
        };
        sitemap.static_routes.insert(
            "/web/home".to_string(),
            StaticRoute {
                title: Some("Home".to_string()),
                page_type: "dashboard".to_string(),
                workspace: None,
            },
        );
        sitemap.workspace_mapping.insert(
            "waap".to_string(),
            "/web/workspaces/web-app-and-api-protection".to_string(),
        );
        sitemap.workspace_mapping.insert(
            "dns-management".to_string(),
            "/web/workspaces/dns-management".to_string(),
        );
        sitemap.resource_shortcuts.insert(
            "http-lb".to_string(),
            "/web/namespaces/{namespace}/http_loadbalancers".to_string(),
        );
        sitemap.dynamic_routes.push(DynamicRoute {
            pattern: "/web/namespaces/{namespace}/http_loadbalancers".to_string(),
            description: Some("HTTP load balancer list".to_string()),
            variables: vec!["namespace".to_string()],
            example: Some("/web/namespaces/default/http_loadbalancers".to_string()),
        });
        sitemap.dynamic_routes.push(DynamicRoute {
            pattern: "/web/namespaces/{namespace}/http_loadbalancers/{name}".to_string(),
            description: Some("HTTP load balancer detail".to_string()),
            variables: vec!["namespace".to_string(), "name".to_string()],
            example: None,
        });
        sitemap
    }

    fn router() -> UrlRouter {
        UrlRouter::from_sitemap(sitemap(), None)
    }

    fn router_with_namespace(namespace: &str) -> UrlRouter {
        UrlRouter::from_sitemap(sitemap(), Some(namespace.to_string()))
    }

    #[test]
    fn static_route_is_exact_match() {
        let result = router().resolve("/web/home", &HashMap::new());
        assert!(result.found);
        assert_eq!(result.url.as_deref(), Some("/web/home"));
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Static));
        assert!(result.is_complete);
    }

    #[test]
    fn workspace_alias_resolves_exactly() {
        let result = router().resolve("waap", &HashMap::new());
        assert!(result.found);
        assert!(result
            .url
            .as_deref()
            .unwrap()
            .contains("web-app-and-api-protection"));
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Workspace));
    }

    #[test]
    fn workspace_lookup_normalizes_spaces_and_underscores() {
        let result = router().resolve("DNS Management", &HashMap::new());
        assert_eq!(result.url.as_deref(), Some("/web/workspaces/dns-management"));
        let result = router().resolve("dns_management", &HashMap::new());
        assert_eq!(result.url.as_deref(), Some("/web/workspaces/dns-management"));
    }

    #[test]
    fn workspace_fuzzy_matches_in_both_directions() {
        // Target is a substring of a mapped path.
        let result = router().resolve("dns", &HashMap::new());
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Workspace));
        assert_eq!(result.url.as_deref(), Some("/web/workspaces/dns-management"));

        // An alias is a substring of the target.
        let result = router().resolve("waap-console", &HashMap::new());
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Workspace));
        assert!(result.url.as_deref().unwrap().contains("web-app-and-api-protection"));
    }

    #[test]
    fn shortcut_substitutes_supplied_variables() {
        let mut vars = HashMap::new();
        vars.insert("namespace".to_string(), "prod".to_string());
        let result = router().resolve("http-lb", &vars);
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/prod/http_loadbalancers")
        );
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Shortcut));
        assert!(result.is_complete);
    }

    #[test]
    fn shortcut_uses_default_namespace_when_configured() {
        let result = router_with_namespace("system").resolve_shortcut("http-lb", &HashMap::new());
        assert!(result.is_complete);
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/system/http_loadbalancers")
        );
    }

    #[test]
    fn shortcut_without_namespace_reports_unresolved_variable() {
        let result = router().resolve_shortcut("http-lb", &HashMap::new());
        assert!(result.found);
        assert!(!result.is_complete);
        assert_eq!(result.unresolved_variables, vec!["namespace".to_string()]);
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/{namespace}/http_loadbalancers")
        );
    }

    #[test]
    fn dynamic_template_target_is_substituted_directly() {
        let mut vars = HashMap::new();
        vars.insert("namespace".to_string(), "prod".to_string());
        let result = router().resolve("/web/namespaces/{namespace}/http_loadbalancers", &vars);
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Dynamic));
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/prod/http_loadbalancers")
        );
    }

    #[test]
    fn dynamic_pattern_round_trip_re_extracts_variables() {
        let mut vars = HashMap::new();
        vars.insert("namespace".to_string(), "prod".to_string());
        let produced = router()
            .resolve("/web/namespaces/{namespace}/http_loadbalancers", &vars)
            .url
            .expect("substitution yields a url");

        // Re-matching the concrete URL against the same pattern re-extracts
        // the variable.
        let result = router().resolve(&produced, &HashMap::new());
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Dynamic));
        assert_eq!(result.url.as_deref(), Some(produced.as_str()));
        assert!(result.is_complete);
    }

    #[test]
    fn dynamic_matching_is_declaration_order_dependent() {
        let result = router().resolve("/web/namespaces/prod/http_loadbalancers/my-lb", &HashMap::new());
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Dynamic));
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/prod/http_loadbalancers/my-lb")
        );
    }

    #[test]
    fn explicit_variables_override_extracted_ones() {
        let mut vars = HashMap::new();
        vars.insert("namespace".to_string(), "staging".to_string());
        let result = router().resolve("/web/namespaces/prod/http_loadbalancers", &vars);
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/staging/http_loadbalancers")
        );
    }

    #[test]
    fn direct_path_always_succeeds() {
        let result = router().resolve("/some/unknown/path", &HashMap::new());
        assert!(result.found);
        assert_eq!(result.resolution_method, Some(ResolutionMethod::Direct));
        assert_eq!(result.url.as_deref(), Some("/some/unknown/path"));
        assert!(result.is_complete);
    }

    #[test]
    fn unresolvable_target_returns_structured_failure() {
        let result = router().resolve("zzz-nonexistent", &HashMap::new());
        assert!(!result.found);
        assert!(result.url.is_none());
        assert!(result.resolution_method.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("could not resolve navigation target 'zzz-nonexistent'")
        );
    }

    #[test]
    fn resolve_with_merges_namespace_and_resource_name() {
        let result = router().resolve_with(
            "/web/namespaces/{namespace}/http_loadbalancers/{name}",
            &HashMap::new(),
            Some("prod"),
            Some("my-lb"),
        );
        assert_eq!(
            result.url.as_deref(),
            Some("/web/namespaces/prod/http_loadbalancers/my-lb")
        );
        assert!(result.is_complete);
    }

    #[test]
    fn malformed_document_is_a_construction_error() {
        let err = UrlRouter::from_json("{ not json", None).expect_err("parse fails");
        assert!(matches!(err, RouterError::Parse { .. }));
    }

    #[test]
    fn with_config_requires_a_sitemap_path() {
        let err = UrlRouter::with_config(&NavigatorConfig::default()).expect_err("no path");
        assert!(matches!(err, RouterError::MissingPath));
    }

    #[test]
    fn missing_file_is_a_construction_error() {
        let err =
            UrlRouter::from_path("/nonexistent/url-sitemap.json", None).expect_err("io fails");
        assert!(matches!(err, RouterError::Io { .. }));
    }

    #[test]
    fn listings_are_deterministically_ordered() {
        let router = router();
        assert_eq!(router.list_workspaces(), vec!["dns-management", "waap"]);
        assert_eq!(router.list_shortcuts(), vec!["http-lb"]);
    }

    #[test]
    fn pattern_regex_escapes_literal_segments() {
        let regex = pattern_regex("/web/a.b/{name}").expect("compiles");
        assert!(regex.is_match("/web/a.b/x"));
        assert!(!regex.is_match("/web/aXb/x"));
    }
}
