//! End-to-end tests over the full resolution pipeline: snapshot text in,
//! element uid out, and navigation target in, concrete URL out, using the
//! canonical sitemap fixture the crawl workflow produces.

use std::collections::HashMap;
use std::fs;
use std::io::Write;

use anyhow::Result;
use console_navigator::config::{NavigatorConfig, NavigatorConfigOverrides};
use console_navigator::routes::UrlRouter;
use console_navigator::selector::{ChainConfig, ChainExecutor};
use console_navigator::snapshot;
use console_navigator::types::{ResolutionMethod, SelectorDefinition, SelectorType};

const SITEMAP_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/url-sitemap.json");

const LB_LIST_SNAPSHOT: &str = r#"- URL: https://console.example.com/web/namespaces/prod/http_loadbalancers
- Title: HTTP Load Balancers
[1] main
  [2] heading "HTTP Load Balancers"
  [3] button "Add HTTP Load Balancer"
  [4] textbox "Search" placeholder="Search load balancers"
  [5] table
    [6] link "checkout-lb" href="/web/namespaces/prod/http_loadbalancers/checkout-lb"
    [7] link "payments-lb" href="/web/namespaces/prod/http_loadbalancers/payments-lb"
  [8] button "Refresh" disabled
"#;

fn router() -> Result<UrlRouter> {
    Ok(UrlRouter::from_path(SITEMAP_PATH, None)?)
}

fn router_with_namespace(namespace: &str) -> Result<UrlRouter> {
    Ok(UrlRouter::from_path(SITEMAP_PATH, Some(namespace.to_string()))?)
}

#[test]
fn snapshot_to_uid_pipeline() {
    let parsed = snapshot::parse(LB_LIST_SNAPSHOT);
    let executor = ChainExecutor::new(ChainConfig::default());

    // Crawl-time metadata resolves against a fresh snapshot even though the
    // old session ref is gone.
    let metadata = SelectorDefinition {
        text_match: Some("Add HTTP Load Balancer".to_string()),
        session_ref: Some("stale_ref_99".to_string()),
        ..SelectorDefinition::default()
    };

    let result = executor.resolve(&parsed, &metadata);
    assert!(result.found);
    assert_eq!(result.uid.as_deref(), Some("3"));
    assert_eq!(
        result.used_selector.as_ref().unwrap().selector_type,
        SelectorType::TextMatch
    );

    let mapped = result.to_resolution_result();
    assert!(mapped.success);
    assert_eq!(mapped.uid.as_deref(), Some("3"));
}

#[test]
fn stale_metadata_falls_back_to_session_ref() {
    let parsed = snapshot::parse(LB_LIST_SNAPSHOT);
    let executor = ChainExecutor::new(ChainConfig::default());

    let metadata = SelectorDefinition {
        text_match: Some("Create Load Balancer".to_string()),
        href_path: Some("/no/such/path".to_string()),
        session_ref: Some("8".to_string()),
        ..SelectorDefinition::default()
    };

    let result = executor.resolve(&parsed, &metadata);
    assert!(result.found);
    assert_eq!(result.uid.as_deref(), Some("8"));
    assert_eq!(result.confidence, 0.10);
    assert_eq!(result.tried_selectors.len(), 3);
}

#[test]
fn min_confidence_excludes_ref_fallback() {
    let parsed = snapshot::parse(LB_LIST_SNAPSHOT);
    let config = NavigatorConfig::default()
        .with_overrides(NavigatorConfigOverrides::default().min_confidence(0.5));
    let executor = ChainExecutor::new(ChainConfig::from(&config));

    let metadata = SelectorDefinition {
        text_match: Some("Create Load Balancer".to_string()),
        session_ref: Some("8".to_string()),
        ..SelectorDefinition::default()
    };

    let result = executor.resolve(&parsed, &metadata);
    assert!(!result.found);
    // The skipped ref selector is not recorded as tried.
    assert_eq!(result.tried_selectors.len(), 1);
    assert_eq!(
        result.tried_selectors[0].selector_type,
        SelectorType::TextMatch
    );
}

#[test]
fn workspace_alias_resolves_against_canonical_sitemap() -> Result<()> {
    let result = router()?.resolve("waap", &HashMap::new());
    assert!(result.found);
    assert!(result
        .url
        .as_deref()
        .unwrap()
        .contains("web-app-and-api-protection"));
    assert_eq!(result.resolution_method, Some(ResolutionMethod::Workspace));
    Ok(())
}

#[test]
fn static_route_takes_precedence_over_later_methods() -> Result<()> {
    let result = router()?.resolve(
        "/web/workspaces/web-app-and-api-protection/overview/dashboard",
        &HashMap::new(),
    );
    assert_eq!(result.resolution_method, Some(ResolutionMethod::Static));
    Ok(())
}

#[test]
fn shortcut_completeness_depends_on_default_namespace() -> Result<()> {
    let with_default = router_with_namespace("system")?;
    let result = with_default.resolve_shortcut("http-lb", &HashMap::new());
    assert!(result.is_complete);
    assert_eq!(
        result.url.as_deref(),
        Some("/web/namespaces/system/http_loadbalancers")
    );

    let without_default = router()?;
    let result = without_default.resolve_shortcut("http-lb", &HashMap::new());
    assert!(!result.is_complete);
    assert_eq!(result.unresolved_variables, vec!["namespace".to_string()]);
    Ok(())
}

#[test]
fn dynamic_round_trip_re_extracts_namespace() -> Result<()> {
    let router = router()?;
    let mut vars = HashMap::new();
    vars.insert("namespace".to_string(), "prod".to_string());

    let produced = router
        .resolve("/web/namespaces/{namespace}/http_loadbalancers", &vars)
        .url
        .expect("template substitution succeeds");
    assert_eq!(produced, "/web/namespaces/prod/http_loadbalancers");

    let re_resolved = router.resolve(&produced, &HashMap::new());
    assert_eq!(re_resolved.resolution_method, Some(ResolutionMethod::Dynamic));
    assert_eq!(re_resolved.url.as_deref(), Some(produced.as_str()));
    assert!(re_resolved.is_complete);
    Ok(())
}

#[test]
fn resource_detail_resolution_with_convenience_parameters() -> Result<()> {
    let result = router()?.resolve_with(
        "/web/namespaces/{namespace}/app_firewalls/{name}",
        &HashMap::new(),
        Some("prod"),
        Some("default-waf"),
    );
    assert!(result.is_complete);
    assert_eq!(
        result.url.as_deref(),
        Some("/web/namespaces/prod/app_firewalls/default-waf")
    );
    Ok(())
}

#[test]
fn snapshot_link_href_feeds_route_resolution() -> Result<()> {
    // A navigation step often starts from an href found in the snapshot.
    let parsed = snapshot::parse(LB_LIST_SNAPSHOT);
    let executor = ChainExecutor::new(ChainConfig::default());

    let link = executor.find_link(&parsed, "checkout-lb");
    assert!(link.found);
    let href = link.element.as_ref().unwrap().href.clone().unwrap();

    let result = router()?.resolve(&href, &HashMap::new());
    assert_eq!(result.resolution_method, Some(ResolutionMethod::Dynamic));
    assert_eq!(result.url.as_deref(), Some(href.as_str()));
    Ok(())
}

#[test]
fn reload_picks_up_rewritten_document() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(fs::read_to_string(SITEMAP_PATH)?.as_bytes())?;
    file.flush()?;

    let mut router = UrlRouter::from_path(file.path(), None)?;
    assert!(router.resolve("waap", &HashMap::new()).found);

    // External updater rewrites the document; in-memory state is unchanged
    // until the explicit reload.
    let minimal = r#"{"version": "2.0.0", "workspace_mapping": {"billing": "/web/billing"}}"#;
    fs::write(file.path(), minimal)?;
    assert!(router.resolve("waap", &HashMap::new()).found);

    router.reload(file.path())?;
    assert!(!router.resolve("waap", &HashMap::new()).found);
    let billing = router.resolve("billing", &HashMap::new());
    assert_eq!(billing.url.as_deref(), Some("/web/billing"));
    Ok(())
}

#[test]
fn sitemap_document_shape_is_tolerated_loosely() -> Result<()> {
    // Unknown top-level keys and missing sections must not break loading;
    // shape validation belongs to the consuming registry.
    let raw = r#"{"version": "0.1", "unknown_key": [1, 2, 3]}"#;
    let router = UrlRouter::from_json(raw, None)?;
    let result = router.resolve("anything", &HashMap::new());
    assert!(!result.found);
    Ok(())
}
