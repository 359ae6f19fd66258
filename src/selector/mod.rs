//! Deterministic selector chains: building a priority-ordered list of
//! candidate lookups from element metadata and executing them against a
//! parsed snapshot until one resolves.
//!
//! The executor never fails: "not found" is a structured result carrying the
//! full list of attempted selectors, never an error or a panic. Confidence
//! values and the priority order come from injected configuration rather
//! than module constants so alternate policies are testable in isolation.

use serde_json::json;

use crate::config::{ConfidenceTable, NavigatorConfig};
use crate::logging::NavigatorLogger;
use crate::snapshot::ParsedSnapshot;
use crate::types::{
    DeterministicSelector, ParsedElement, SelectorChainResult, SelectorDefinition, SelectorType,
};

/// Configuration slice consumed by the chain executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    pub confidence: ConfidenceTable,
    /// Priority order for chain building. `Ref` is always appended last
    /// regardless of whether (or where) this list mentions it.
    pub priority: Vec<SelectorType>,
    /// Selectors below this confidence are skipped without being recorded
    /// as tried.
    pub min_confidence: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceTable::default(),
            priority: SelectorType::DEFAULT_PRIORITY.to_vec(),
            min_confidence: 0.0,
        }
    }
}

impl From<&NavigatorConfig> for ChainConfig {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            confidence: config.confidence.clone(),
            priority: config.priority.clone(),
            min_confidence: config.min_confidence,
        }
    }
}

/// Builds and executes selector chains against parsed snapshots.
#[derive(Debug, Default)]
pub struct ChainExecutor {
    config: ChainConfig,
    logger: Option<NavigatorLogger>,
}

impl ChainExecutor {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: NavigatorLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Build the priority-ordered chain of candidate selectors for one
    /// element's metadata. Only populated metadata fields contribute; the
    /// session reference, when present, is appended last unconditionally
    /// because it is the least stable strategy.
    pub fn build_chain(&self, metadata: &SelectorDefinition) -> Vec<DeterministicSelector> {
        let mut chain = Vec::new();

        for &selector_type in &self.config.priority {
            let value = match selector_type {
                SelectorType::Name => metadata.data_testid.as_deref(),
                SelectorType::AriaLabel => metadata.aria_label.as_deref(),
                SelectorType::HrefPath => metadata.href_path.as_deref(),
                SelectorType::TextMatch => metadata.text_match.as_deref(),
                SelectorType::Placeholder => metadata.placeholder.as_deref(),
                SelectorType::Css => metadata.css.as_deref(),
                // Handled after the priority loop.
                SelectorType::Ref => None,
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                chain.push(DeterministicSelector::new(
                    selector_type,
                    value,
                    self.config.confidence.get(selector_type),
                ));
            }
        }

        if let Some(session_ref) = metadata.session_ref.as_deref().filter(|v| !v.is_empty()) {
            chain.push(DeterministicSelector::new(
                SelectorType::Ref,
                session_ref,
                self.config.confidence.get(SelectorType::Ref),
            ));
        }

        chain
    }

    /// Execute a chain in order, returning on the first selector that
    /// resolves to an element.
    pub fn execute_chain(
        &self,
        snapshot: &ParsedSnapshot,
        chain: &[DeterministicSelector],
    ) -> SelectorChainResult {
        let mut tried = Vec::new();

        for selector in chain {
            if selector.confidence < self.config.min_confidence {
                continue;
            }
            tried.push(selector.clone());

            if let Some(element) = snapshot.find_by_selector(selector) {
                if let Some(logger) = &self.logger {
                    logger.debug(
                        format!(
                            "resolved element {} via {}",
                            element.uid,
                            selector.selector_type.as_str()
                        ),
                        Some("selector"),
                        Some(json!({ "attempts": tried.len() })),
                    );
                }
                return hit(element, selector.clone(), tried);
            }
        }

        let error = format!("no element found after trying {} selectors", tried.len());
        if let Some(logger) = &self.logger {
            logger.debug(error.clone(), Some("selector"), None);
        }
        SelectorChainResult::not_found(tried, error)
    }

    /// Build the chain for `metadata` and execute it in one call.
    pub fn resolve(
        &self,
        snapshot: &ParsedSnapshot,
        metadata: &SelectorDefinition,
    ) -> SelectorChainResult {
        let chain = self.build_chain(metadata);
        self.execute_chain(snapshot, &chain)
    }

    /// Locate an element by visible text, optionally constrained to a role.
    pub fn find_by_text(
        &self,
        snapshot: &ParsedSnapshot,
        text: &str,
        role: Option<&str>,
        exact: bool,
    ) -> SelectorChainResult {
        let selector = self.selector(SelectorType::TextMatch, text);
        let candidates = snapshot.by_text(text, !exact, !exact);
        let matched = candidates
            .into_iter()
            .find(|element| role.map(|r| element.role == r).unwrap_or(true));
        self.single_step(matched, selector)
    }

    /// Locate an element by accessible label, optionally constrained to a
    /// role. Reads the same underlying name field as text matching; the two
    /// strategies stay separate so their confidences differ.
    pub fn find_by_aria_label(
        &self,
        snapshot: &ParsedSnapshot,
        label: &str,
        role: Option<&str>,
    ) -> SelectorChainResult {
        let selector = self.selector(SelectorType::AriaLabel, label);
        let matched = snapshot
            .elements()
            .iter()
            .filter(|element| element.name.as_deref() == Some(label))
            .find(|element| role.map(|r| element.role == r).unwrap_or(true));
        self.single_step(matched, selector)
    }

    /// Locate an element by href, partial containment unless `exact`.
    pub fn find_by_href(
        &self,
        snapshot: &ParsedSnapshot,
        href: &str,
        exact: bool,
    ) -> SelectorChainResult {
        let selector = self.selector(SelectorType::HrefPath, href);
        let matched = snapshot.by_href(href, !exact).into_iter().next();
        self.single_step(matched, selector)
    }

    /// Locate a button by its visible text, falling back to an exact label
    /// match among buttons.
    pub fn find_button(&self, snapshot: &ParsedSnapshot, text: &str) -> SelectorChainResult {
        let mut result = self.find_by_text(snapshot, text, Some("button"), false);
        if result.found {
            return result;
        }
        let mut tried = std::mem::take(&mut result.tried_selectors);

        let fallback = self.selector(SelectorType::AriaLabel, text);
        tried.push(fallback.clone());
        let matched = snapshot
            .by_role("button")
            .into_iter()
            .find(|element| element.name.as_deref() == Some(text));
        self.finish(matched, fallback, tried)
    }

    /// Locate a link: href containment first, then link text.
    pub fn find_link(&self, snapshot: &ParsedSnapshot, target: &str) -> SelectorChainResult {
        let mut result = self.find_by_href(snapshot, target, false);
        if result.found {
            return result;
        }
        let mut tried = std::mem::take(&mut result.tried_selectors);

        let fallback = self.selector(SelectorType::TextMatch, target);
        tried.push(fallback.clone());
        let matched = snapshot
            .by_text(target, true, true)
            .into_iter()
            .find(|element| element.role == "link");
        self.finish(matched, fallback, tried)
    }

    /// Locate a text input: placeholder first, then label, then loose name
    /// matching among textbox-like roles.
    pub fn find_textbox(&self, snapshot: &ParsedSnapshot, hint: &str) -> SelectorChainResult {
        let mut tried = Vec::new();

        let placeholder = self.selector(SelectorType::Placeholder, hint);
        tried.push(placeholder.clone());
        if let Some(element) = snapshot.by_placeholder(hint, true, true).into_iter().next() {
            return hit(element, placeholder, tried);
        }

        let label = self.selector(SelectorType::AriaLabel, hint);
        tried.push(label.clone());
        if let Some(element) = textbox_candidates(snapshot)
            .find(|element| element.name.as_deref() == Some(hint))
        {
            return hit(element, label, tried);
        }

        let name = self.selector(SelectorType::Name, hint);
        tried.push(name.clone());
        let hint_lower = hint.to_lowercase();
        let matched = textbox_candidates(snapshot).find(|element| {
            element
                .name
                .as_deref()
                .map(|n| n.to_lowercase().contains(&hint_lower))
                .unwrap_or(false)
        });
        self.finish(matched, name, tried)
    }

    fn selector(&self, selector_type: SelectorType, value: &str) -> DeterministicSelector {
        DeterministicSelector::new(
            selector_type,
            value,
            self.config.confidence.get(selector_type),
        )
    }

    fn single_step(
        &self,
        matched: Option<&ParsedElement>,
        selector: DeterministicSelector,
    ) -> SelectorChainResult {
        let tried = vec![selector.clone()];
        self.finish(matched, selector, tried)
    }

    fn finish(
        &self,
        matched: Option<&ParsedElement>,
        selector: DeterministicSelector,
        tried: Vec<DeterministicSelector>,
    ) -> SelectorChainResult {
        match matched {
            Some(element) => hit(element, selector, tried),
            None => {
                let error = format!("no element found after trying {} selectors", tried.len());
                SelectorChainResult::not_found(tried, error)
            }
        }
    }
}

fn textbox_candidates<'snapshot>(
    snapshot: &'snapshot ParsedSnapshot,
) -> impl Iterator<Item = &'snapshot ParsedElement> {
    snapshot
        .elements()
        .iter()
        .filter(|element| matches!(element.role.as_str(), "textbox" | "searchbox" | "combobox"))
}

fn hit(
    element: &ParsedElement,
    selector: DeterministicSelector,
    tried: Vec<DeterministicSelector>,
) -> SelectorChainResult {
    SelectorChainResult {
        found: true,
        uid: Some(element.uid.clone()),
        element: Some(element.clone()),
        confidence: selector.confidence,
        used_selector: Some(selector),
        tried_selectors: tried,
        error: None,
    }
}
