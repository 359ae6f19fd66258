//! Accessibility-snapshot parsing and the read-only query surface over it.
//!
//! The snapshot is a line-oriented textual capture of a page's accessibility
//! tree produced by an external tool. Its grammar is a fixed interchange
//! contract: optional `- URL:` / `- Title:` header lines and element lines of
//! the form `[uid] role "name" prop1 prop2="value"`. Parsing is best-effort
//! by design; lines that do not match the grammar are dropped silently and
//! never abort the parse.
//!
//! A [`ParsedSnapshot`] represents one instant of page state. It is never
//! mutated after construction and must not be reused once the page changes;
//! staleness is a correctness hazard, not a concurrency one.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{DeterministicSelector, ParsedElement, SelectorType};

fn element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\[(?P<uid>\w+)\]\s+(?P<role>\w+)(?:\s+"(?P<name>[^"]*)")?(?P<rest>.*)$"#)
            .expect("element grammar regex is valid")
    })
}

fn property_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?P<key>href|value|placeholder|description)="(?P<value>[^"]*)""#)
            .expect("property pair regex is valid")
    })
}

fn any_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\w+="[^"]*""#).expect("pair stripping regex is valid"))
}

/// Parse raw snapshot text into a structured snapshot. Never fails;
/// unrecognized lines simply produce no element.
pub fn parse(raw: &str) -> ParsedSnapshot {
    let mut snapshot = ParsedSnapshot::default();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Header lines may appear before or interleaved with elements; the
        // first occurrence of each wins.
        let lowered = trimmed.to_lowercase();
        if let Some(rest) = header_value(&lowered, trimmed, "- url:") {
            if snapshot.page_url.is_none() {
                snapshot.page_url = Some(rest);
            }
            continue;
        }
        if let Some(rest) = header_value(&lowered, trimmed, "- title:") {
            if snapshot.page_title.is_none() {
                snapshot.page_title = Some(rest);
            }
            continue;
        }

        let Some(element) = parse_element_line(line, trimmed) else {
            continue;
        };

        if element.focused {
            snapshot.focused_uid = Some(element.uid.clone());
        }

        let index = snapshot.elements.len();
        // Duplicate uids overwrite the index entry (last write wins) while
        // both elements remain in the ordered list.
        snapshot.uid_index.insert(element.uid.clone(), index);
        snapshot
            .role_index
            .entry(element.role.clone())
            .or_default()
            .push(index);
        snapshot.elements.push(element);
    }

    snapshot
}

fn header_value(lowered: &str, original: &str, prefix: &str) -> Option<String> {
    if !lowered.starts_with(prefix) {
        return None;
    }
    Some(original[prefix.len()..].trim().to_string())
}

fn parse_element_line(line: &str, trimmed: &str) -> Option<ParsedElement> {
    let captures = element_re().captures(trimmed)?;

    let level = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .count()
        / 2;

    let rest = captures.name("rest").map(|m| m.as_str()).unwrap_or("");

    let mut element = ParsedElement {
        uid: captures["uid"].to_string(),
        role: captures["role"].to_string(),
        name: captures.name("name").map(|m| m.as_str().to_string()),
        level,
        source_line: line.to_string(),
        ..ParsedElement::default()
    };

    for pair in property_re().captures_iter(rest) {
        let value = pair["value"].to_string();
        match &pair["key"] {
            "href" => element.href = Some(value),
            "value" => element.value = Some(value),
            "placeholder" => element.placeholder = Some(value),
            "description" => element.description = Some(value),
            _ => {}
        }
    }

    // Keyword flags are bare tokens; strip key="value" pairs first so a
    // keyword inside a quoted value is not misread as a flag.
    let stripped = any_pair_re().replace_all(rest, " ");
    for token in stripped.split_whitespace() {
        match token {
            "focused" => element.focused = true,
            "disabled" => element.disabled = true,
            "expanded" => element.expanded = true,
            "selected" => element.selected = true,
            _ => {}
        }
    }

    Some(element)
}

/// Multi-criterion element filter with AND semantics. Absent criteria match
/// everything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementFilter {
    /// Exact role match.
    pub role: Option<String>,
    /// Exact, case-sensitive name match.
    pub name: Option<String>,
    /// Partial, case-insensitive name match.
    pub text: Option<String>,
    /// Partial, case-sensitive href match.
    pub href: Option<String>,
    /// Partial, case-insensitive placeholder match.
    pub placeholder: Option<String>,
}

impl ElementFilter {
    fn matches(&self, element: &ParsedElement) -> bool {
        if let Some(role) = &self.role {
            if element.role != *role {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if element.name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !contains_ci(element.name.as_deref(), text) {
                return false;
            }
        }
        if let Some(href) = &self.href {
            match element.href.as_deref() {
                Some(value) if value.contains(href.as_str()) => {}
                _ => return false,
            }
        }
        if let Some(placeholder) = &self.placeholder {
            if !contains_ci(element.placeholder.as_deref(), placeholder) {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    match haystack {
        Some(value) => value.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    }
}

/// Structured, immutable view of one accessibility snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSnapshot {
    elements: Vec<ParsedElement>,
    uid_index: HashMap<String, usize>,
    role_index: HashMap<String, Vec<usize>>,
    page_url: Option<String>,
    page_title: Option<String>,
    focused_uid: Option<String>,
}

impl ParsedSnapshot {
    /// All elements in encounter order.
    pub fn elements(&self) -> &[ParsedElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn page_title(&self) -> Option<&str> {
        self.page_title.as_deref()
    }

    pub fn focused_uid(&self) -> Option<&str> {
        self.focused_uid.as_deref()
    }

    /// Exact uid lookup.
    pub fn by_uid(&self, uid: &str) -> Option<&ParsedElement> {
        self.uid_index.get(uid).map(|&index| &self.elements[index])
    }

    /// All elements with the exact role, in encounter order.
    pub fn by_role(&self, role: &str) -> Vec<&ParsedElement> {
        self.role_index
            .get(role)
            .map(|indices| indices.iter().map(|&i| &self.elements[i]).collect())
            .unwrap_or_default()
    }

    /// Name lookup; defaults used by callers are partial + case-insensitive.
    pub fn by_text(&self, query: &str, partial: bool, case_insensitive: bool) -> Vec<&ParsedElement> {
        self.elements
            .iter()
            .filter(|element| match element.name.as_deref() {
                Some(name) => text_matches(name, query, partial, case_insensitive),
                None => false,
            })
            .collect()
    }

    /// Href lookup; partial (containment) by default.
    pub fn by_href(&self, query: &str, partial: bool) -> Vec<&ParsedElement> {
        self.elements
            .iter()
            .filter(|element| match element.href.as_deref() {
                Some(href) if partial => href.contains(query),
                Some(href) => href == query,
                None => false,
            })
            .collect()
    }

    /// Placeholder lookup.
    pub fn by_placeholder(
        &self,
        query: &str,
        partial: bool,
        case_insensitive: bool,
    ) -> Vec<&ParsedElement> {
        self.elements
            .iter()
            .filter(|element| match element.placeholder.as_deref() {
                Some(placeholder) => text_matches(placeholder, query, partial, case_insensitive),
                None => false,
            })
            .collect()
    }

    /// All elements matching every populated criterion.
    pub fn filter(&self, criteria: &ElementFilter) -> Vec<&ParsedElement> {
        self.elements
            .iter()
            .filter(|element| criteria.matches(element))
            .collect()
    }

    /// Route a [`DeterministicSelector`] to the lookup its type implies and
    /// return the first match in encounter order.
    ///
    /// `css` falls back to a partial case-insensitive text match: there is no
    /// selector-engine evaluation against the flat snapshot, an explicit
    /// simplification.
    pub fn find_by_selector(&self, selector: &DeterministicSelector) -> Option<&ParsedElement> {
        let value = selector.value.as_str();
        match selector.selector_type {
            SelectorType::Ref => self.by_uid(value),
            SelectorType::TextMatch | SelectorType::AriaLabel => self
                .elements
                .iter()
                .find(|element| element.name.as_deref() == Some(value)),
            SelectorType::HrefPath => self.elements.iter().find(|element| {
                element
                    .href
                    .as_deref()
                    .map(|href| href.contains(value))
                    .unwrap_or(false)
            }),
            SelectorType::Placeholder => self
                .elements
                .iter()
                .find(|element| element.placeholder.as_deref() == Some(value)),
            SelectorType::Css | SelectorType::Name => self
                .elements
                .iter()
                .find(|element| contains_ci(element.name.as_deref(), value)),
        }
    }

    /// Elements the automation host can act on.
    pub fn interactive_elements(&self) -> Vec<&ParsedElement> {
        self.elements
            .iter()
            .filter(|element| element.is_interactive())
            .collect()
    }

    /// Human-readable outline of the snapshot, one indented line per element.
    pub fn format_outline(&self) -> String {
        let mut result = String::new();
        for element in &self.elements {
            let indent = "  ".repeat(element.level);
            let name_part = element
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| format!(": {name}"))
                .unwrap_or_default();
            result.push_str(&format!(
                "{indent}[{}] {}{}\n",
                element.uid, element.role, name_part
            ));
        }
        result
    }
}

fn text_matches(haystack: &str, needle: &str, partial: bool, case_insensitive: bool) -> bool {
    if case_insensitive {
        let haystack = haystack.to_lowercase();
        let needle = needle.to_lowercase();
        if partial {
            haystack.contains(&needle)
        } else {
            haystack == needle
        }
    } else if partial {
        haystack.contains(needle)
    } else {
        haystack == needle
    }
}
