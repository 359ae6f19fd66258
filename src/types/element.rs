use serde::{Deserialize, Serialize};

/// One element recovered from an accessibility-tree snapshot line.
///
/// Elements are immutable once the parser has built them; the `source_line`
/// field carries the raw input line for diagnostics only and plays no part in
/// any lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedElement {
    /// Session-scoped identifier assigned by the snapshot tool. Word
    /// characters only; stable for the lifetime of one snapshot and no
    /// longer.
    pub uid: String,
    /// Accessibility role tag, e.g. `button` or `textbox`.
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub selected: bool,
    /// Nesting depth derived from the line's leading indentation.
    pub level: usize,
    /// Raw snapshot line this element was parsed from.
    pub source_line: String,
}

impl ParsedElement {
    /// Roles the automation host can meaningfully click, fill, or toggle.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.role.as_str(),
            "button"
                | "link"
                | "textbox"
                | "searchbox"
                | "combobox"
                | "checkbox"
                | "radio"
                | "switch"
                | "menuitem"
                | "tab"
                | "option"
                | "slider"
        )
    }
}
