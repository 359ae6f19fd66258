//! Strongly-typed configuration for the console resolution engine.
//!
//! The confidence table, selector priority order, and default namespace were
//! module-level constants and singleton accessors in the original tooling;
//! here they are explicit configuration injected at construction so alternate
//! policies are testable without touching shared state. Values can be built
//! from defaults, loaded from environment variables (with optional `.env`
//! support), or merged with explicit overrides.

use std::env;
use std::num::ParseFloatError;
use std::path::PathBuf;

use dotenvy::dotenv;
use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde::ser::{Serialize, Serializer};
use serde::{Deserialize as DeriveDeserialize, Serialize as DeriveSerialize};
use thiserror::Error;

use crate::types::SelectorType;

/// Verbosity level for navigator logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Minimal,
    Medium,
    Detailed,
}

impl Verbosity {
    pub fn as_u8(self) -> u8 {
        match self {
            Verbosity::Minimal => 0,
            Verbosity::Medium => 1,
            Verbosity::Detailed => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Verbosity::Minimal),
            1 => Some(Verbosity::Medium),
            2 => Some(Verbosity::Detailed),
            _ => None,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Medium
    }
}

impl Serialize for Verbosity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Verbosity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Verbosity::from_u8(value).ok_or_else(|| {
            DeError::custom(format!(
                "invalid verbosity value {value}; expected 0, 1, or 2"
            ))
        })
    }
}

/// Fixed per-type confidence values attached to chain candidates.
///
/// Confidence expresses how stable a strategy is across page re-renders, not
/// match quality; it is constant per type, never per instance.
#[derive(Debug, Clone, DeriveSerialize, DeriveDeserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceTable {
    pub name: f64,
    pub aria_label: f64,
    pub href_path: f64,
    pub text_match: f64,
    pub placeholder: f64,
    pub css: f64,
    #[serde(rename = "ref")]
    pub reference: f64,
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            name: 0.95,
            aria_label: 0.90,
            href_path: 0.85,
            text_match: 0.75,
            placeholder: 0.70,
            css: 0.50,
            reference: 0.10,
        }
    }
}

impl ConfidenceTable {
    pub fn get(&self, selector_type: SelectorType) -> f64 {
        match selector_type {
            SelectorType::Name => self.name,
            SelectorType::AriaLabel => self.aria_label,
            SelectorType::HrefPath => self.href_path,
            SelectorType::TextMatch => self.text_match,
            SelectorType::Placeholder => self.placeholder,
            SelectorType::Css => self.css,
            SelectorType::Ref => self.reference,
        }
    }
}

/// Configuration values for the resolution engine.
#[derive(Debug, Clone, DeriveSerialize, DeriveDeserialize, PartialEq)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Per-type confidence values used when building chains.
    pub confidence: ConfidenceTable,
    /// Selector priority order. Callers may reorder strategies; `ref` is
    /// appended last during chain building regardless of this list.
    pub priority: Vec<SelectorType>,
    /// Selectors below this confidence are skipped without being recorded.
    pub min_confidence: f64,
    /// Substituted for `{namespace}` when the caller supplies no value.
    pub default_namespace: Option<String>,
    /// Sitemap document consumed by [`crate::routes::UrlRouter`].
    pub sitemap_path: Option<PathBuf>,
    pub verbose: Verbosity,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidenceTable::default(),
            priority: SelectorType::DEFAULT_PRIORITY.to_vec(),
            min_confidence: 0.0,
            default_namespace: None,
            sitemap_path: None,
            verbose: Verbosity::default(),
        }
    }
}

impl NavigatorConfig {
    /// Construct a configuration by reading relevant environment variables,
    /// after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, NavigatorConfigError> {
        let _ = dotenv();
        let mut config = NavigatorConfig::default();

        if let Some(value) = env_var("CONSOLE_NAV_DEFAULT_NAMESPACE") {
            config.default_namespace = Some(value);
        }

        if let Some(value) = env_var("CONSOLE_NAV_SITEMAP") {
            config.sitemap_path = Some(PathBuf::from(value));
        }

        if let Some(value) = env_var("CONSOLE_NAV_MIN_CONFIDENCE") {
            config.min_confidence = parse_f64("CONSOLE_NAV_MIN_CONFIDENCE", &value)?;
        }

        if let Some(value) = env_var("CONSOLE_NAV_VERBOSE") {
            let parsed: u8 = value.trim().parse().map_err(|_| {
                NavigatorConfigError::invalid_enum("CONSOLE_NAV_VERBOSE", value.clone())
            })?;
            config.verbose = Verbosity::from_u8(parsed).ok_or_else(|| {
                NavigatorConfigError::invalid_enum("CONSOLE_NAV_VERBOSE", parsed.to_string())
            })?;
        }

        if let Some(value) = env_var("CONSOLE_NAV_PRIORITY") {
            config.priority = parse_priority("CONSOLE_NAV_PRIORITY", &value)?;
        }

        Ok(config)
    }

    /// Create a new configuration with explicit field overrides applied.
    pub fn with_overrides(&self, overrides: NavigatorConfigOverrides) -> NavigatorConfig {
        let mut next = self.clone();

        if let Some(value) = overrides.confidence {
            next.confidence = value;
        }
        if let Some(value) = overrides.priority {
            next.priority = value;
        }
        if let Some(value) = overrides.min_confidence {
            next.min_confidence = value;
        }
        if let Some(value) = overrides.default_namespace {
            next.default_namespace = value;
        }
        if let Some(value) = overrides.sitemap_path {
            next.sitemap_path = value;
        }
        if let Some(value) = overrides.verbose {
            next.verbose = value;
        }

        next
    }
}

/// Field-level overrides for [`NavigatorConfig::with_overrides`].
#[derive(Debug, Default, Clone)]
pub struct NavigatorConfigOverrides {
    pub confidence: Option<ConfidenceTable>,
    pub priority: Option<Vec<SelectorType>>,
    pub min_confidence: Option<f64>,
    pub default_namespace: Option<Option<String>>,
    pub sitemap_path: Option<Option<PathBuf>>,
    pub verbose: Option<Verbosity>,
}

impl NavigatorConfigOverrides {
    /// Builder-style helper to set the `priority` override.
    pub fn priority(mut self, priority: Vec<SelectorType>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Builder-style helper to set the `default_namespace` override.
    pub fn default_namespace<T: Into<Option<String>>>(mut self, namespace: T) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    /// Builder-style helper to set the `min_confidence` override.
    pub fn min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }
}

/// Errors that can arise while constructing a [`NavigatorConfig`].
#[derive(Debug, Error)]
pub enum NavigatorConfigError {
    #[error("invalid value '{value}' for {field}")]
    InvalidEnumVariant { field: &'static str, value: String },
    #[error("invalid number '{value}' for {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("unknown selector type '{value}' in {field}")]
    UnknownSelectorType { field: &'static str, value: String },
}

impl NavigatorConfigError {
    fn invalid_enum(field: &'static str, value: String) -> Self {
        NavigatorConfigError::InvalidEnumVariant { field, value }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_f64(field: &'static str, value: &str) -> Result<f64, NavigatorConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| NavigatorConfigError::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

fn parse_priority(
    field: &'static str,
    value: &str,
) -> Result<Vec<SelectorType>, NavigatorConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            SelectorType::parse(token).ok_or_else(|| NavigatorConfigError::UnknownSelectorType {
                field,
                value: token.to_string(),
            })
        })
        .collect()
}
