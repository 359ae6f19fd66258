//! Deterministic resolution core for web console automation.
//!
//! This crate turns the unstable parts of console automation into
//! reproducible lookups for an external automation host: it parses textual
//! accessibility-tree snapshots into structured elements, resolves element
//! metadata to a concrete uid through a prioritized selector chain, and
//! resolves logical navigation targets (workspace aliases, resource
//! shortcuts, templated paths) to concrete URLs from a declarative sitemap
//! document. The host performs the actual clicks and navigation; this core
//! only decides *what* to click and *where* to go.
//!
//! All resolution is synchronous, rule-based, and stateless per call. The
//! only fatal condition anywhere in the crate is failing to load the sitemap
//! document at router construction; element and route misses are structured
//! results, never errors.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod routes;
pub mod selector;
pub mod snapshot;
pub mod types;

pub use config::{ConfidenceTable, NavigatorConfig, NavigatorConfigOverrides, Verbosity};
pub use logging::NavigatorLogger;
pub use metrics::NavigatorMetrics;
pub use routes::{RouterError, UrlRouter};
pub use selector::{ChainConfig, ChainExecutor};
pub use snapshot::{ElementFilter, ParsedSnapshot};
pub use types::{
    DeterministicSelector, ParsedElement, ResolutionMethod, ResolutionResult, SelectorChainResult,
    SelectorDefinition, SelectorType, UrlResolutionResult, UrlSitemap,
};
