//! Core data structures for the console resolution engine.
//!
//! These strongly-typed models provide a shared vocabulary for snapshot
//! elements, deterministic selectors, and the sitemap document the URL
//! router consumes.

pub mod element;
pub mod selector;
pub mod sitemap;

pub use element::ParsedElement;
pub use selector::{
    DeterministicSelector, ResolutionResult, SelectorChainResult, SelectorDefinition, SelectorType,
};
pub use sitemap::{DynamicRoute, ResolutionMethod, StaticRoute, UrlResolutionResult, UrlSitemap};
