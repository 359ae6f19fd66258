//! Metrics helpers for the resolution engine.
//!
//! Aggregated counters across the three resolution surfaces alongside
//! lightweight timing helpers. Everything here is diagnostic; no resolution
//! decision reads these values.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::{ResolutionMethod, SelectorChainResult, UrlResolutionResult};

/// Aggregated counters for parsing, selector, and route resolution calls.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigatorMetrics {
    pub snapshots_parsed: u64,
    pub elements_parsed: u64,
    pub parse_time_ms: u64,

    pub chains_executed: u64,
    pub chain_hits: u64,
    pub chain_misses: u64,
    pub selectors_tried: u64,
    pub chain_time_ms: u64,

    pub routes_resolved: u64,
    pub route_failures: u64,
    pub static_hits: u64,
    pub workspace_hits: u64,
    pub shortcut_hits: u64,
    pub dynamic_hits: u64,
    pub direct_hits: u64,
    pub route_time_ms: u64,
}

impl NavigatorMetrics {
    /// Record one snapshot parse.
    pub fn record_parse(&mut self, element_count: usize, elapsed_ms: u64) {
        self.snapshots_parsed += 1;
        self.elements_parsed += element_count as u64;
        self.parse_time_ms += elapsed_ms;
    }

    /// Record one selector chain execution.
    pub fn record_chain(&mut self, result: &SelectorChainResult, elapsed_ms: u64) {
        self.chains_executed += 1;
        self.selectors_tried += result.tried_selectors.len() as u64;
        if result.found {
            self.chain_hits += 1;
        } else {
            self.chain_misses += 1;
        }
        self.chain_time_ms += elapsed_ms;
    }

    /// Record one URL resolution, bumping the per-method counter on success.
    pub fn record_route(&mut self, result: &UrlResolutionResult, elapsed_ms: u64) {
        self.routes_resolved += 1;
        match result.resolution_method {
            Some(ResolutionMethod::Static) => self.static_hits += 1,
            Some(ResolutionMethod::Workspace) => self.workspace_hits += 1,
            Some(ResolutionMethod::Shortcut) => self.shortcut_hits += 1,
            Some(ResolutionMethod::Dynamic) => self.dynamic_hits += 1,
            Some(ResolutionMethod::Direct) => self.direct_hits += 1,
            None => self.route_failures += 1,
        }
        self.route_time_ms += elapsed_ms;
    }

    /// Merge the values from another metrics instance into this one.
    pub fn merge(&mut self, other: &NavigatorMetrics) {
        self.snapshots_parsed += other.snapshots_parsed;
        self.elements_parsed += other.elements_parsed;
        self.parse_time_ms += other.parse_time_ms;

        self.chains_executed += other.chains_executed;
        self.chain_hits += other.chain_hits;
        self.chain_misses += other.chain_misses;
        self.selectors_tried += other.selectors_tried;
        self.chain_time_ms += other.chain_time_ms;

        self.routes_resolved += other.routes_resolved;
        self.route_failures += other.route_failures;
        self.static_hits += other.static_hits;
        self.workspace_hits += other.workspace_hits;
        self.shortcut_hits += other.shortcut_hits;
        self.dynamic_hits += other.dynamic_hits;
        self.direct_hits += other.direct_hits;
        self.route_time_ms += other.route_time_ms;
    }
}

/// Start a resolution timer using [`Instant::now`].
pub fn start_timer() -> Instant {
    Instant::now()
}

/// Return the elapsed milliseconds since the provided start instant.
pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Helper for tests to convert milliseconds to [`Duration`].
pub fn duration_from_millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
