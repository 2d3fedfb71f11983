//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route rules and the public path set at startup
//! - Look up the matching rule for a request path
//! - Compute the forward path and the public/protected classification
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins, measured in whole segments
//! - Ties broken by declaration order (stable sort), so double
//!   registration of a prefix stays deterministic
//! - Explicit NoRoute (None) rather than silent default

use crate::config::schema::{PublicMatchMode, PublicPathConfig, RouteConfig, TimeoutClass};
use crate::routing::matcher::{
    is_segment_prefix, normalize_path, segments, strip_leading_segments,
};

/// A route rule compiled for segment matching.
#[derive(Debug, Clone)]
struct CompiledRule {
    /// Original prefix, kept for logging.
    prefix: String,
    prefix_segments: Vec<String>,
    strip_segments: Vec<String>,
    service: String,
    timeout_class: TimeoutClass,
}

/// Result of a successful route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// Logical service the request is routed to.
    pub service: &'a str,

    /// Path the backend will see.
    pub forward_path: String,

    /// Whether the path is exempt from authentication.
    pub is_public: bool,

    /// Timeout class of the matched rule.
    pub timeout_class: TimeoutClass,
}

/// Paths exempt from authentication.
///
/// Exemption is explicit: exact entries must equal the normalized path,
/// prefix entries must cover a leading segment run. There is no fuzzy
/// matching and no global bypass flag.
#[derive(Debug, Default)]
pub struct PublicPathSet {
    exact: Vec<String>,
    prefixes: Vec<Vec<String>>,
}

impl PublicPathSet {
    /// Compile the set from configuration entries.
    pub fn from_config(entries: &[PublicPathConfig]) -> Self {
        let mut exact = Vec::new();
        let mut prefixes = Vec::new();
        for entry in entries {
            let normalized = normalize_path(&entry.path);
            match entry.mode {
                PublicMatchMode::Exact => exact.push(normalized),
                PublicMatchMode::Prefix => {
                    prefixes.push(segments(&normalized).iter().map(|s| s.to_string()).collect())
                }
            }
        }
        Self { exact, prefixes }
    }

    /// Check whether a normalized path is public.
    pub fn contains(&self, normalized: &str) -> bool {
        if self.exact.iter().any(|p| p == normalized) {
            return true;
        }
        let segs = segments(normalized);
        self.prefixes.iter().any(|p| is_segment_prefix(p, &segs))
    }
}

/// Compiled route table, immutable after startup.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Rules ordered longest prefix first; declaration order within ties.
    rules: Vec<CompiledRule>,
    public: PublicPathSet,
}

impl RouteTable {
    /// Compile routes and public paths from configuration.
    pub fn from_config(routes: &[RouteConfig], public_paths: &[PublicPathConfig]) -> Self {
        let mut rules: Vec<CompiledRule> = routes
            .iter()
            .map(|route| {
                let prefix_norm = normalize_path(&route.prefix);
                let strip_norm = route.strip_prefix.as_deref().map(normalize_path);
                CompiledRule {
                    prefix: route.prefix.clone(),
                    prefix_segments: segments(&prefix_norm)
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    strip_segments: strip_norm
                        .as_deref()
                        .map(|p| segments(p).iter().map(|s| s.to_string()).collect())
                        .unwrap_or_default(),
                    service: route.service.clone(),
                    timeout_class: route.timeout_class,
                }
            })
            .collect();

        // Stable sort keeps declaration order for equal-length prefixes.
        rules.sort_by(|a, b| b.prefix_segments.len().cmp(&a.prefix_segments.len()));

        Self {
            rules,
            public: PublicPathSet::from_config(public_paths),
        }
    }

    /// Look up the rule for a raw request path.
    ///
    /// Returns None when no rule matches. That is an expected outcome
    /// for unregistered paths, not a fault.
    pub fn match_path(&self, raw_path: &str) -> Option<RouteMatch<'_>> {
        let normalized = normalize_path(raw_path);
        let segs = segments(&normalized);

        let rule = self
            .rules
            .iter()
            .find(|rule| is_segment_prefix(&rule.prefix_segments, &segs))?;

        let forward_path = strip_leading_segments(&normalized, &rule.strip_segments);
        let is_public = self.public.contains(&normalized);

        tracing::trace!(
            prefix = %rule.prefix,
            service = %rule.service,
            forward_path = %forward_path,
            is_public,
            "route matched"
        );

        Some(RouteMatch {
            service: &rule.service,
            forward_path,
            is_public,
            timeout_class: rule.timeout_class,
        })
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PublicMatchMode;

    fn route(prefix: &str, service: &str, strip: Option<&str>) -> RouteConfig {
        RouteConfig {
            prefix: prefix.into(),
            service: service.into(),
            strip_prefix: strip.map(Into::into),
            timeout_class: TimeoutClass::Standard,
        }
    }

    fn public(path: &str, mode: PublicMatchMode) -> PublicPathConfig {
        PublicPathConfig {
            path: path.into(),
            mode,
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::from_config(
            &[
                route("/api", "frontdoor", None),
                route("/api/normcontrol2", "normcontrol2", Some("/api")),
            ],
            &[],
        );

        let m = table.match_path("/api/normcontrol2/status").unwrap();
        assert_eq!(m.service, "normcontrol2");

        let m = table.match_path("/api/other").unwrap();
        assert_eq!(m.service, "frontdoor");
    }

    #[test]
    fn ties_resolved_by_declaration_order() {
        // the same prefix registered twice must stay deterministic
        let table = RouteTable::from_config(
            &[
                route("/api/calc", "calc-v1", None),
                route("/api/calc", "calc-v2", None),
            ],
            &[],
        );
        let m = table.match_path("/api/calc/run").unwrap();
        assert_eq!(m.service, "calc-v1");
    }

    #[test]
    fn forward_path_strips_structurally() {
        let table = RouteTable::from_config(
            &[route("/api/normcontrol2", "normcontrol2", Some("/api"))],
            &[],
        );
        let m = table.match_path("/api/normcontrol2/status").unwrap();
        assert_eq!(m.forward_path, "/normcontrol2/status");

        // a recurring prefix token deeper in the path is preserved
        let m = table.match_path("/api/normcontrol2/api/reports").unwrap();
        assert_eq!(m.forward_path, "/normcontrol2/api/reports");
    }

    #[test]
    fn no_route_for_unregistered_path() {
        let table = RouteTable::from_config(&[route("/api/docparser", "docparser", None)], &[]);
        assert!(table.match_path("/metrics").is_none());
    }

    #[test]
    fn match_is_idempotent() {
        let table = RouteTable::from_config(
            &[route("/api/ragchat", "ragchat", Some("/api"))],
            &[public("/api/ragchat/health", PublicMatchMode::Exact)],
        );
        let first = table.match_path("/api/ragchat/health").unwrap();
        let second = table.match_path("/api/ragchat/health").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn public_exact_does_not_cover_children() {
        let table = RouteTable::from_config(
            &[route("/api/normcontrol2", "normcontrol2", Some("/api"))],
            &[public("/api/normcontrol2/status", PublicMatchMode::Exact)],
        );
        assert!(table.match_path("/api/normcontrol2/status").unwrap().is_public);
        assert!(!table.match_path("/api/normcontrol2/status/deep").unwrap().is_public);
        assert!(!table.match_path("/api/normcontrol2/check").unwrap().is_public);
    }

    #[test]
    fn public_prefix_covers_subtree_on_segment_boundary() {
        let table = RouteTable::from_config(
            &[
                route("/api/docs", "docs", Some("/api")),
                route("/api/docs-admin", "docs-admin", Some("/api")),
            ],
            &[public("/api/docs", PublicMatchMode::Prefix)],
        );
        assert!(table.match_path("/api/docs/view/1").unwrap().is_public);
        // shares the textual prefix but is a different segment
        assert!(!table.match_path("/api/docs-admin/view/1").unwrap().is_public);
    }

    #[test]
    fn normalization_applies_before_matching() {
        let table = RouteTable::from_config(
            &[route("/api/calc", "calc", Some("/api"))],
            &[public("/api/calc/ping", PublicMatchMode::Exact)],
        );
        let m = table.match_path("//api///calc/ping?x=1").unwrap();
        assert_eq!(m.service, "calc");
        assert_eq!(m.forward_path, "/calc/ping");
        assert!(m.is_public);
    }
}
