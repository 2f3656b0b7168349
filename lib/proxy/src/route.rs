//! The route table: ordered path patterns mapped to backend targets.
//!
//! Patterns are either literal paths or a literal prefix followed by
//! `/**`, where `**` matches the prefix itself and any deeper segments.
//! The table is built once at startup, sorted longest-literal-prefix
//! first so a more specific pattern can never be shadowed by a more
//! general one, and validated to reject overlaps with no defined
//! precedence. It is never mutated afterwards, so concurrent lookups
//! need no locking.

use crate::error::RouteTableError;
use serde::Deserialize;
use url::Url;

/// A route as written in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDef {
    /// Path pattern, e.g. `/api/users/**`.
    pub pattern: String,
    /// Base URL of the backend, e.g. `http://localhost:8082`.
    pub target_base: String,
    /// Optional replacement for the matched literal prefix.
    #[serde(default)]
    pub rewrite_prefix: Option<String>,
}

/// A validated route.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    literal_prefix: String,
    wildcard: bool,
    target_base: String,
    rewrite_prefix: Option<String>,
}

impl Route {
    fn from_def(def: RouteDef) -> Result<Self, RouteTableError> {
        if !def.pattern.starts_with('/') {
            return Err(RouteTableError::InvalidPattern {
                pattern: def.pattern,
                reason: "must start with '/'".to_string(),
            });
        }

        let (literal_prefix, wildcard) = match def.pattern.strip_suffix("/**") {
            Some(prefix) => (prefix.to_string(), true),
            None => {
                if def.pattern.contains("**") {
                    return Err(RouteTableError::InvalidPattern {
                        pattern: def.pattern,
                        reason: "'**' is only supported as a trailing '/**'".to_string(),
                    });
                }
                (def.pattern.clone(), false)
            }
        };

        Url::parse(&def.target_base).map_err(|e| RouteTableError::InvalidTarget {
            pattern: def.pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: def.pattern,
            literal_prefix,
            wildcard,
            target_base: def.target_base.trim_end_matches('/').to_string(),
            rewrite_prefix: def.rewrite_prefix,
        })
    }

    /// Returns the pattern as written in configuration.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the literal prefix the pattern matches on.
    #[must_use]
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    /// Returns true if this route matches the request path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.wildcard {
            path == self.literal_prefix
                || (path.len() > self.literal_prefix.len()
                    && path.starts_with(&self.literal_prefix)
                    && path.as_bytes()[self.literal_prefix.len()] == b'/')
        } else {
            path == self.pattern
        }
    }

    /// Computes the target path for a matched request path.
    ///
    /// Without a rewrite prefix the path is forwarded unchanged. With
    /// one, the matched literal prefix is stripped; any remainder is
    /// appended to the rewrite prefix with a single separating slash,
    /// and an empty remainder yields the rewrite prefix exactly.
    #[must_use]
    pub fn rewrite(&self, path: &str) -> String {
        let Some(rewrite_prefix) = &self.rewrite_prefix else {
            return path.to_string();
        };

        if !self.wildcard {
            return rewrite_prefix.clone();
        }

        let remainder = path
            .strip_prefix(&self.literal_prefix)
            .unwrap_or("")
            .trim_matches('/');

        if remainder.is_empty() {
            rewrite_prefix.clone()
        } else {
            format!("{rewrite_prefix}/{remainder}")
        }
    }

    /// Builds the full target URL for a matched request.
    #[must_use]
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let target_path = self.rewrite(path);
        match query {
            Some(query) => format!("{}{}?{}", self.target_base, target_path, query),
            None => format!("{}{}", self.target_base, target_path),
        }
    }
}

/// Immutable, specificity-ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds a table from route definitions.
    ///
    /// Routes are ordered longest-literal-prefix first; definition order
    /// breaks ties between disjoint prefixes of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError`] for malformed patterns, unparseable
    /// targets, or two patterns sharing a literal prefix.
    pub fn new(defs: Vec<RouteDef>) -> Result<Self, RouteTableError> {
        let mut routes = defs
            .into_iter()
            .map(Route::from_def)
            .collect::<Result<Vec<_>, _>>()?;

        routes.sort_by(|a, b| b.literal_prefix.len().cmp(&a.literal_prefix.len()));

        for pair in routes.windows(2) {
            if pair[0].literal_prefix == pair[1].literal_prefix {
                return Err(RouteTableError::AmbiguousPatterns {
                    first: pair[0].pattern.clone(),
                    second: pair[1].pattern.clone(),
                });
            }
        }

        Ok(Self { routes })
    }

    /// Returns the first route matching the path, in table order.
    #[must_use]
    pub fn matched(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    /// Returns the number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(pattern: &str, target: &str, rewrite: Option<&str>) -> RouteDef {
        RouteDef {
            pattern: pattern.to_string(),
            target_base: target.to_string(),
            rewrite_prefix: rewrite.map(str::to_string),
        }
    }

    /// The reference table, deliberately listed most-general-first to
    /// prove construction reorders it.
    fn table() -> RouteTable {
        RouteTable::new(vec![
            def("/api/ai/**", "http://localhost:9001", None),
            def("/api/users/**", "http://localhost:8082", None),
            def("/api/ai/ml/**", "http://localhost:9006", Some("/titanic")),
            def("/api/ai/seoul/**", "http://localhost:9006", Some("/seoul")),
        ])
        .expect("valid table")
    }

    #[test]
    fn wildcard_matches_prefix_and_deeper_segments() {
        let table = table();
        assert!(table.matched("/api/users").is_some());
        assert!(table.matched("/api/users/123/profile").is_some());
        assert!(table.matched("/api/usersextra").is_none());
        assert!(table.matched("/health").is_none());
    }

    #[test]
    fn most_specific_pattern_wins_regardless_of_definition_order() {
        let table = table();
        let route = table.matched("/api/ai/ml/predict").expect("matched");
        assert_eq!(route.pattern(), "/api/ai/ml/**");

        let route = table.matched("/api/ai/chatbot/ask").expect("matched");
        assert_eq!(route.pattern(), "/api/ai/**");
    }

    #[test]
    fn rewrite_absent_keeps_path_unchanged() {
        let table = table();
        let route = table.matched("/api/users/123/profile").expect("matched");
        assert_eq!(route.rewrite("/api/users/123/profile"), "/api/users/123/profile");
        assert_eq!(
            route.target_url("/api/users/123/profile", None),
            "http://localhost:8082/api/users/123/profile"
        );
    }

    #[test]
    fn rewrite_replaces_matched_prefix() {
        let table = table();
        let route = table.matched("/api/ai/ml/predict").expect("matched");
        assert_eq!(route.rewrite("/api/ai/ml/predict"), "/titanic/predict");
    }

    #[test]
    fn rewrite_without_remainder_is_prefix_exactly() {
        let table = table();
        let route = table.matched("/api/ai/ml").expect("matched");
        assert_eq!(route.rewrite("/api/ai/ml"), "/titanic");
    }

    #[test]
    fn rewrite_trims_stray_slashes_from_remainder() {
        let table = table();
        let route = table.matched("/api/ai/ml/predict/").expect("matched");
        assert_eq!(route.rewrite("/api/ai/ml/predict/"), "/titanic/predict");
    }

    #[test]
    fn target_url_appends_query() {
        let table = table();
        let route = table.matched("/api/ai/seoul/stations").expect("matched");
        assert_eq!(
            route.target_url("/api/ai/seoul/stations", Some("line=2")),
            "http://localhost:9006/seoul/stations?line=2"
        );
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        let table = RouteTable::new(vec![def(
            "/transformer-openapi",
            "http://localhost:9007",
            Some("/openapi.json"),
        )])
        .expect("valid table");

        let route = table.matched("/transformer-openapi").expect("matched");
        assert_eq!(route.rewrite("/transformer-openapi"), "/openapi.json");
        assert!(table.matched("/transformer-openapi/deeper").is_none());
    }

    #[test]
    fn construction_rejects_pattern_without_leading_slash() {
        let err = RouteTable::new(vec![def("api/users/**", "http://localhost", None)])
            .expect_err("must reject");
        assert!(matches!(err, RouteTableError::InvalidPattern { .. }));
    }

    #[test]
    fn construction_rejects_interior_wildcard() {
        let err = RouteTable::new(vec![def("/api/**/users", "http://localhost", None)])
            .expect_err("must reject");
        assert!(matches!(err, RouteTableError::InvalidPattern { .. }));
    }

    #[test]
    fn construction_rejects_unparseable_target() {
        let err = RouteTable::new(vec![def("/api/users/**", "not a url", None)])
            .expect_err("must reject");
        assert!(matches!(err, RouteTableError::InvalidTarget { .. }));
    }

    #[test]
    fn construction_rejects_overlapping_prefixes() {
        let err = RouteTable::new(vec![
            def("/api/users/**", "http://localhost:8082", None),
            def("/api/users/**", "http://localhost:9000", None),
        ])
        .expect_err("must reject");
        assert!(matches!(err, RouteTableError::AmbiguousPatterns { .. }));
    }

    #[test]
    fn construction_rejects_literal_shadowed_by_wildcard_prefix() {
        // "/api/users" (literal) and "/api/users/**" both match the path
        // "/api/users"; with equal literal prefixes there is no defined
        // precedence between them.
        let err = RouteTable::new(vec![
            def("/api/users", "http://localhost:8082", None),
            def("/api/users/**", "http://localhost:9000", None),
        ])
        .expect_err("must reject");
        assert!(matches!(err, RouteTableError::AmbiguousPatterns { .. }));
    }
}
