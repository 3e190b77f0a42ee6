//! Per-path authentication and API version selection.
//!
//! Plane serves most resources from the versioned `/api/v1/` root behind an API
//! key, while the pages family lives under the unversioned `/api/` root and
//! requires a cookie session. The split is declared as data in
//! [`ROUTE_RULES`] and resolved by the pure [`classify`] function.

/// How a request authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Static `X-API-Key` header
    ApiKey,
    /// Session cookies from a prior password login
    Session,
}

/// API root a request is sent under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// `api/v1/`
    V1,
    /// `api/`
    Unversioned,
}

impl ApiVersion {
    pub fn prefix(self) -> &'static str {
        match self {
            ApiVersion::V1 => "api/v1/",
            ApiVersion::Unversioned => "api/",
        }
    }
}

/// Result of classifying a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteClassification {
    pub auth: AuthMode,
    pub version: ApiVersion,
}

impl RouteClassification {
    pub const DEFAULT: RouteClassification = RouteClassification {
        auth: AuthMode::ApiKey,
        version: ApiVersion::V1,
    };

    pub fn uses_session_auth(&self) -> bool {
        self.auth == AuthMode::Session
    }
}

/// A path prefix, as `/`-separated segments where `*` matches any single
/// segment, and the routing it selects.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub pattern: &'static str,
    pub classification: RouteClassification,
}

impl RouteRule {
    const fn session(pattern: &'static str) -> Self {
        Self {
            pattern,
            classification: RouteClassification {
                auth: AuthMode::Session,
                version: ApiVersion::Unversioned,
            },
        }
    }

    /// True when every pattern segment matches the leading path segments
    pub fn matches(&self, segments: &[&str]) -> bool {
        let pattern: Vec<&str> = self.pattern.split('/').collect();
        pattern.len() <= segments.len()
            && pattern
                .iter()
                .zip(segments)
                .all(|(expected, actual)| *expected == "*" || expected == actual)
    }
}

/// Pages family: description and version endpoints sit under `pages/<id>/`
/// and are covered by the prefix match.
pub const ROUTE_RULES: &[RouteRule] = &[
    RouteRule::session("workspaces/*/pages"),
    RouteRule::session("workspaces/*/projects/*/pages"),
    RouteRule::session("workspaces/*/projects/*/pages-summary"),
    RouteRule::session("workspaces/*/projects/*/favorite-pages"),
];

/// Split a logical API path into its non-empty segments, ignoring any query
/// string.
pub fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Classify `path` against [`ROUTE_RULES`]. Depends on nothing but the path.
pub fn classify(path: &str) -> RouteClassification {
    classify_with(ROUTE_RULES, path)
}

pub fn classify_with(rules: &[RouteRule], path: &str) -> RouteClassification {
    let segments = segments(path);
    rules
        .iter()
        .find(|rule| rule.matches(&segments))
        .map(|rule| rule.classification)
        .unwrap_or(RouteClassification::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: RouteClassification = RouteClassification {
        auth: AuthMode::Session,
        version: ApiVersion::Unversioned,
    };

    #[test]
    fn test_pages_family_uses_session() {
        let paths = [
            "workspaces/acme/projects/p1/pages/",
            "workspaces/acme/projects/p1/pages",
            "workspaces/acme/projects/p1/pages/pg1/",
            "workspaces/acme/projects/p1/pages/pg1/archive/",
            "workspaces/acme/projects/p1/pages/pg1/description/",
            "workspaces/acme/projects/p1/pages/pg1/versions/",
            "workspaces/acme/projects/p1/pages/pg1/versions/v1/",
            "workspaces/acme/projects/p1/pages-summary/",
            "workspaces/acme/projects/p1/favorite-pages/pg1/",
            "workspaces/acme/pages/",
            "/workspaces/acme/projects/p1/pages/",
            "workspaces/acme/projects/p1/pages/?search=x",
        ];

        for path in paths {
            assert_eq!(classify(path), SESSION, "{path}");
        }
    }

    #[test]
    fn test_other_resources_use_api_key() {
        let paths = [
            "users/me/",
            "workspaces/acme/projects/",
            "workspaces/acme/projects/p1/issues/",
            "workspaces/acme/projects/p1/cycles/c1/cycle-issues/",
            "workspaces/acme/projects/p1/issues/i1/worklogs/",
            "workspaces/acme/members/",
        ];

        for path in paths {
            assert_eq!(classify(path), RouteClassification::DEFAULT, "{path}");
        }
    }

    #[test]
    fn test_similar_names_do_not_match() {
        let paths = [
            "workspaces/acme/projects/p1/homepages/",
            "workspaces/acme/projects/p1/pagesx/",
            "workspaces/acme/projects/p1/my-favorite-pages/",
            // a workspace or project literally named "pages"
            "workspaces/pages/projects/p1/issues/",
            "workspaces/acme/projects/pages/issues/",
            "workspaces/acme/projects/p1/issues/?search=pages",
            "pages/",
        ];

        for path in paths {
            assert_eq!(classify(path), RouteClassification::DEFAULT, "{path}");
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let path = "workspaces/acme/projects/p1/pages/";
        assert_eq!(classify(path), classify(path));
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(ApiVersion::V1.prefix(), "api/v1/");
        assert_eq!(ApiVersion::Unversioned.prefix(), "api/");
        assert!(SESSION.uses_session_auth());
        assert!(!RouteClassification::DEFAULT.uses_session_auth());
    }

    #[test]
    fn test_custom_rules() {
        let rules = [RouteRule::session("workspaces/*/drafts")];
        assert_eq!(classify_with(&rules, "workspaces/w/drafts/1/"), SESSION);
        assert_eq!(
            classify_with(&rules, "workspaces/w/projects/p/pages/"),
            RouteClassification::DEFAULT
        );
    }

    #[test]
    fn test_segments_strip_query_and_empty() {
        assert_eq!(segments("/a//b/?x=1"), vec!["a", "b"]);
        assert!(segments("").is_empty());
    }
}
