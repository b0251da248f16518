//! Route-based access control.
//!
//! An ordered `(method, path pattern) -> level` table, first match wins. A request no rule
//! matches is treated as `Authenticated` (default-deny for anonymous callers).
//!
//! Pattern syntax (path segments split on `/`):
//! - `literal` matches that exact segment
//! - `*` or `{name}` matches exactly one segment
//! - `**` matches zero or more segments
use axum::http::Method;

use crate::api::extractors::SecurityCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    One,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split(raw)
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::One,
                s if s.starts_with('{') && s.ends_with('}') => Segment::One,
                s => Segment::Literal(s.to_string()),
            })
            .collect();

        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split(path).collect();
        match_segments(&self.segments, &parts)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::One, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first().is_some_and(|p| p == lit) && match_segments(rest, &path[1..])
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    /// `None` matches any method.
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub level: AccessLevel,
}

impl AccessRule {
    pub fn new(method: Option<Method>, pattern: &str, level: AccessLevel) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            level,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// Immutable after construction; shared read-only across requests.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AccessRule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// The rule table this API ships with.
    pub fn weather_api() -> Self {
        Self::new(vec![
            AccessRule::new(Some(Method::GET), "/weather/**", AccessLevel::Public),
            AccessRule::new(Some(Method::POST), "/weather/**", AccessLevel::Authenticated),
            AccessRule::new(Some(Method::POST), "/auth/login", AccessLevel::Public),
        ])
    }

    /// Level of the first matching rule; `Authenticated` when nothing matches.
    pub fn level_for(&self, method: &Method, path: &str) -> AccessLevel {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.level)
            .unwrap_or(AccessLevel::Authenticated)
    }

    pub fn decide(&self, method: &Method, path: &str, ctx: &SecurityCtx) -> Decision {
        match self.level_for(method, path) {
            AccessLevel::Public => Decision::Allow,
            AccessLevel::Authenticated if ctx.is_authenticated() => Decision::Allow,
            AccessLevel::Authenticated => Decision::Deny,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::api::extractors::AuthCtx;

    fn authenticated() -> SecurityCtx {
        let now = Utc::now();
        SecurityCtx::Authenticated(AuthCtx::new("kata-user", now, now))
    }

    #[test]
    fn double_star_matches_zero_or_more_segments() {
        let p = PathPattern::parse("/weather/**");

        assert!(p.matches("/weather"));
        assert!(p.matches("/weather/"));
        assert!(p.matches("/weather/bogota-col"));
        assert!(p.matches("/weather/a/b/c"));
        assert!(!p.matches("/weatherx/bogota-col"));
        assert!(!p.matches("/auth/login"));
    }

    #[test]
    fn single_segment_wildcards() {
        let p = PathPattern::parse("/weather/{location_id}");
        assert!(p.matches("/weather/bogota-col"));
        assert!(!p.matches("/weather"));
        assert!(!p.matches("/weather/a/b"));

        let p = PathPattern::parse("/a/*/c");
        assert!(p.matches("/a/b/c"));
        assert!(!p.matches("/a/c"));
    }

    #[test]
    fn double_star_in_the_middle_backtracks() {
        let p = PathPattern::parse("/a/**/z");
        assert!(p.matches("/a/z"));
        assert!(p.matches("/a/b/c/z"));
        assert!(!p.matches("/a/b/c"));
    }

    #[test]
    fn shipped_table_levels() {
        let policy = AuthorizationPolicy::weather_api();

        assert_eq!(
            policy.level_for(&Method::GET, "/weather/bogota-col"),
            AccessLevel::Public
        );
        assert_eq!(
            policy.level_for(&Method::POST, "/weather/bogota-col"),
            AccessLevel::Authenticated
        );
        assert_eq!(
            policy.level_for(&Method::POST, "/auth/login"),
            AccessLevel::Public
        );
        // Only POST is public on the login route.
        assert_eq!(
            policy.level_for(&Method::GET, "/auth/login"),
            AccessLevel::Authenticated
        );
        assert_eq!(
            policy.level_for(&Method::DELETE, "/weather/bogota-col"),
            AccessLevel::Authenticated
        );
        assert_eq!(
            policy.level_for(&Method::GET, "/admin"),
            AccessLevel::Authenticated
        );
    }

    #[test]
    fn decide_by_level_and_context() {
        let policy = AuthorizationPolicy::weather_api();
        let anon = SecurityCtx::Anonymous;
        let user = authenticated();

        assert_eq!(
            policy.decide(&Method::GET, "/weather/x", &anon),
            Decision::Allow
        );
        assert_eq!(
            policy.decide(&Method::GET, "/weather/x", &user),
            Decision::Allow
        );
        assert_eq!(
            policy.decide(&Method::POST, "/weather/x", &anon),
            Decision::Deny
        );
        assert_eq!(
            policy.decide(&Method::POST, "/weather/x", &user),
            Decision::Allow
        );
        assert_eq!(policy.decide(&Method::GET, "/nowhere", &anon), Decision::Deny);
        assert_eq!(
            policy.decide(&Method::GET, "/nowhere", &user),
            Decision::Allow
        );
    }

    fn docs_rules() -> Vec<AccessRule> {
        vec![
            AccessRule::new(None, "/docs/private/**", AccessLevel::Authenticated),
            AccessRule::new(None, "/docs/**", AccessLevel::Public),
        ]
    }

    #[test]
    fn first_match_wins() {
        let policy = AuthorizationPolicy::new(docs_rules());

        assert_eq!(
            policy.decide(&Method::GET, "/docs/private/x", &SecurityCtx::Anonymous),
            Decision::Deny
        );
        assert_eq!(
            policy.decide(&Method::GET, "/docs/public/x", &SecurityCtx::Anonymous),
            Decision::Allow
        );

        let reversed = AuthorizationPolicy::new(docs_rules().into_iter().rev().collect());
        assert_eq!(
            reversed.decide(&Method::GET, "/docs/private/x", &SecurityCtx::Anonymous),
            Decision::Allow
        );
    }

    #[test]
    fn authenticated_caller_is_never_denied() {
        let policy = AuthorizationPolicy::weather_api();
        let user = authenticated();

        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            for path in ["/weather/x", "/auth/login", "/admin", "/"] {
                assert_eq!(policy.decide(&method, path, &user), Decision::Allow);
            }
        }
    }

    #[test]
    fn empty_table_denies_anonymous() {
        let policy = AuthorizationPolicy::new(Vec::new());
        assert_eq!(
            policy.decide(&Method::GET, "/", &SecurityCtx::Anonymous),
            Decision::Deny
        );
        assert_eq!(policy.decide(&Method::GET, "/", &authenticated()), Decision::Allow);
    }
}
