//! Screen routing table and navigation decisions.
//!
//! # Responsibility
//! - Map request paths to screen routes (`/article/:id` style patterns).
//! - Resolve each navigation synchronously to render or redirect before any
//!   screen data is fetched.
//!
//! # Invariants
//! - Unknown paths redirect to the fallback path.
//! - Role-gated routes consult `RouteAuthorizer` exactly once per navigation.
//! - Denied navigations redirect to the unauthorized path.

use crate::auth::route::{role_set, RouteAuthorizer, Verdict, ROLE_ADMIN, ROLE_USER};
use crate::auth::store::CredentialStore;
use crate::clock::Clock;
use crate::config::ClientConfig;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Who may render a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// Any session role in the set admits; an empty set needs authentication only.
    Roles(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub pattern: String,
    pub access: RouteAccess,
}

/// A matched route with its captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub pattern: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    UnknownRoute,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(RouteMatch),
    Redirect { to: String, reason: RedirectReason },
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    unauthorized_path: String,
    fallback_path: String,
}

impl RouteTable {
    /// Empty table using the redirect targets from `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            routes: Vec::new(),
            unauthorized_path: config.unauthorized_path.clone(),
            fallback_path: config.fallback_path.clone(),
        }
    }

    /// The knowledge platform's screen table.
    pub fn knowledge_app(config: &ClientConfig) -> Self {
        let members = || role_set([ROLE_USER, ROLE_ADMIN]);
        Self::new(config)
            .public("/")
            .public("/login")
            .public("/signup")
            .public(config.unauthorized_path.as_str())
            .public("/articles")
            .public("/article/:id")
            .protected("/dashboard", members())
            .protected("/create-article", members())
            .protected("/manage-articles", members())
            .protected("/edit-article/:id", members())
            .protected("/profile", members())
    }

    pub fn public(mut self, pattern: impl Into<String>) -> Self {
        self.routes.push(RouteDef {
            pattern: pattern.into(),
            access: RouteAccess::Public,
        });
        self
    }

    pub fn protected(mut self, pattern: impl Into<String>, roles: BTreeSet<String>) -> Self {
        self.routes.push(RouteDef {
            pattern: pattern.into(),
            access: RouteAccess::Roles(roles),
        });
        self
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// First route whose pattern matches `path`, in declaration order.
    pub fn resolve(&self, path: &str) -> Option<(&RouteDef, RouteMatch)> {
        let segments = path_segments(path);
        self.routes.iter().find_map(|route| {
            match_pattern(route.pattern.as_str(), &segments).map(|params| {
                (
                    route,
                    RouteMatch {
                        pattern: route.pattern.clone(),
                        params,
                    },
                )
            })
        })
    }

    /// Decides one navigation.
    pub fn navigate<S: CredentialStore, C: Clock>(
        &self,
        path: &str,
        authorizer: &RouteAuthorizer<S, C>,
    ) -> Navigation {
        let Some((route, matched)) = self.resolve(path) else {
            return self.redirect(path, &self.fallback_path, RedirectReason::UnknownRoute);
        };

        let required = match &route.access {
            RouteAccess::Public => return Navigation::Render(matched),
            RouteAccess::Roles(required) => required,
        };

        match authorizer.authorize(required) {
            Verdict::Allow => Navigation::Render(matched),
            Verdict::DenyUnauthenticated => self.redirect(
                path,
                &self.unauthorized_path,
                RedirectReason::Unauthenticated,
            ),
            Verdict::DenyForbidden => {
                self.redirect(path, &self.unauthorized_path, RedirectReason::Forbidden)
            }
        }
    }

    fn redirect(&self, from: &str, to: &str, reason: RedirectReason) -> Navigation {
        info!(
            "event=navigation_redirect module=routing status=ok from={} to={} reason={:?}",
            strip_query(from),
            to,
            reason
        );
        Navigation::Redirect {
            to: to.to_string(),
            reason,
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

fn path_segments(path: &str) -> Vec<&str> {
    strip_query(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern_segments = path_segments(pattern);
    if pattern_segments.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), (*actual).to_string());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}
