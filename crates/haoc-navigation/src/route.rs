//! Route table
//!
//! Patterns are absolute paths; a segment starting with `:` captures the
//! matching path segment under that name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use haoc_session::Role;

use crate::error::NavigationError;
use crate::Result;

/// Captured `:param` segments by name
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// No guard
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed in with exactly this role
    Role(Role),
}

impl Access {
    /// Role handed to the guard; `None` for public routes
    pub fn guard(&self) -> Option<Option<Role>> {
        match self {
            Access::Public => None,
            Access::Authenticated => Some(None),
            Access::Role(role) => Some(Some(*role)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    access: Access,
}

impl Route {
    pub fn new(pattern: &str, access: Access) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(NavigationError::InvalidPattern(pattern.to_string()));
        }

        let segments = split(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some("") => Err(NavigationError::InvalidPattern(pattern.to_string())),
                Some(name) => Ok(Segment::Param(name.to_string())),
                None => Ok(Segment::Literal(s.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            access,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn access(&self) -> Access {
        self.access
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Params captured from `segments`, if the route matches them
    fn capture(&self, segments: &[&str]) -> Option<Params> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (expected, actual) in self.segments.iter().zip(segments) {
            match expected {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The marketplace's pages and who may see them
    pub fn marketplace() -> Self {
        const PUBLIC: &[&str] = &[
            "/",
            "/services",
            "/login",
            "/register",
            "/verify-otp",
            "/forgot-password",
            "/password/reset/:token",
            "/events",
            "/contact",
            "/about",
            "/blogs",
            "/blogs/:id",
            "/career",
            "/listings",
            "/listings/:id",
            "/unauthorized",
        ];
        const SIGNED_IN: &[&str] = &[
            "/user/dashboard",
            "/user/profile",
            "/booking/:id",
            "/user/bookings",
        ];
        const AGENT: &[&str] = &["/agent/dashboard"];
        const ADMIN: &[&str] = &[
            "/admin/dashboard",
            "/admin/properties",
            "/admin/agents",
            "/admin/add",
            "/admin/users",
            "/admin/bookings",
            "/admin/blogs",
            "/admin/events",
            "/admin/properties/view/:id",
            "/admin/properties/edit/:id",
            "/admin/careers",
            "/admin/settings",
        ];

        let groups = [
            (PUBLIC, Access::Public),
            (SIGNED_IN, Access::Authenticated),
            (AGENT, Access::Role(Role::Agent)),
            (ADMIN, Access::Role(Role::Admin)),
        ];

        let routes = groups
            .iter()
            .flat_map(|(patterns, access)| {
                patterns
                    .iter()
                    .filter_map(move |pattern| Route::new(pattern, *access).ok())
            })
            .collect();

        Self { routes }
    }

    pub fn add(&mut self, pattern: &str, access: Access) -> Result<()> {
        let route = Route::new(pattern, access)?;
        if self.routes.iter().any(|r| r.segments == route.segments) {
            return Err(NavigationError::DuplicateRoute(pattern.to_string()));
        }

        self.routes.push(route);
        Ok(())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route for `path` and its params. Literal segments win over params
    /// when several routes match.
    pub fn resolve(&self, path: &str) -> Result<Option<(&Route, Params)>> {
        let path = normalize(path)?;
        let segments: Vec<&str> = split(&path).collect();

        let best = self
            .routes
            .iter()
            .filter_map(|route| route.capture(&segments).map(|params| (route, params)))
            .max_by_key(|(route, _)| route.literal_count());

        Ok(best)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Path component of `path`, without query or fragment and with dot
/// segments resolved
fn normalize(path: &str) -> Result<String> {
    let path = path.trim();
    if !path.starts_with('/') {
        return Err(NavigationError::InvalidPath(path.to_string()));
    }

    Url::parse("http://localhost")
        .and_then(|base| base.join(path))
        .map(|url| url.path().to_string())
        .map_err(|_| NavigationError::InvalidPath(path.to_string()))
}
