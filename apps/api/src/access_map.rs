//! Static map from request paths to the permission each route requires.
//!
//! The guard derives the resource from the first path segment after `/api/`
//! and the action from the HTTP verb. The declared route table is checked at
//! boot so every protected route resolves to exactly one permission or to a
//! self-service rule.

use std::collections::HashSet;
use std::str::FromStr;

use axum::http::Method;
use clinic_core::{AppError, AppResult};
use clinic_domain::{Permission, PermissionAction, Resource};


/// Path prefixes reachable without credentials.
pub const PUBLIC_PREFIXES: &[&str] = &["/health", "/api/auth/"];

/// First segments any authenticated principal may use.
pub const SELF_SERVICE_SEGMENTS: &[&str] = &["session"];

/// HTTP verbs the guard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteVerb {
    /// Maps a request method; `HEAD` reads like `GET`.
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET | Method::HEAD => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::PATCH => Some(Self::Patch),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    #[must_use]
    pub fn action(self) -> PermissionAction {
        match self {
            Self::Get => PermissionAction::View,
            Self::Post => PermissionAction::Create,
            Self::Put | Self::Patch => PermissionAction::Edit,
            Self::Delete => PermissionAction::Delete,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// What the guard requires before a request reaches its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No credential needed.
    Public,
    /// Any authenticated principal.
    SelfService,
    /// The named permission in the current clinic.
    Guarded(Permission),
    /// No entry in the segment map.
    Unmapped,
}

impl RouteAccess {
    /// Returns the guarded resource, if any.
    #[must_use]
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Guarded(permission) => Some(permission.resource()),
            _ => None,
        }
    }
}

/// Decision for authenticated requests whose path has no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPathPolicy {
    #[default]
    Allow,
    Deny,
}

impl FromStr for UnmappedPathPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(AppError::Validation(format!(
                "GUARD_UNMAPPED_PATHS must be either 'allow' or 'deny', got '{other}'"
            ))),
        }
    }
}

/// One declared `(verb, path template)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub verb: RouteVerb,
    pub path: String,
}

impl RouteSpec {
    fn new(verb: RouteVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }
}

/// Every route the API serves.
#[must_use]
pub fn route_table() -> Vec<RouteSpec> {
    use RouteVerb::{Delete, Get, Patch, Post, Put};

    let mut routes = vec![
        RouteSpec::new(Get, "/health"),
        RouteSpec::new(Post, "/api/auth/login"),
        RouteSpec::new(Get, "/api/session"),
        RouteSpec::new(Put, "/api/session/clinic"),
        RouteSpec::new(Get, "/api/roles"),
        RouteSpec::new(Post, "/api/roles"),
        RouteSpec::new(Get, "/api/roles/{role_name}"),
        RouteSpec::new(Delete, "/api/roles/{role_name}"),
        RouteSpec::new(Put, "/api/roles/{role_name}/permissions"),
        RouteSpec::new(Get, "/api/staff"),
        RouteSpec::new(Post, "/api/staff"),
        RouteSpec::new(Put, "/api/staff/{user_id}"),
        RouteSpec::new(Delete, "/api/staff/{user_id}"),
        RouteSpec::new(Get, "/api/clinics"),
        RouteSpec::new(Post, "/api/clinics"),
        RouteSpec::new(Put, "/api/clinics/{clinic_id}"),
        RouteSpec::new(Get, "/api/users"),
        RouteSpec::new(Post, "/api/users"),
        RouteSpec::new(Put, "/api/users/{user_id}"),
        RouteSpec::new(Get, "/api/settings"),
        RouteSpec::new(Put, "/api/settings"),
    ];

    for resource in Resource::record_collections() {
        let collection = collection_path(*resource);
        let item = record_path(*resource);
        routes.extend([
            RouteSpec::new(Get, collection.clone()),
            RouteSpec::new(Post, collection),
            RouteSpec::new(Get, item.clone()),
            RouteSpec::new(Put, item.clone()),
            RouteSpec::new(Patch, item.clone()),
            RouteSpec::new(Delete, item),
        ]);
    }

    routes
}

/// Returns `/api/<segment>` for a record collection.
#[must_use]
pub fn collection_path(resource: Resource) -> String {
    format!("/api/{}", resource.path_segment())
}

/// Returns `/api/<segment>/{record_id}` for a record collection.
#[must_use]
pub fn record_path(resource: Resource) -> String {
    format!("/api/{}/{{record_id}}", resource.path_segment())
}

/// Validated route table plus the unmapped-path policy.
#[derive(Debug, Clone)]
pub struct AccessMap {
    routes: Vec<RouteSpec>,
    unmapped_policy: UnmappedPathPolicy,
}

impl AccessMap {
    /// Validates `routes` and builds the map.
    pub fn new(routes: Vec<RouteSpec>, unmapped_policy: UnmappedPathPolicy) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert((route.verb, route.path.as_str())) {
                return Err(AppError::Internal(format!(
                    "route {} {} is declared twice",
                    route.verb.as_str(),
                    route.path
                )));
            }

            match classify(route.verb, route.path.as_str()) {
                RouteAccess::Unmapped => {
                    return Err(AppError::Internal(format!(
                        "route {} {} has no access rule",
                        route.verb.as_str(),
                        route.path
                    )));
                }
                RouteAccess::Guarded(permission)
                    if !Permission::catalog().contains(&permission) =>
                {
                    return Err(AppError::Internal(format!(
                        "route {} {} requires unknown permission '{permission}'",
                        route.verb.as_str(),
                        route.path
                    )));
                }
                _ => {}
            }
        }

        Ok(Self {
            routes,
            unmapped_policy,
        })
    }

    /// Builds the map for the standard route table.
    pub fn standard(unmapped_policy: UnmappedPathPolicy) -> AppResult<Self> {
        Self::new(route_table(), unmapped_policy)
    }

    /// Classifies a concrete request.
    #[must_use]
    pub fn classify(&self, method: &Method, path: &str) -> RouteAccess {
        if is_public(path) {
            return RouteAccess::Public;
        }

        match RouteVerb::from_method(method) {
            Some(verb) => classify(verb, path),
            None => RouteAccess::Unmapped,
        }
    }

    #[must_use]
    pub fn unmapped_policy(&self) -> UnmappedPathPolicy {
        self.unmapped_policy
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }
}

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| {
        if prefix.ends_with('/') {
            path.starts_with(prefix)
        } else {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    })
}

fn classify(verb: RouteVerb, path: &str) -> RouteAccess {
    if is_public(path) {
        return RouteAccess::Public;
    }

    let Some(rest) = path.strip_prefix("/api/") else {
        return RouteAccess::Unmapped;
    };
    let segment = rest.split('/').next().unwrap_or_default();

    if SELF_SERVICE_SEGMENTS.contains(&segment) {
        return RouteAccess::SelfService;
    }

    match Resource::from_path_segment(segment) {
        Some(resource) => {
            RouteAccess::Guarded(Permission::required_for(resource, verb.action()))
        }
        None => RouteAccess::Unmapped,
    }
}
