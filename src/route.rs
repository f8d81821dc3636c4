//! Route locations and the metadata contract middleware is declared through.
//!
//! The host router owns route matching; by the time a navigation reaches the
//! guard it has already produced a [`RouteLocation`] for both ends of the
//! navigation. The only field the dispatcher interprets is
//! [`RouteMeta::middlewares`].
//!
//! ```
//! use navigator_middleware::{RouteLocation, RouteMeta};
//!
//! let secret = RouteLocation::parse("/secret?tab=keys")
//!     .name("Secret")
//!     .meta(RouteMeta::with_middlewares(["logger", "auth"]));
//!
//! assert_eq!(secret.path, "/secret");
//! assert_eq!(secret.query.get("tab"), Some("keys"));
//! assert_eq!(secret.meta.middlewares.as_ref().map(|m| m.len()), Some(2));
//! ```

use crate::middleware::MiddlewareDeclaration;
use crate::params::{QueryParams, RouteParams};

/// Routing metadata attached to a route record.
#[derive(Debug, Clone, Default)]
pub struct RouteMeta {
    /// Middleware to run before entering the route, in execution order.
    ///
    /// `None` means the route declares no middleware and navigation is never
    /// intercepted.
    pub middlewares: Option<MiddlewareDeclaration>,
}

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata declaring the given middleware names.
    pub fn with_middlewares<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            middlewares: Some(MiddlewareDeclaration::from_names(names)),
        }
    }

    /// Metadata with an explicit declaration (names and inline descriptors).
    pub fn with_declaration(declaration: MiddlewareDeclaration) -> Self {
        Self {
            middlewares: Some(declaration),
        }
    }
}

/// A normalized route location: one end of a navigation.
#[derive(Debug, Clone, Default)]
pub struct RouteLocation {
    /// Path without the query string.
    pub path: String,

    /// Route name, if the matched record has one.
    pub name: Option<String>,

    /// Dynamic segment values.
    pub params: RouteParams,

    /// Parsed query string.
    pub query: QueryParams,

    /// Metadata of the matched route record.
    pub meta: RouteMeta,
}

impl RouteLocation {
    /// Location for a bare path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Split `path?query` into a location.
    pub fn parse(url: &str) -> Self {
        match url.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: QueryParams::parse(query),
                ..Self::default()
            },
            None => Self::new(url),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Middleware declared on this location's route, if any.
    pub fn middlewares(&self) -> Option<&MiddlewareDeclaration> {
        self.meta.middlewares.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================
