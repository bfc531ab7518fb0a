//! Route lookup and reverse routing.
//!
//! # Responsibilities
//! - Normalize a navigation target into a `Location`
//! - Find the first route whose pattern accepts the location
//! - Rebuild a concrete path from a route name and parameters
//!
//! # Design Decisions
//! - Query string and fragment are split off before matching and carried along
//! - One trailing slash is tolerated; `href` never emits one
//! - Segments are percent-decoded before matching, values encoded when building
//! - Explicit `NotFound` rather than a silent default route

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::pattern::Params;
use crate::routing::table::{RouteTable, ViewRef};

/// Errors from a single navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no route matches {path:?}")]
    NotFound { path: String },

    #[error("no route named {name:?}")]
    UnknownRoute { name: String },

    #[error("route {route:?} requires parameter {param:?}")]
    MissingParameter { route: String, param: String },
}

/// A navigation target split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path without query, fragment or trailing slash, still encoded.
    pub path: String,
    /// Decoded path segments.
    pub segments: Vec<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Location {
    pub fn parse(target: &str) -> Result<Self, RouteError> {
        let (rest, fragment) = match target.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (target, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        let not_found = || RouteError::NotFound {
            path: path.to_string(),
        };

        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        let rest = path.strip_prefix('/').ok_or_else(not_found)?;

        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/')
                .map(|raw| urlencoding::decode(raw).map(|s| s.into_owned()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| not_found())?
        };

        Ok(Self {
            path: path.to_string(),
            segments,
            query,
            fragment,
        })
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub name: String,
    pub params: Params,
    pub view: ViewRef,
    pub props: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// How a view receives its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewInputs<'a> {
    /// Parameters handed to the view directly.
    Props(&'a Params),
    /// The view reads them from navigation state itself.
    State,
}

impl ResolvedRoute {
    pub fn view_inputs(&self) -> ViewInputs<'_> {
        if self.props {
            ViewInputs::Props(&self.params)
        } else {
            ViewInputs::State
        }
    }
}

/// Resolver over a shared route table.
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a path (optionally with query and fragment).
    pub fn resolve(&self, target: &str) -> Result<ResolvedRoute, RouteError> {
        let location = Location::parse(target).inspect_err(|_| {
            tracing::warn!(target = %target, "Unroutable navigation target");
            metrics::record_resolution(None);
        })?;
        self.resolve_location(location)
    }

    pub fn resolve_location(&self, location: Location) -> Result<ResolvedRoute, RouteError> {
        // First match wins; table construction rules out overlaps.
        for route in self.table.iter() {
            if let Some(params) = route.pattern.matches(&location.segments) {
                tracing::debug!(
                    route = %route.name,
                    path = %location.path,
                    params = ?params,
                    "Route resolved"
                );
                metrics::record_resolution(Some(&route.name));
                return Ok(ResolvedRoute {
                    name: route.name.clone(),
                    params,
                    view: route.view,
                    props: route.props,
                    path: location.path,
                    query: location.query,
                });
            }
        }

        tracing::warn!(path = %location.path, "No route matched");
        metrics::record_resolution(None);
        Err(RouteError::NotFound {
            path: location.path,
        })
    }

    /// Build the concrete path for a named route.
    pub fn href(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        let route = self.table.get(name).ok_or_else(|| RouteError::UnknownRoute {
            name: name.to_string(),
        })?;

        let path = route
            .pattern
            .build(params)
            .map_err(|param| RouteError::MissingParameter {
                route: route.name.clone(),
                param,
            })?;

        let unused: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !route.pattern.param_names().any(|p| p == *key))
            .collect();
        if !unused.is_empty() {
            tracing::debug!(route = %name, unused = ?unused, "Discarding unknown parameters");
        }

        Ok(path)
    }

    /// Build the path for a named route, then resolve it.
    pub fn resolve_named(&self, name: &str, params: &Params) -> Result<ResolvedRoute, RouteError> {
        let path = self.href(name, params)?;
        self.resolve(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::RouteDef;

    const VIEW: ViewRef = ViewRef::new("View");

    fn router() -> Router {
        Router::new(
            RouteTable::new(vec![
                RouteDef::new("Home", "/", VIEW, false).unwrap(),
                RouteDef::new("Feedback", "/feedback/:exerciseId", VIEW, true).unwrap(),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_location_splits_query_and_fragment() {
        let loc = Location::parse("/feedback/ex42/?lang=en#top").unwrap();
        assert_eq!(loc.path, "/feedback/ex42");
        assert_eq!(loc.segments, vec!["feedback", "ex42"]);
        assert_eq!(loc.query.as_deref(), Some("lang=en"));
        assert_eq!(loc.fragment.as_deref(), Some("top"));
    }

    #[test]
    fn test_location_root() {
        let loc = Location::parse("/").unwrap();
        assert_eq!(loc.path, "/");
        assert!(loc.segments.is_empty());
    }

    #[test]
    fn test_location_requires_leading_slash() {
        assert_eq!(
            Location::parse("feedback"),
            Err(RouteError::NotFound {
                path: "feedback".into()
            })
        );
    }

    #[test]
    fn test_location_decodes_segments() {
        let loc = Location::parse("/feedback/ex%2042").unwrap();
        assert_eq!(loc.segments, vec!["feedback", "ex 42"]);
    }

    #[test]
    fn test_resolve_carries_query() {
        let resolved = router().resolve("/feedback/ex42?step=2").unwrap();
        assert_eq!(resolved.name, "Feedback");
        assert_eq!(resolved.params.get("exerciseId").unwrap(), "ex42");
        assert_eq!(resolved.query.as_deref(), Some("step=2"));
    }

    #[test]
    fn test_double_slash_never_matches() {
        assert!(matches!(
            router().resolve("//feedback"),
            Err(RouteError::NotFound { .. })
        ));
    }

    #[test]
    fn test_view_inputs_follow_props_mode() {
        let router = router();
        let home = router.resolve("/").unwrap();
        assert_eq!(home.view_inputs(), ViewInputs::State);

        let feedback = router.resolve("/feedback/ex42").unwrap();
        match feedback.view_inputs() {
            ViewInputs::Props(params) => assert_eq!(params.get("exerciseId").unwrap(), "ex42"),
            ViewInputs::State => panic!("expected props"),
        }
    }

    #[test]
    fn test_href_errors() {
        let router = router();
        assert_eq!(
            router.href("Nope", &Params::new()),
            Err(RouteError::UnknownRoute {
                name: "Nope".into()
            })
        );
        assert_eq!(
            router.href("Feedback", &Params::new()),
            Err(RouteError::MissingParameter {
                route: "Feedback".into(),
                param: "exerciseId".into()
            })
        );
    }

    #[test]
    fn test_href_ignores_extra_params() {
        let mut params = Params::new();
        params.insert("exerciseId".into(), "ex42".into());
        params.insert("extra".into(), "1".into());
        assert_eq!(router().href("Feedback", &params).unwrap(), "/feedback/ex42");
    }
}
