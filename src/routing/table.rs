//! The route table.
//!
//! # Responsibilities
//! - Hold route definitions in declaration order
//! - Enforce table invariants at construction time
//! - Look routes up by name for programmatic navigation
//!
//! # Design Decisions
//! - Immutable after construction; shared via `Arc`
//! - Construction fails on the first broken invariant, naming the routes involved
//! - Appending a route re-checks only the new route against the existing ones

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::routing::pattern::{PathPattern, PatternError};

/// Opaque handle to the view a route activates.
///
/// The resolver carries it through to the navigation result and never looks
/// inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ViewRef(&'static str);

impl ViewRef {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &'static str {
        self.0
    }
}

/// A route as written in a literal table.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub view: ViewRef,
    /// Pass captured parameters to the view as direct inputs.
    pub props: bool,
}

/// A validated route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDef {
    pub name: String,
    pub pattern: PathPattern,
    pub view: ViewRef,
    pub props: bool,
}

impl RouteDef {
    pub fn new(
        name: impl Into<String>,
        path: &str,
        view: ViewRef,
        props: bool,
    ) -> Result<Self, TableError> {
        let name = name.into();
        let pattern = PathPattern::parse(path).map_err(|source| TableError::Pattern {
            route: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            pattern,
            view,
            props,
        })
    }
}

impl TryFrom<&RouteSpec> for RouteDef {
    type Error = TableError;

    fn try_from(spec: &RouteSpec) -> Result<Self, Self::Error> {
        RouteDef::new(spec.name, spec.path, spec.view, spec.props)
    }
}

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("route {route:?} has an invalid pattern: {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("route name {0:?} is declared more than once")]
    DuplicateName(String),

    #[error("routes {first:?} ({first_pattern}) and {second:?} ({second_pattern}) can match the same path")]
    Ambiguous {
        first: String,
        first_pattern: String,
        second: String,
        second_pattern: String,
    },
}

/// Ordered, immutable set of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// Build a table, checking every invariant.
    pub fn new(routes: impl IntoIterator<Item = RouteDef>) -> Result<Self, TableError> {
        routes
            .into_iter()
            .try_fold(Self::default(), |table, route| table.with_route(route))
    }

    /// Build a table from a literal list.
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self, TableError> {
        let routes = specs
            .iter()
            .map(RouteDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(routes)
    }

    /// Append a route after the existing ones.
    pub fn with_route(mut self, route: RouteDef) -> Result<Self, TableError> {
        if self.by_name.contains_key(&route.name) {
            return Err(TableError::DuplicateName(route.name));
        }

        if let Some(existing) = self
            .routes
            .iter()
            .find(|existing| existing.pattern.overlaps(&route.pattern))
        {
            return Err(TableError::Ambiguous {
                first: existing.name.clone(),
                first_pattern: existing.pattern.to_string(),
                second: route.name,
                second_pattern: route.pattern.to_string(),
            });
        }

        self.by_name.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RouteDef> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    /// Routes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDef> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: ViewRef = ViewRef::new("View");

    fn route(name: &str, path: &str) -> RouteDef {
        RouteDef::new(name, path, VIEW, false).unwrap()
    }

    #[test]
    fn test_table_keeps_declaration_order() {
        let table = RouteTable::new(vec![
            route("Home", "/"),
            route("Results", "/results"),
            route("Feedback", "/feedback/:id"),
        ])
        .unwrap();

        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Results", "Feedback"]);
        assert_eq!(table.get("Results").unwrap().pattern.as_str(), "/results");
        assert!(table.get("Missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = RouteTable::new(vec![route("Home", "/"), route("Home", "/home")]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateName(name) if name == "Home"));
    }

    #[test]
    fn test_ambiguous_patterns_rejected() {
        let err = RouteTable::new(vec![
            route("Feedback", "/feedback/:id"),
            route("NewFeedback", "/feedback/new"),
        ])
        .unwrap_err();
        match err {
            TableError::Ambiguous { first, second, .. } => {
                assert_eq!(first, "Feedback");
                assert_eq!(second, "NewFeedback");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_pattern_names_route() {
        let err = RouteDef::new("Broken", "broken", VIEW, false).unwrap_err();
        assert!(matches!(err, TableError::Pattern { route, .. } if route == "Broken"));
    }

    #[test]
    fn test_with_route_appends() {
        let table = RouteTable::new(vec![route("Home", "/")]).unwrap();
        let table = table.with_route(route("ThankYou", "/thank-you")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().last().unwrap().name, "ThankYou");
    }
}
