//! Navigation state and history.
//!
//! The navigator owns the current navigation state and a history stack the
//! way browser history mode does. Every navigation resolves first; only a
//! successful resolution touches state, so a failed attempt leaves both the
//! current entry and the history untouched.

use crate::routing::pattern::Params;
use crate::routing::router::{ResolvedRoute, RouteError, Router, ViewInputs};
use crate::routing::table::ViewRef;

/// Read-only projection of the active route handed to views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    route: ResolvedRoute,
    /// Increments once per successful navigation.
    sequence: u64,
}

impl NavigationState {
    pub fn route_name(&self) -> &str {
        &self.route.name
    }

    pub fn path(&self) -> &str {
        &self.route.path
    }

    pub fn query(&self) -> Option<&str> {
        self.route.query.as_deref()
    }

    pub fn view(&self) -> ViewRef {
        self.route.view
    }

    pub fn params(&self) -> &Params {
        &self.route.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.params.get(name).map(String::as_str)
    }

    pub fn view_inputs(&self) -> ViewInputs<'_> {
        self.route.view_inputs()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn resolved(&self) -> &ResolvedRoute {
        &self.route
    }
}

/// History-mode navigator.
#[derive(Debug)]
pub struct Navigator {
    router: Router,
    entries: Vec<ResolvedRoute>,
    index: usize,
    current: Option<NavigationState>,
    sequence: u64,
}

impl Navigator {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            entries: Vec::new(),
            index: 0,
            current: None,
            sequence: 0,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The active route, if any navigation has succeeded yet.
    pub fn current(&self) -> Option<&NavigationState> {
        self.current.as_ref()
    }

    /// Number of history entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Navigate to a path, adding a history entry.
    ///
    /// Forward entries beyond the current one are discarded.
    pub fn push(&mut self, target: &str) -> Result<&NavigationState, RouteError> {
        let route = self.router.resolve(target)?;
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(route);
        self.index = self.entries.len() - 1;
        Ok(self.activate())
    }

    pub fn push_named(&mut self, name: &str, params: &Params) -> Result<&NavigationState, RouteError> {
        let path = self.router.href(name, params)?;
        self.push(&path)
    }

    /// Navigate to a path, overwriting the current history entry.
    pub fn replace(&mut self, target: &str) -> Result<&NavigationState, RouteError> {
        let route = self.router.resolve(target)?;
        if self.entries.is_empty() {
            self.entries.push(route);
            self.index = 0;
        } else {
            self.entries[self.index] = route;
        }
        Ok(self.activate())
    }

    pub fn replace_named(
        &mut self,
        name: &str,
        params: &Params,
    ) -> Result<&NavigationState, RouteError> {
        let path = self.router.href(name, params)?;
        self.replace(&path)
    }

    pub fn back(&mut self) -> Option<&NavigationState> {
        self.go(-1)
    }

    pub fn forward(&mut self) -> Option<&NavigationState> {
        self.go(1)
    }

    /// Move `delta` entries through history.
    ///
    /// Returns `None` and changes nothing when the target entry does not exist.
    pub fn go(&mut self, delta: isize) -> Option<&NavigationState> {
        if self.entries.is_empty() || delta == 0 {
            return None;
        }
        let target = self.index.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.index = target;
        tracing::debug!(index = target, delta, "History traversal");
        Some(self.activate())
    }

    fn activate(&mut self) -> &NavigationState {
        self.sequence += 1;
        let route = self.entries[self.index].clone();
        tracing::debug!(route = %route.name, path = %route.path, sequence = self.sequence, "Navigation committed");
        self.current.insert(NavigationState {
            route,
            sequence: self.sequence,
        })
    }
}
