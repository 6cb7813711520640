//! Execution-context capabilities
//!
//! Browser tabs can navigate and tear a session down; a server render can do
//! neither and has to report auth failures as errors instead.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Route changes in a browser context
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Client-side navigation that keeps in-memory state
    fn push(&self, route: &str);

    /// Full navigation that rebuilds all client state
    fn replace(&self, route: &str);
}

/// How a route was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Push,
    Replace,
}

/// In-process navigator that records every visited route
#[derive(Clone, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<(NavigationKind, String)>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route of the most recent navigation
    pub fn current(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, route)| route.clone())
    }

    pub fn entries(&self) -> Vec<(NavigationKind, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, kind: NavigationKind, route: &str) {
        tracing::debug!(?kind, route, "Navigating");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, route.to_string()));
    }
}

impl Navigator for History {
    fn push(&self, route: &str) {
        self.record(NavigationKind::Push, route);
    }

    fn replace(&self, route: &str) {
        self.record(NavigationKind::Replace, route);
    }
}

/// Browser-only full sign-out
pub trait SessionTeardown: Send + Sync {
    /// Destroy credentials, notify sibling contexts and leave for the landing route
    fn sign_out(&self);
}

/// The context a request pipeline runs in
#[derive(Clone)]
pub enum Environment {
    Browser(Arc<dyn SessionTeardown>),
    Server,
}

impl Environment {
    pub const fn is_browser(&self) -> bool {
        matches!(self, Self::Browser(_))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser(_) => f.write_str("Environment::Browser"),
            Self::Server => f.write_str("Environment::Server"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_routes() {
        let history = History::new();
        assert_eq!(history.current(), None);

        history.push("/dashboard");
        history.replace("/");

        assert_eq!(history.current().as_deref(), Some("/"));
        assert_eq!(
            history.entries(),
            vec![
                (NavigationKind::Push, "/dashboard".to_string()),
                (NavigationKind::Replace, "/".to_string()),
            ]
        );
    }

    #[test]
    fn test_navigator_is_object_safe() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_replace()
            .withf(|route| route == "/dashboard")
            .times(1)
            .return_const(());

        let navigator: Arc<dyn Navigator> = Arc::new(navigator);
        navigator.replace("/dashboard");
    }
}
