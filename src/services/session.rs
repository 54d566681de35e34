//! Session guard
//!
//! Every view starts by asking the backend who the current actor is. A 401
//! from that call (or any later call made through the same view) schedules a
//! single delayed redirect to the role's login route.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use crate::models::Role;
use crate::services::client::ApiClient;
use crate::state::context::ViewContext;
use crate::utils::errors::Result;
use crate::utils::logging::log_session_check;

/// Performs navigation for the embedding application
pub trait Navigator: Send + Sync + fmt::Debug {
    fn navigate(&self, route: &str);
}

/// Navigator that only logs the route; used by the command-line front end
#[derive(Debug, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        info!(route = route, "Redirecting to login");
    }
}

/// Navigator that remembers every route it was asked to open
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        match self.routes.lock() {
            Ok(mut routes) => routes.push(route.to_string()),
            Err(poisoned) => poisoned.into_inner().push(route.to_string()),
        }
    }
}

/// At-most-once flag guarding the login redirect of one view
#[derive(Debug, Default)]
pub struct RedirectLatch {
    fired: AtomicBool,
}

impl RedirectLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for the first caller only
    pub fn try_claim(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Validates the server-side session on view entry
#[derive(Clone, Debug)]
pub struct SessionGuard {
    client: ApiClient,
}

impl SessionGuard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the identity payload for the context's role
    ///
    /// A 401 is returned as `PortalError::Unauthorized`; concluding the
    /// outcome on the context performs the redirect.
    pub async fn verify<T: DeserializeOwned>(&self, ctx: &ViewContext) -> Result<T> {
        let role = ctx.role();
        debug!(role = %role, view = ctx.name(), "Checking session");

        let result = ctx.run(self.client.get::<T>(role.identity_path())).await;
        match &result {
            Ok(_) => log_session_check(role, true, None),
            Err(e) if e.needs_reauth() => log_session_check(role, false, Some(&e.to_string())),
            Err(_) => {}
        }
        result
    }

    /// Identity check for callers that only need to know whether the session is alive
    pub async fn is_authenticated(&self, role: Role) -> Result<bool> {
        match self.client.get::<serde_json::Value>(role.identity_path()).await {
            Ok(_) => Ok(true),
            Err(e) if e.needs_reauth() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_latch_claims_once() {
        let latch = RedirectLatch::new();
        assert!(!latch.is_claimed());
        assert!(latch.try_claim());
        assert!(!latch.try_claim());
        assert!(latch.is_claimed());
    }

    #[test]
    fn test_latch_under_contention() {
        let latch = Arc::new(RedirectLatch::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.try_claim())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_recording_navigator() {
        let navigator = RecordingNavigator::new();
        navigator.navigate("/admin/login");
        assert_eq!(navigator.routes(), vec!["/admin/login".to_string()]);
    }
}
