//! Per-view context
//!
//! A `ViewContext` lives as long as the view that created it. Requests run
//! through [`ViewContext::run`] are abandoned once the view closes, and every
//! outcome is reported exactly once through [`ViewContext::conclude`].

use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use crate::config::SessionConfig;
use crate::models::Role;
use crate::services::notification::NotificationRelay;
use crate::services::session::{Navigator, RedirectLatch};
use crate::utils::errors::{PortalError, Result};

/// Success message to raise when an outcome concludes
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub key: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl Notice {
    pub fn new(key: &'static str) -> Self {
        Self { key, params: Vec::new() }
    }

    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }
}

#[derive(Debug)]
pub struct ViewContext {
    name: String,
    role: Role,
    lifetime: watch::Sender<bool>,
    latch: RedirectLatch,
    navigator: Arc<dyn Navigator>,
    session: SessionConfig,
    relay: NotificationRelay,
    redirect: Mutex<Option<JoinHandle<()>>>,
}

impl ViewContext {
    pub fn new(
        name: impl Into<String>,
        role: Role,
        navigator: Arc<dyn Navigator>,
        session: SessionConfig,
        relay: NotificationRelay,
    ) -> Self {
        let (lifetime, _) = watch::channel(false);
        Self {
            name: name.into(),
            role,
            lifetime,
            latch: RedirectLatch::new(),
            navigator,
            session,
            relay,
            redirect: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn relay(&self) -> &NotificationRelay {
        &self.relay
    }

    pub fn is_closed(&self) -> bool {
        *self.lifetime.borrow()
    }

    /// Tear the view down; in-flight requests resolve to `Cancelled`
    pub fn close(&self) {
        if !self.lifetime.send_replace(true) {
            debug!(view = %self.name, "View closed");
        }
    }

    /// Run a request bound to this view's lifetime
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let closed = self.lifetime.subscribe();
        tokio::select! {
            biased;
            _ = view_closed(closed) => Err(PortalError::Cancelled),
            result = operation => result,
        }
    }

    /// Schedule the login redirect; only the first caller per view succeeds
    pub fn redirect_to_login(&self) -> bool {
        if !self.latch.try_claim() {
            debug!(view = %self.name, "Redirect already scheduled");
            return false;
        }

        let route = self.session.login_route(self.role).to_string();
        let delay = self.session.redirect_delay();
        let navigator = Arc::clone(&self.navigator);
        let closed = self.lifetime.subscribe();
        let view = self.name.clone();

        info!(view = %view, route = %route, delay_ms = delay.as_millis() as u64, "Scheduling login redirect");
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => navigator.navigate(&route),
                _ = view_closed(closed) => {
                    debug!(view = %view, "View closed before redirect, abandoning it");
                }
            }
        });

        match self.redirect.lock() {
            Ok(mut slot) => *slot = Some(handle),
            Err(poisoned) => *poisoned.into_inner() = Some(handle),
        }
        true
    }

    /// Wait for a scheduled redirect to fire or be abandoned
    pub async fn settle(&self) {
        let handle = match self.redirect.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Report an outcome: one notification, or none if the view is gone
    ///
    /// A 401 schedules the login redirect; later 401s on the same view are
    /// silent. Results that arrive after the view closed are discarded.
    pub fn conclude<T, N>(&self, result: Result<T>, notice: N) -> Result<T>
    where
        N: FnOnce(&T) -> Notice,
    {
        if self.is_closed() {
            return Err(PortalError::Cancelled);
        }

        match &result {
            Ok(value) => {
                let notice = notice(value);
                self.relay.notify(notice.key, &notice.params);
            }
            Err(PortalError::Cancelled) => {}
            Err(e) if e.needs_reauth() => {
                if self.redirect_to_login() {
                    let route = self.session.login_route(self.role).to_string();
                    self.relay.notify("session_expired", &[("login_route", route)]);
                }
            }
            Err(PortalError::InvalidInput(message)) => {
                self.relay.notify("validation_failed", &[("message", message.clone())]);
            }
            Err(e) => {
                self.relay.notify_error(e);
            }
        }
        result
    }
}

/// Resolves once the view is closed or its context dropped
async fn view_closed(mut lifetime: watch::Receiver<bool>) {
    let _ = lifetime.wait_for(|closed| *closed).await;
}
