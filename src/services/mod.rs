//! Services module
//!
//! Backend access and the per-view session/data-sync services

pub mod auth;
pub mod client;
pub mod fetcher;
pub mod mutation;
pub mod notification;
pub mod session;

// Re-export commonly used services
pub use auth::{AuthService, Identity};
pub use client::ApiClient;
pub use fetcher::{AdminDashboard, DashboardTotals, DataFetcher, EventCatalog, EventRoster, FacultyDashboard, StudentDashboard};
pub use mutation::{FacultyDeletion, FixedReplacement, MutationDispatcher, PendingRegistration, ReassignmentPrompt};
pub use notification::{MessageTemplate, NotificationRelay, NotificationStats, Toast, ToastLevel};
pub use session::{LoggingNavigator, Navigator, RecordingNavigator, RedirectLatch, SessionGuard};

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::models::Role;
use crate::state::context::ViewContext;
use crate::utils::errors::Result;

/// Service factory bundling everything a view needs
///
/// All services share one `ApiClient`, and with it one cookie store, so a
/// login through `auth` authenticates every view opened afterwards.
#[derive(Clone, Debug)]
pub struct PortalServices {
    pub settings: Settings,
    pub client: ApiClient,
    pub auth: AuthService,
    pub guard: SessionGuard,
    pub fetcher: DataFetcher,
    pub mutations: MutationDispatcher,
    pub relay: NotificationRelay,
    navigator: Arc<dyn Navigator>,
}

impl PortalServices {
    /// Create all services from validated settings
    pub fn new(settings: Settings, navigator: Arc<dyn Navigator>) -> Result<Self> {
        settings.validate()?;

        let client = ApiClient::new(&settings.backend)?;
        let auth = AuthService::new(client.clone());
        let guard = SessionGuard::new(client.clone());
        let fetcher = DataFetcher::new(client.clone(), guard.clone());
        let mutations = MutationDispatcher::new(client.clone(), fetcher.clone());
        let relay = NotificationRelay::new(settings.notifications.clone());

        Ok(Self {
            settings,
            client,
            auth,
            guard,
            fetcher,
            mutations,
            relay,
            navigator,
        })
    }

    /// Open a context for a new view of `role`
    pub fn open_view(&self, name: &str, role: Role) -> ViewContext {
        ViewContext::new(
            name,
            role,
            Arc::clone(&self.navigator),
            self.settings.session.clone(),
            self.relay.clone(),
        )
    }

    /// Health check: is there a live session for `role`
    pub async fn health_check(&self, role: Role) -> ServiceHealthStatus {
        let session = self.guard.is_authenticated(role).await;
        ServiceHealthStatus {
            backend_reachable: session.is_ok(),
            session_valid: matches!(session, Ok(true)),
            visible_notifications: self.relay.visible().len(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceHealthStatus {
    pub backend_reachable: bool,
    pub session_valid: bool,
    pub visible_notifications: usize,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.backend_reachable && self.session_valid
    }

    /// Get list of problems
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.backend_reachable {
            issues.push("Backend unreachable".to_string());
        } else if !self.session_valid {
            issues.push("No valid session".to_string());
        }

        issues
    }
}
