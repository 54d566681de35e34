//! Student views: dashboard, event catalog and registered events

use crate::models::{AttendanceSummary, Event, RegisteredEvent, Role};
use crate::services::{EventCatalog, PendingRegistration, PortalServices, StudentDashboard};
use crate::state::context::Notice;
use crate::state::view::ViewState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::filter_by_term;
use super::ViewCore;

#[derive(Debug)]
pub struct StudentDashboardView {
    core: ViewCore<StudentDashboard>,
}

impl_view_deref!(StudentDashboardView, StudentDashboard);

impl StudentDashboardView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "student_dashboard", Role::Student) }
    }

    pub async fn load(&mut self) -> &ViewState<StudentDashboard> {
        let result = self.core.services.fetcher.student_dashboard(&self.core.ctx).await;
        self.core.finish_load(result, |_| Notice::new("dashboard_loaded"))
    }

    pub fn attendance(&self) -> Option<AttendanceSummary> {
        self.core.state.data().map(StudentDashboard::attendance)
    }
}

/// Every event, with register / unregister toggles
#[derive(Debug)]
pub struct EventCatalogView {
    core: ViewCore<EventCatalog>,
    search: String,
}

impl_view_deref!(EventCatalogView, EventCatalog);

impl EventCatalogView {
    pub fn open(services: &PortalServices) -> Self {
        Self {
            core: ViewCore::open(services, "event_catalog", Role::Student),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) -> &ViewState<EventCatalog> {
        let result = self.core.guarded(self.core.services.fetcher.event_catalog(&self.core.ctx)).await;
        self.core
            .finish_load(result, |catalog| Notice::new("events_loaded").with("count", catalog.events.len()))
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// Matching events paired with their registration flag
    pub fn filtered(&self) -> Vec<(&Event, bool)> {
        match self.core.state.data() {
            Some(catalog) => filter_by_term(&catalog.events, &self.search)
                .into_iter()
                .map(|event| (event, catalog.is_registered(event.id)))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_registered(&self, event_id: i64) -> bool {
        self.core.state.data().map_or(false, |catalog| catalog.is_registered(event_id))
    }

    pub async fn register(&mut self, event_id: i64) -> Result<()> {
        self.set_registration(event_id, true).await
    }

    pub async fn unregister(&mut self, event_id: i64) -> Result<()> {
        self.set_registration(event_id, false).await
    }

    /// Flip the registration of one event
    pub async fn toggle(&mut self, event_id: i64) -> Result<()> {
        let register = !self.is_registered(event_id);
        self.set_registration(event_id, register).await
    }

    /// Show a registration change at once and return the request to send
    pub fn begin_registration(&mut self, event_id: i64, register: bool) -> Result<PendingRegistration> {
        match self.core.state.data_mut() {
            Some(catalog) => Ok(PendingRegistration::apply(catalog, event_id, register)),
            None => {
                let err = PortalError::InvalidInput("Events are not loaded yet".to_string());
                self.core.ctx.conclude(Err(err), |_: &PendingRegistration| Notice::new("event_registered"))
            }
        }
    }

    /// Send a begun change; the catalog stays readable meanwhile
    pub async fn submit_registration(&self, pending: &PendingRegistration) -> Result<()> {
        self.core.services.mutations.send_registration(&self.core.ctx, pending).await
    }

    /// Keep or revert the change and report the outcome
    pub fn finish_registration(&mut self, pending: PendingRegistration, result: Result<()>) -> Result<()> {
        let name = match self.core.state.data_mut() {
            Some(catalog) => {
                pending.settle(catalog, &result);
                catalog
                    .events
                    .iter()
                    .find(|event| event.id == pending.event_id)
                    .map(|event| event.name.clone())
                    .unwrap_or_default()
            }
            None => String::new(),
        };

        let key = if pending.register { "event_registered" } else { "event_unregistered" };
        self.core
            .ctx
            .conclude(result, |_| Notice::new(key).with("name", name))
    }

    async fn set_registration(&mut self, event_id: i64, register: bool) -> Result<()> {
        let pending = self.begin_registration(event_id, register)?;
        let result = self.submit_registration(&pending).await;
        self.finish_registration(pending, result)
    }
}

/// The current student's registrations with attendance
#[derive(Debug)]
pub struct RegisteredEventsView {
    core: ViewCore<Vec<RegisteredEvent>>,
}

impl_view_deref!(RegisteredEventsView, Vec<RegisteredEvent>);

impl RegisteredEventsView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "registered_events", Role::Student) }
    }

    pub async fn load(&mut self) -> &ViewState<Vec<RegisteredEvent>> {
        let result = self
            .core
            .guarded(self.core.services.fetcher.registered_events_with_attendance(&self.core.ctx))
            .await;
        self.core
            .finish_load(result, |events| Notice::new("events_loaded").with("count", events.len()))
    }

    pub fn summary(&self) -> AttendanceSummary {
        self.core
            .state
            .data()
            .map(|events| events.iter().map(|r| r.attendance).collect())
            .unwrap_or_default()
    }

    pub async fn unregister(&mut self, event_id: i64) -> Result<()> {
        let name = self
            .core
            .state
            .data()
            .and_then(|events| events.iter().find(|r| r.event.id == event_id))
            .map(|r| r.event.name.clone())
            .unwrap_or_default();
        let result = self.core.services.mutations.unregister_and_reload(&self.core.ctx, event_id).await;
        self.core.commit(result, |_| Notice::new("event_unregistered").with("name", name))
    }
}
