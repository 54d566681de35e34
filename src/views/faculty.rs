//! Faculty views: dashboard and assigned-event rosters

use crate::models::{AttendanceSummary, Role, StudentAttendance};
use crate::services::{EventRoster, FacultyDashboard, PortalServices};
use crate::state::context::Notice;
use crate::state::view::ViewState;
use crate::utils::errors::{PortalError, Result};
use super::ViewCore;

#[derive(Debug)]
pub struct FacultyDashboardView {
    core: ViewCore<FacultyDashboard>,
}

impl_view_deref!(FacultyDashboardView, FacultyDashboard);

impl FacultyDashboardView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "faculty_dashboard", Role::Faculty) }
    }

    pub async fn load(&mut self) -> &ViewState<FacultyDashboard> {
        let result = self.core.services.fetcher.faculty_dashboard(&self.core.ctx).await;
        self.core.finish_load(result, |_| Notice::new("dashboard_loaded"))
    }

    pub fn attendance(&self) -> Option<AttendanceSummary> {
        self.core.state.data().map(FacultyDashboard::attendance)
    }
}

/// Assigned events with one roster open for attendance marking
#[derive(Debug)]
pub struct AssignedEventsView {
    core: ViewCore<Vec<EventRoster>>,
}

impl_view_deref!(AssignedEventsView, Vec<EventRoster>);

impl AssignedEventsView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "assigned_events", Role::Faculty) }
    }

    pub async fn load(&mut self) -> &ViewState<Vec<EventRoster>> {
        let fetcher = &self.core.services.fetcher;
        let ctx = &self.core.ctx;
        let rosters = async {
            let events = fetcher.assigned_events(ctx).await?;
            Ok::<_, PortalError>(fetcher.with_rosters(ctx, events).await)
        };
        let result = self.core.guarded(rosters).await;
        self.core
            .finish_load(result, |events| Notice::new("events_loaded").with("count", events.len()))
    }

    pub fn roster(&self, event_id: i64) -> Option<&[StudentAttendance]> {
        self.core
            .state
            .data()?
            .iter()
            .find(|entry| entry.event.id == event_id)?
            .roster
            .as_deref()
    }

    /// Re-fetch a single roster, e.g. after it failed to load
    pub async fn reload_roster(&mut self, event_id: i64) -> Result<()> {
        let result = self.core.services.fetcher.event_roster(&self.core.ctx, event_id).await;
        let rows = self
            .core
            .ctx
            .conclude(result, |rows| Notice::new("roster_loaded").with("count", rows.len()))?;

        if let Some(entry) = self
            .core
            .state
            .data_mut()
            .and_then(|events| events.iter_mut().find(|entry| entry.event.id == event_id))
        {
            entry.roster = Some(rows);
        }
        Ok(())
    }

    /// Mark one student's attendance; only that roster cell changes
    pub async fn mark_attendance(&mut self, event_id: i64, student_id: i64, present: bool) -> Result<()> {
        let core = &mut self.core;
        let roster = core
            .state
            .data_mut()
            .and_then(|events| events.iter_mut().find(|entry| entry.event.id == event_id))
            .and_then(|entry| entry.roster.as_mut());

        let result = match roster {
            Some(rows) => {
                let name = rows
                    .iter()
                    .find(|row| row.student_id == student_id)
                    .map(|row| row.name.clone())
                    .unwrap_or_default();
                core.services
                    .mutations
                    .mark_attendance(&core.ctx, event_id, rows, student_id, present)
                    .await
                    .map(|_| name)
            }
            None => Err(PortalError::InvalidInput(format!("No roster loaded for event {}", event_id))),
        };

        let status = if present { "present" } else { "absent" };
        core.ctx
            .conclude(result, |name| Notice::new("attendance_marked").with("student", name).with("status", status))
            .map(|_| ())
    }
}
