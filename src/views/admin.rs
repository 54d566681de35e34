//! Admin views: dashboard, faculty and student directories, approvals and event management

use serde::Serialize;
use crate::models::faculty::assignable;
use crate::models::{Event, EventRequest, Faculty, FacultyUpdate, Role, StudentAttendance, StudentUpdate, StudentWithEvents};
use crate::services::{AdminDashboard, DashboardTotals, FacultyDeletion, PortalServices, ReassignmentPrompt};
use crate::state::context::Notice;
use crate::state::view::ViewState;
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::filter_by_term;
use super::ViewCore;

// ----- dashboard -----

#[derive(Debug)]
pub struct AdminDashboardView {
    core: ViewCore<AdminDashboard>,
}

impl_view_deref!(AdminDashboardView, AdminDashboard);

impl AdminDashboardView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "admin_dashboard", Role::Admin) }
    }

    pub async fn load(&mut self) -> &ViewState<AdminDashboard> {
        let result = self.core.services.fetcher.admin_dashboard(&self.core.ctx).await;
        self.core.finish_load(result, |_| Notice::new("dashboard_loaded"))
    }

    pub fn totals(&self) -> Option<DashboardTotals> {
        self.core.state.data().map(AdminDashboard::totals)
    }
}

// ----- faculty directory -----

#[derive(Debug)]
pub struct FacultyDirectoryView {
    core: ViewCore<Vec<Faculty>>,
    search: String,
}

impl_view_deref!(FacultyDirectoryView, Vec<Faculty>);

impl FacultyDirectoryView {
    pub fn open(services: &PortalServices) -> Self {
        Self {
            core: ViewCore::open(services, "faculty_directory", Role::Admin),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) -> &ViewState<Vec<Faculty>> {
        let result = self.core.guarded(self.core.services.fetcher.faculties(&self.core.ctx)).await;
        self.core
            .finish_load(result, |faculties| Notice::new("faculties_loaded").with("count", faculties.len()))
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// Faculties matching the search box, in backend order
    pub fn filtered(&self) -> Vec<&Faculty> {
        self.core
            .state
            .data()
            .map(|faculties| filter_by_term(faculties, &self.search))
            .unwrap_or_default()
    }

    pub fn find(&self, faculty_id: i64) -> Option<&Faculty> {
        self.core.state.data()?.iter().find(|f| f.id == faculty_id)
    }

    pub async fn update(&mut self, faculty_id: i64, update: &FacultyUpdate) -> Result<()> {
        let result = self.core.services.mutations.update_faculty(&self.core.ctx, faculty_id, update).await;
        self.core.commit(result, |_| Notice::new("faculty_updated"))
    }

    /// Delete a faculty, walking through reassignment when it still owns events
    pub async fn delete<P>(&mut self, faculty_id: i64, prompt: &P) -> Result<FacultyDeletion>
    where
        P: ReassignmentPrompt + ?Sized,
    {
        let directory = self.core.state.data().cloned().unwrap_or_default();
        let faculty = match directory.iter().find(|f| f.id == faculty_id) {
            Some(faculty) => faculty.clone(),
            None => {
                let err = PortalError::InvalidInput(format!("Faculty {} is not in the directory", faculty_id));
                return self.core.ctx.conclude(Err(err), |_: &FacultyDeletion| Notice::new("faculty_deleted"));
            }
        };

        let result = self
            .core
            .services
            .mutations
            .delete_faculty(&self.core.ctx, &faculty, &directory, prompt)
            .await;

        let outcome = self.core.ctx.conclude(result, |outcome| match outcome {
            FacultyDeletion::Deleted { .. } => Notice::new("faculty_deleted"),
            FacultyDeletion::Cancelled => Notice::new("reassignment_cancelled"),
        })?;

        if let FacultyDeletion::Deleted { faculties, .. } = &outcome {
            self.core.state = ViewState::Ready(faculties.clone());
        }
        Ok(outcome)
    }
}

// ----- pending approvals -----

#[derive(Debug)]
pub struct UnapprovedFacultiesView {
    core: ViewCore<Vec<Faculty>>,
}

impl_view_deref!(UnapprovedFacultiesView, Vec<Faculty>);

impl UnapprovedFacultiesView {
    pub fn open(services: &PortalServices) -> Self {
        Self { core: ViewCore::open(services, "unapproved_faculties", Role::Admin) }
    }

    pub async fn load(&mut self) -> &ViewState<Vec<Faculty>> {
        let result = self
            .core
            .guarded(self.core.services.fetcher.unapproved_faculties(&self.core.ctx))
            .await;
        self.core
            .finish_load(result, |faculties| Notice::new("faculties_loaded").with("count", faculties.len()))
    }

    pub async fn approve(&mut self, faculty_id: i64) -> Result<()> {
        let result = self.core.services.mutations.approve_faculty(&self.core.ctx, faculty_id).await;
        self.core.commit(result, |_| Notice::new("faculty_approved"))
    }

    pub async fn reject(&mut self, faculty_id: i64, reason: &str) -> Result<()> {
        let result = self
            .core
            .services
            .mutations
            .reject_faculty(&self.core.ctx, faculty_id, reason)
            .await;
        self.core.commit(result, |_| Notice::new("faculty_rejected"))
    }
}

// ----- student directory -----

#[derive(Debug)]
pub struct StudentDirectoryView {
    core: ViewCore<Vec<StudentWithEvents>>,
    search: String,
}

impl_view_deref!(StudentDirectoryView, Vec<StudentWithEvents>);

impl StudentDirectoryView {
    pub fn open(services: &PortalServices) -> Self {
        Self {
            core: ViewCore::open(services, "student_directory", Role::Admin),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) -> &ViewState<Vec<StudentWithEvents>> {
        let result = self
            .core
            .guarded(self.core.services.fetcher.students_with_events(&self.core.ctx))
            .await;
        self.core
            .finish_load(result, |students| Notice::new("students_loaded").with("count", students.len()))
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn filtered(&self) -> Vec<&StudentWithEvents> {
        self.core
            .state
            .data()
            .map(|students| filter_by_term(students, &self.search))
            .unwrap_or_default()
    }

    pub async fn update(&mut self, student_id: i64, update: &StudentUpdate) -> Result<()> {
        let result = self.core.services.mutations.update_student(&self.core.ctx, student_id, update).await;
        self.core.commit(result, |_| Notice::new("student_updated"))
    }

    pub async fn delete(&mut self, student_id: i64) -> Result<()> {
        let result = self.core.services.mutations.delete_student(&self.core.ctx, student_id).await;
        self.core.commit(result, |_| Notice::new("student_deleted"))
    }
}

// ----- event management -----

/// Events plus the faculty list the assignment pickers offer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventManagement {
    pub events: Vec<Event>,
    pub faculties: Vec<Faculty>,
}

impl EventManagement {
    /// Faculties an event may be assigned to
    pub fn assignable_faculties(&self) -> Vec<&Faculty> {
        assignable(&self.faculties, None)
    }
}

#[derive(Debug)]
pub struct EventManagerView {
    core: ViewCore<EventManagement>,
    search: String,
}

impl_view_deref!(EventManagerView, EventManagement);

impl EventManagerView {
    pub fn open(services: &PortalServices) -> Self {
        Self {
            core: ViewCore::open(services, "event_manager", Role::Admin),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) -> &ViewState<EventManagement> {
        let fetcher = &self.core.services.fetcher;
        let ctx = &self.core.ctx;
        let management = async {
            let (events, faculties) = fetcher.event_management(ctx).await?;
            Ok::<_, PortalError>(EventManagement { events, faculties })
        };
        let result = self.core.guarded(management).await;
        self.core
            .finish_load(result, |data| Notice::new("events_loaded").with("count", data.events.len()))
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn filtered(&self) -> Vec<&Event> {
        self.core
            .state
            .data()
            .map(|data| filter_by_term(&data.events, &self.search))
            .unwrap_or_default()
    }

    fn faculties(&self) -> Vec<Faculty> {
        self.core.state.data().map(|d| d.faculties.clone()).unwrap_or_default()
    }

    /// Store refreshed events, keeping the faculty list already loaded
    fn apply_events(&mut self, result: Result<Vec<Event>>, notice: Notice) -> Result<()> {
        let events = self.core.ctx.conclude(result, |_| notice)?;
        match self.core.state.data_mut() {
            Some(data) => data.events = events,
            None => {
                self.core.state = ViewState::Ready(EventManagement { events, faculties: Vec::new() });
            }
        }
        Ok(())
    }

    pub async fn create(&mut self, request: &EventRequest) -> Result<()> {
        let faculties = self.faculties();
        let result = self.core.services.mutations.create_event(&self.core.ctx, request, &faculties).await;
        self.apply_events(result, Notice::new("event_created").with("name", &request.name))
    }

    pub async fn update(&mut self, event_id: i64, request: &EventRequest) -> Result<()> {
        let faculties = self.faculties();
        let result = self
            .core
            .services
            .mutations
            .update_event(&self.core.ctx, event_id, request, &faculties)
            .await;
        self.apply_events(result, Notice::new("event_updated").with("name", &request.name))
    }

    pub async fn delete(&mut self, event_id: i64) -> Result<()> {
        let result = self.core.services.mutations.delete_event(&self.core.ctx, event_id).await;
        self.apply_events(result, Notice::new("event_deleted"))
    }

    pub async fn reassign(&mut self, event_id: i64, faculty_id: i64) -> Result<()> {
        let faculties = self.faculties();
        let result = self
            .core
            .services
            .mutations
            .reassign_event(&self.core.ctx, event_id, faculty_id, &faculties)
            .await;
        self.apply_events(result, Notice::new("event_reassigned"))
    }

    /// Students registered for one event, with their attendance
    pub async fn registered_students(&self, event_id: i64) -> Result<Vec<StudentAttendance>> {
        let result = self.core.services.fetcher.event_students(&self.core.ctx, event_id).await;
        self.core
            .ctx
            .conclude(result, |rows| Notice::new("roster_loaded").with("count", rows.len()))
    }
}
