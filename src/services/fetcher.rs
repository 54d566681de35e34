//! Data fetcher
//!
//! Collection reads for every view. Independent reads are joined with
//! `tokio::try_join!`; reads keyed on the result of a primary read run
//! concurrently with `join_all` and degrade per record instead of failing
//! the whole view. Every request goes through the caller's [`ViewContext`].

use std::collections::HashSet;
use std::future::Future;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};
use crate::models::{
    Admin, Attendance, AttendanceSummary, Event, Faculty, RegisteredEvent, Student, StudentAttendance,
    StudentWithEvents,
};
use crate::services::client::ApiClient;
use crate::services::session::SessionGuard;
use crate::state::context::ViewContext;
use crate::utils::errors::Result;
use crate::utils::logging::log_enrichment_degraded;

/// Everything the admin dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub admin: Admin,
    pub faculties: Vec<Faculty>,
    pub students: Vec<StudentWithEvents>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub faculties: usize,
    pub approved_faculties: usize,
    pub pending_faculties: usize,
    pub students: usize,
    pub events: usize,
}

impl AdminDashboard {
    pub fn totals(&self) -> DashboardTotals {
        let approved = self.faculties.iter().filter(|f| f.approved).count();
        DashboardTotals {
            faculties: self.faculties.len(),
            approved_faculties: approved,
            pending_faculties: self.faculties.len() - approved,
            students: self.students.len(),
            events: self.events.len(),
        }
    }
}

/// An assigned event with its roster; `None` when the roster could not be loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRoster {
    pub event: Event,
    pub roster: Option<Vec<StudentAttendance>>,
}

impl EventRoster {
    pub fn is_available(&self) -> bool {
        self.roster.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacultyDashboard {
    pub faculty: Faculty,
    pub events: Vec<EventRoster>,
}

impl FacultyDashboard {
    /// Attendance over every loaded roster row
    pub fn attendance(&self) -> AttendanceSummary {
        self.roster_rows().map(|row| row.attendance).collect()
    }

    pub fn student_count(&self) -> usize {
        self.roster_rows().count()
    }

    pub fn unavailable_rosters(&self) -> usize {
        self.events.iter().filter(|e| !e.is_available()).count()
    }

    fn roster_rows(&self) -> impl Iterator<Item = &StudentAttendance> {
        self.events.iter().filter_map(|e| e.roster.as_ref()).flatten()
    }
}

/// All events plus the ids the current student is registered for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCatalog {
    pub events: Vec<Event>,
    pub registered: HashSet<i64>,
}

impl EventCatalog {
    pub fn is_registered(&self, event_id: i64) -> bool {
        self.registered.contains(&event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub total_events: usize,
    pub registered: Vec<RegisteredEvent>,
}

impl StudentDashboard {
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn not_registered_count(&self) -> usize {
        self.total_events.saturating_sub(self.registered.len())
    }

    pub fn attendance(&self) -> AttendanceSummary {
        self.registered.iter().map(|r| r.attendance).collect()
    }
}

#[derive(Clone, Debug)]
pub struct DataFetcher {
    client: ApiClient,
    guard: SessionGuard,
}

impl DataFetcher {
    pub fn new(client: ApiClient, guard: SessionGuard) -> Self {
        Self { client, guard }
    }

    /// Current identity of the context's role, decoded as `T`
    pub async fn identity<T: serde::de::DeserializeOwned>(&self, ctx: &ViewContext) -> Result<T> {
        self.guard.verify(ctx).await
    }

    /// Check the session, then run `fetch`; nothing is fetched when the check fails
    pub async fn guarded<T, F>(&self, ctx: &ViewContext, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.guard.verify::<serde_json::Value>(ctx).await?;
        fetch.await
    }

    // ----- admin -----

    pub async fn admin_dashboard(&self, ctx: &ViewContext) -> Result<AdminDashboard> {
        let admin: Admin = self.guard.verify(ctx).await?;
        let (faculties, students, events) = tokio::try_join!(
            self.faculties(ctx),
            self.students_with_events(ctx),
            self.admin_events(ctx),
        )?;

        info!(
            faculties = faculties.len(),
            students = students.len(),
            events = events.len(),
            "Admin dashboard loaded"
        );
        Ok(AdminDashboard { admin, faculties, students, events })
    }

    pub async fn faculties(&self, ctx: &ViewContext) -> Result<Vec<Faculty>> {
        ctx.run(self.client.get("/api/admin/faculties")).await
    }

    pub async fn unapproved_faculties(&self, ctx: &ViewContext) -> Result<Vec<Faculty>> {
        ctx.run(self.client.get("/api/admin/unapproved-faculties")).await
    }

    pub async fn students_with_events(&self, ctx: &ViewContext) -> Result<Vec<StudentWithEvents>> {
        ctx.run(self.client.get("/api/admin/students")).await
    }

    pub async fn admin_events(&self, ctx: &ViewContext) -> Result<Vec<Event>> {
        ctx.run(self.client.get("/api/admin/events")).await
    }

    /// Events together with the faculty list used for assignment pickers
    pub async fn event_management(&self, ctx: &ViewContext) -> Result<(Vec<Event>, Vec<Faculty>)> {
        tokio::try_join!(self.admin_events(ctx), self.faculties(ctx))
    }

    pub async fn event_students(&self, ctx: &ViewContext, event_id: i64) -> Result<Vec<StudentAttendance>> {
        let path = format!("/api/admin/events/{}/students", event_id);
        ctx.run(self.client.get(&path)).await
    }

    // ----- faculty -----

    pub async fn faculty_dashboard(&self, ctx: &ViewContext) -> Result<FacultyDashboard> {
        let faculty: Faculty = self.guard.verify(ctx).await?;
        let events = self.assigned_events(ctx).await?;
        let events = self.with_rosters(ctx, events).await;
        Ok(FacultyDashboard { faculty, events })
    }

    pub async fn assigned_events(&self, ctx: &ViewContext) -> Result<Vec<Event>> {
        ctx.run(self.client.get("/api/faculty/events")).await
    }

    pub async fn event_roster(&self, ctx: &ViewContext, event_id: i64) -> Result<Vec<StudentAttendance>> {
        let path = format!("/api/faculty/events/{}/students", event_id);
        ctx.run(self.client.get(&path)).await
    }

    /// Load every event's roster concurrently; a failed roster is marked unavailable
    pub async fn with_rosters(&self, ctx: &ViewContext, events: Vec<Event>) -> Vec<EventRoster> {
        let rosters = join_all(events.iter().map(|event| self.event_roster(ctx, event.id))).await;

        events
            .into_iter()
            .zip(rosters)
            .map(|(event, roster)| {
                let roster = match roster {
                    Ok(rows) => Some(rows),
                    Err(e) => {
                        log_enrichment_degraded("event_roster", event.id, &e.to_string());
                        None
                    }
                };
                EventRoster { event, roster }
            })
            .collect()
    }

    // ----- student -----

    pub async fn student_profile(&self, ctx: &ViewContext) -> Result<Student> {
        self.guard.verify(ctx).await
    }

    pub async fn student_events(&self, ctx: &ViewContext) -> Result<Vec<Event>> {
        ctx.run(self.client.get("/api/students/events")).await
    }

    pub async fn registered_events(&self, ctx: &ViewContext) -> Result<Vec<Event>> {
        ctx.run(self.client.get("/api/students/registered-events")).await
    }

    pub async fn event_catalog(&self, ctx: &ViewContext) -> Result<EventCatalog> {
        let (events, registered) = tokio::try_join!(self.student_events(ctx), self.registered_events(ctx))?;
        let registered = registered.iter().map(|e| e.id).collect();
        Ok(EventCatalog { events, registered })
    }

    /// The current student's attendance for one event
    pub async fn event_attendance(&self, ctx: &ViewContext, event_id: i64) -> Result<Attendance> {
        let path = format!("/api/students/events/{}/attendance", event_id);
        let flag: Option<bool> = ctx.run(self.client.get_optional(&path)).await?;
        Ok(Attendance::from_flag(flag))
    }

    /// Registered events joined with attendance, in registration order
    pub async fn registered_events_with_attendance(&self, ctx: &ViewContext) -> Result<Vec<RegisteredEvent>> {
        let events = self.registered_events(ctx).await?;
        Ok(self.with_attendance(ctx, events).await)
    }

    /// Look up attendance per event concurrently; a failed lookup reads as not marked
    pub async fn with_attendance(&self, ctx: &ViewContext, events: Vec<Event>) -> Vec<RegisteredEvent> {
        let lookups = join_all(events.iter().map(|event| self.event_attendance(ctx, event.id))).await;

        events
            .into_iter()
            .zip(lookups)
            .map(|(event, attendance)| {
                let attendance = attendance.unwrap_or_else(|e| {
                    log_enrichment_degraded("event_attendance", event.id, &e.to_string());
                    Attendance::NotMarked
                });
                RegisteredEvent { event, attendance }
            })
            .collect()
    }

    pub async fn student_dashboard(&self, ctx: &ViewContext) -> Result<StudentDashboard> {
        let student = self.student_profile(ctx).await?;
        let (events, registered) = tokio::try_join!(
            self.student_events(ctx),
            self.registered_events_with_attendance(ctx),
        )?;

        debug!(total = events.len(), registered = registered.len(), "Student dashboard loaded");
        Ok(StudentDashboard {
            student,
            total_events: events.len(),
            registered,
        })
    }
}
