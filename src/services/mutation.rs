//! Mutation dispatcher
//!
//! Each write is a single request followed by a fresh read of the collection
//! it touched. Registration toggles and attendance marks are the exceptions:
//! they edit the caller's local state in place.

use serde::Serialize;
use tracing::{debug, warn};
use crate::models::faculty::assignable;
use crate::models::{
    Admin, AdminUpdate, Event, EventRequest, Faculty, FacultyUpdate, PasswordChange, Role, Student,
    StudentAttendance, StudentPasswordChange, StudentUpdate, StudentWithEvents,
};
use crate::services::client::ApiClient;
use crate::services::fetcher::{DataFetcher, EventCatalog};
use crate::state::context::ViewContext;
use crate::utils::errors::{PortalError, Result};
use crate::utils::logging::log_mutation;

/// Picks a replacement owner for the events of a faculty being deleted
pub trait ReassignmentPrompt: Send + Sync {
    /// Return the replacement id, or `None` to cancel the delete
    fn choose_replacement(&self, faculty: &Faculty, candidates: &[Faculty], reason: &str) -> Option<i64>;
}

/// Prompt that always answers with the same choice
#[derive(Debug, Clone, Copy)]
pub struct FixedReplacement(pub Option<i64>);

impl ReassignmentPrompt for FixedReplacement {
    fn choose_replacement(&self, _faculty: &Faculty, _candidates: &[Faculty], _reason: &str) -> Option<i64> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FacultyDeletion {
    Deleted {
        replacement: Option<i64>,
        faculties: Vec<Faculty>,
    },
    Cancelled,
}

/// A registration toggle shown in the catalog before the backend confirms it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "settle the pending registration once the request returns"]
pub struct PendingRegistration {
    pub event_id: i64,
    pub register: bool,
    changed: bool,
}

impl PendingRegistration {
    /// Flip the event in `catalog` right away
    pub fn apply(catalog: &mut EventCatalog, event_id: i64, register: bool) -> Self {
        let changed = if register {
            catalog.registered.insert(event_id)
        } else {
            catalog.registered.remove(&event_id)
        };
        Self { event_id, register, changed }
    }

    /// Keep the change on success, undo it on failure
    pub fn settle(self, catalog: &mut EventCatalog, result: &Result<()>) {
        if result.is_ok() || !self.changed {
            return;
        }
        debug!(event_id = self.event_id, register = self.register, "Reverting registration toggle");
        if self.register {
            catalog.registered.remove(&self.event_id);
        } else {
            catalog.registered.insert(self.event_id);
        }
    }
}

#[derive(Clone, Debug)]
pub struct MutationDispatcher {
    client: ApiClient,
    fetcher: DataFetcher,
}

impl MutationDispatcher {
    pub fn new(client: ApiClient, fetcher: DataFetcher) -> Self {
        Self { client, fetcher }
    }

    /// Run one write and log its outcome
    async fn dispatch<F>(&self, ctx: &ViewContext, action: &str, target: Option<i64>, request: F) -> Result<String>
    where
        F: std::future::Future<Output = Result<String>>,
    {
        let result = ctx.run(request).await;
        match &result {
            Ok(_) => log_mutation(action, target, true, None),
            Err(PortalError::Cancelled) => debug!(action = action, "Mutation abandoned with its view"),
            Err(e) => log_mutation(action, target, false, Some(&e.to_string())),
        }
        result
    }

    // ----- events -----

    pub async fn create_event(&self, ctx: &ViewContext, request: &EventRequest, faculties: &[Faculty]) -> Result<Vec<Event>> {
        validate_event(request, faculties)?;
        self.dispatch(ctx, "create_event", None, self.client.post("/api/admin/create-event", request))
            .await?;
        self.fetcher.admin_events(ctx).await
    }

    pub async fn update_event(
        &self,
        ctx: &ViewContext,
        event_id: i64,
        request: &EventRequest,
        faculties: &[Faculty],
    ) -> Result<Vec<Event>> {
        validate_event(request, faculties)?;
        let path = format!("/api/admin/events/{}", event_id);
        self.dispatch(ctx, "update_event", Some(event_id), self.client.put(&path, request))
            .await?;
        self.fetcher.admin_events(ctx).await
    }

    pub async fn delete_event(&self, ctx: &ViewContext, event_id: i64) -> Result<Vec<Event>> {
        let path = format!("/api/admin/events/{}", event_id);
        self.dispatch(ctx, "delete_event", Some(event_id), self.client.delete(&path, &[]))
            .await?;
        self.fetcher.admin_events(ctx).await
    }

    pub async fn reassign_event(
        &self,
        ctx: &ViewContext,
        event_id: i64,
        faculty_id: i64,
        faculties: &[Faculty],
    ) -> Result<Vec<Event>> {
        ensure_assignable(faculty_id, faculties, None)?;
        let path = format!("/api/admin/events/{}/reassign/{}", event_id, faculty_id);
        self.dispatch(ctx, "reassign_event", Some(event_id), self.client.put_query(&path, &[]))
            .await?;
        self.fetcher.admin_events(ctx).await
    }

    // ----- faculties -----

    pub async fn approve_faculty(&self, ctx: &ViewContext, faculty_id: i64) -> Result<Vec<Faculty>> {
        let path = format!("/api/admin/approve-faculty/{}", faculty_id);
        self.dispatch(ctx, "approve_faculty", Some(faculty_id), self.client.put_query(&path, &[]))
            .await?;
        self.fetcher.unapproved_faculties(ctx).await
    }

    pub async fn reject_faculty(&self, ctx: &ViewContext, faculty_id: i64, reason: &str) -> Result<Vec<Faculty>> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PortalError::InvalidInput("A rejection reason is required".to_string()));
        }

        let path = format!("/api/admin/reject-faculty/{}", faculty_id);
        let query = [("reason", reason.to_string())];
        self.dispatch(ctx, "reject_faculty", Some(faculty_id), self.client.put_query(&path, &query))
            .await?;
        self.fetcher.unapproved_faculties(ctx).await
    }

    pub async fn update_faculty(&self, ctx: &ViewContext, faculty_id: i64, update: &FacultyUpdate) -> Result<Vec<Faculty>> {
        update.validate()?;
        let path = format!("/api/admin/faculties/{}", faculty_id);
        self.dispatch(ctx, "update_faculty", Some(faculty_id), self.client.put(&path, update))
            .await?;
        self.fetcher.faculties(ctx).await
    }

    /// Delete a faculty, asking for a replacement owner while the backend
    /// reports assigned events
    ///
    /// The prompt is asked again after every rejected attempt. Candidates are
    /// the approved faculties in `directory` other than the one being deleted.
    /// If the directory cannot be re-read after a successful delete, the
    /// deleted row is dropped from `directory` instead.
    pub async fn delete_faculty<P>(
        &self,
        ctx: &ViewContext,
        faculty: &Faculty,
        directory: &[Faculty],
        prompt: &P,
    ) -> Result<FacultyDeletion>
    where
        P: ReassignmentPrompt + ?Sized,
    {
        let path = format!("/api/admin/faculties/{}", faculty.id);
        let mut replacement: Option<i64> = None;

        loop {
            let query: Vec<(&str, String)> = replacement
                .map(|id| vec![("replacementFacultyId", id.to_string())])
                .unwrap_or_default();

            match ctx.run(self.client.delete(&path, &query)).await {
                Ok(_) => {
                    log_mutation("delete_faculty", Some(faculty.id), true, None);
                    let faculties = match self.fetcher.faculties(ctx).await {
                        Ok(faculties) => faculties,
                        Err(e) if e.needs_reauth() || matches!(e, PortalError::Cancelled) => return Err(e),
                        Err(e) => {
                            // the row is gone server-side either way
                            warn!(faculty_id = faculty.id, error = %e, "Refetch after delete failed, dropping the row locally");
                            directory.iter().filter(|f| f.id != faculty.id).cloned().collect()
                        }
                    };
                    return Ok(FacultyDeletion::Deleted { replacement, faculties });
                }
                Err(e) if e.requires_reassignment() => {
                    warn!(faculty_id = faculty.id, replacement = replacement, "Delete blocked by assigned events");
                    let candidates: Vec<Faculty> = assignable(directory, Some(faculty.id))
                        .into_iter()
                        .cloned()
                        .collect();

                    match prompt.choose_replacement(faculty, &candidates, &e.user_message()) {
                        Some(id) => {
                            ensure_assignable(id, &candidates, Some(faculty.id))?;
                            replacement = Some(id);
                        }
                        None => {
                            debug!(faculty_id = faculty.id, "Reassignment cancelled");
                            return Ok(FacultyDeletion::Cancelled);
                        }
                    }
                }
                Err(e) => {
                    if !matches!(e, PortalError::Cancelled) {
                        log_mutation("delete_faculty", Some(faculty.id), false, Some(&e.to_string()));
                    }
                    return Err(e);
                }
            }
        }
    }

    // ----- students -----

    pub async fn update_student(
        &self,
        ctx: &ViewContext,
        student_id: i64,
        update: &StudentUpdate,
    ) -> Result<Vec<StudentWithEvents>> {
        update.validate()?;
        let path = format!("/api/admin/students/{}", student_id);
        self.dispatch(ctx, "update_student", Some(student_id), self.client.put(&path, update))
            .await?;
        self.fetcher.students_with_events(ctx).await
    }

    pub async fn delete_student(&self, ctx: &ViewContext, student_id: i64) -> Result<Vec<StudentWithEvents>> {
        let path = format!("/api/admin/students/{}", student_id);
        self.dispatch(ctx, "delete_student", Some(student_id), self.client.delete(&path, &[]))
            .await?;
        self.fetcher.students_with_events(ctx).await
    }

    /// Send a registration change already applied to the catalog
    ///
    /// The catalog is not touched here, so it can be read while the request
    /// is in flight. Hand the result to [`PendingRegistration::settle`].
    pub async fn send_registration(&self, ctx: &ViewContext, pending: &PendingRegistration) -> Result<()> {
        let event_id = pending.event_id;
        let (action, path) = if pending.register {
            ("register_event", format!("/api/students/register-event/{}", event_id))
        } else {
            ("unregister_event", format!("/api/students/unregister-event/{}", event_id))
        };
        self.dispatch(ctx, action, Some(event_id), self.client.post_query(&path, &[]))
            .await
            .map(|_| ())
    }

    /// Unregister from the registered-events list and reload it
    pub async fn unregister_and_reload(
        &self,
        ctx: &ViewContext,
        event_id: i64,
    ) -> Result<Vec<crate::models::RegisteredEvent>> {
        let path = format!("/api/students/unregister-event/{}", event_id);
        self.dispatch(ctx, "unregister_event", Some(event_id), self.client.post_query(&path, &[]))
            .await?;
        self.fetcher.registered_events_with_attendance(ctx).await
    }

    // ----- attendance -----

    /// Mark one student present or absent; only that roster row changes
    pub async fn mark_attendance(
        &self,
        ctx: &ViewContext,
        event_id: i64,
        roster: &mut [StudentAttendance],
        student_id: i64,
        present: bool,
    ) -> Result<()> {
        if !roster.iter().any(|row| row.student_id == student_id) {
            return Err(PortalError::InvalidInput(format!(
                "Student {} is not registered for event {}",
                student_id, event_id
            )));
        }

        let path = format!("/api/faculty/events/{}/attendance", event_id);
        let query = [("studentId", student_id.to_string()), ("present", present.to_string())];
        self.dispatch(ctx, "mark_attendance", Some(event_id), self.client.post_query(&path, &query))
            .await?;

        if let Some(row) = roster.iter_mut().find(|row| row.student_id == student_id) {
            row.attendance = present.into();
        }
        Ok(())
    }

    // ----- profiles -----

    pub async fn update_admin_profile(&self, ctx: &ViewContext, update: &AdminUpdate) -> Result<Admin> {
        update.validate()?;
        self.dispatch(ctx, "update_profile", None, self.client.put("/api/admin/update", update))
            .await?;
        self.fetcher.identity(ctx).await
    }

    pub async fn update_faculty_profile(&self, ctx: &ViewContext, update: &FacultyUpdate) -> Result<Faculty> {
        update.validate()?;
        self.dispatch(ctx, "update_profile", None, self.client.put("/api/faculty/update", update))
            .await?;
        self.fetcher.identity(ctx).await
    }

    pub async fn update_student_profile(&self, ctx: &ViewContext, update: &StudentUpdate) -> Result<Student> {
        update.validate()?;
        self.dispatch(ctx, "update_profile", None, self.client.put("/api/students/profile", update))
            .await?;
        self.fetcher.identity(ctx).await
    }

    /// Change the password of the context's role
    pub async fn change_password(&self, ctx: &ViewContext, change: PasswordChange) -> Result<()> {
        if change.new_password.len() < 6 {
            return Err(PortalError::InvalidInput(
                "New password must be at least 6 characters".to_string(),
            ));
        }

        let result = match ctx.role() {
            Role::Admin => {
                self.dispatch(ctx, "change_password", None, self.client.put("/api/admin/update-password", &change))
                    .await
            }
            Role::Faculty => {
                self.dispatch(ctx, "change_password", None, self.client.put("/api/faculty/update-password", &change))
                    .await
            }
            Role::Student => {
                let body = StudentPasswordChange::from(change);
                self.dispatch(ctx, "change_password", None, self.client.put("/api/students/profile/password", &body))
                    .await
            }
        };
        result.map(|_| ())
    }
}

/// Event form checks, including that a chosen owner is an approved faculty
fn validate_event(request: &EventRequest, faculties: &[Faculty]) -> Result<()> {
    request.validate()?;
    if let Some(faculty_id) = request.faculty_id {
        ensure_assignable(faculty_id, faculties, None)?;
    }
    Ok(())
}

fn ensure_assignable(faculty_id: i64, faculties: &[Faculty], exclude: Option<i64>) -> Result<()> {
    if assignable(faculties, exclude).iter().any(|f| f.id == faculty_id) {
        Ok(())
    } else {
        Err(PortalError::InvalidInput(format!(
            "Faculty {} is not an approved faculty that can own events",
            faculty_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn faculty(id: i64, approved: bool) -> Faculty {
        Faculty {
            id,
            name: format!("F{}", id),
            email: format!("f{}@campus.edu", id),
            phone: String::new(),
            department: "CSE".to_string(),
            gender: String::new(),
            approved,
            assigned_events_count: 0,
        }
    }

    #[test]
    fn test_event_owner_must_be_approved() {
        let faculties = vec![faculty(1, true), faculty(2, false)];
        let mut request = EventRequest {
            name: "Expo".to_string(),
            description: String::new(),
            date: "2025-02-01".to_string(),
            venue: "Hall".to_string(),
            faculty_id: Some(1),
        };
        assert!(validate_event(&request, &faculties).is_ok());

        request.faculty_id = Some(2);
        assert_matches!(validate_event(&request, &faculties), Err(PortalError::InvalidInput(_)));

        request.faculty_id = None;
        assert!(validate_event(&request, &faculties).is_ok());
    }

    #[test]
    fn test_pending_registration_reverts_only_on_failure() {
        let mut catalog = EventCatalog { events: Vec::new(), registered: [3].into_iter().collect() };

        let pending = PendingRegistration::apply(&mut catalog, 1, true);
        assert!(catalog.is_registered(1));
        pending.settle(&mut catalog, &Ok(()));
        assert!(catalog.is_registered(1));

        let pending = PendingRegistration::apply(&mut catalog, 3, false);
        assert!(!catalog.is_registered(3));
        pending.settle(&mut catalog, &Err(PortalError::Http { status: 500, message: "down".to_string() }));
        assert!(catalog.is_registered(3));

        // nothing to undo when the event was already registered
        let pending = PendingRegistration::apply(&mut catalog, 1, true);
        pending.settle(&mut catalog, &Err(PortalError::Cancelled));
        assert!(catalog.is_registered(1));
    }

    #[test]
    fn test_replacement_cannot_be_the_deleted_faculty() {
        let faculties = vec![faculty(1, true), faculty(3, true)];
        assert!(ensure_assignable(3, &faculties, Some(1)).is_ok());
        assert!(ensure_assignable(1, &faculties, Some(1)).is_err());
    }
}
