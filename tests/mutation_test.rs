//! Writes: refetch after success, reassignment, optimistic toggles, attendance

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};
use campus_portal::models::{Attendance, Faculty, Role};
use campus_portal::services::{FacultyDeletion, FixedReplacement, PortalServices, ReassignmentPrompt};
use campus_portal::views::{
    AssignedEventsView, EventCatalogView, EventManagerView, FacultyDirectoryView, StudentDirectoryView,
    UnapprovedFacultiesView,
};
use campus_portal::{PortalError, RejectionKind};
use helpers::*;

async fn loaded_directory(mock: &PortalMockServer, services: &PortalServices) -> FacultyDirectoryView {
    mock.mock_admin_session().await;
    mock.mock_json("GET", "/api/admin/faculties", 200, faculties_json(3, 0)).await;
    let mut view = FacultyDirectoryView::open(services);
    assert!(view.load().await.is_ready());
    view
}

#[tokio::test]
async fn test_delete_faculty_retries_with_replacement() {
    let mock = PortalMockServer::new().await;
    mock.mock_with_query("DELETE", "/api/admin/faculties/2", "replacementFacultyId", "3", 200, "Faculty deleted")
        .await;
    mock.mock_rejection(
        "DELETE",
        "/api/admin/faculties/2",
        "REASSIGNMENT_REQUIRED",
        "Faculty is assigned to 2 events",
    )
    .await;
    let services = mock.services();
    let mut view = loaded_directory(&mock, &services).await;

    let outcome = view.delete(2, &FixedReplacement(Some(3))).await.expect("delete should succeed");
    assert_matches!(outcome, FacultyDeletion::Deleted { replacement: Some(3), .. });

    assert_eq!(mock.requests_to("/api/admin/faculties/2").await, 2);
    // initial load plus the refetch after the delete
    assert_eq!(mock.requests_to("/api/admin/faculties").await, 2);

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("faculty_deleted"), Some(&1));
    assert_eq!(stats.total_failure, 0);
}

/// Answers with the next scripted choice and counts how often it was asked
struct ScriptedPrompt {
    choices: Vec<i64>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    fn new(choices: &[i64]) -> Self {
        Self { choices: choices.to_vec(), calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReassignmentPrompt for ScriptedPrompt {
    fn choose_replacement(&self, _faculty: &Faculty, _candidates: &[Faculty], _reason: &str) -> Option<i64> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.choices.get(call).copied()
    }
}

#[tokio::test]
async fn test_prompt_is_asked_again_after_rejected_replacement() {
    let mock = PortalMockServer::new().await;
    mock.mock_with_query("DELETE", "/api/admin/faculties/2", "replacementFacultyId", "3", 200, "Faculty deleted")
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/faculties/2"))
        .and(query_param("replacementFacultyId", "1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "REASSIGNMENT_REQUIRED",
            "message": "Faculty 1 cannot take more events"
        })))
        .mount(&mock.server)
        .await;
    mock.mock_rejection("DELETE", "/api/admin/faculties/2", "REASSIGNMENT_REQUIRED", "Reassign first")
        .await;
    let services = mock.services();
    let mut view = loaded_directory(&mock, &services).await;

    let prompt = ScriptedPrompt::new(&[1, 3]);
    let outcome = view.delete(2, &prompt).await.expect("second choice should succeed");

    assert_matches!(outcome, FacultyDeletion::Deleted { replacement: Some(3), .. });
    assert_eq!(prompt.calls(), 2);
    assert_eq!(mock.requests_to("/api/admin/faculties/2").await, 3);

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("faculty_deleted"), Some(&1));
    assert_eq!(stats.total_failure, 0);
}

#[tokio::test]
async fn test_plain_text_rejection_starts_reassignment_by_default() {
    let mock = PortalMockServer::new().await;
    mock.mock_with_query("DELETE", "/api/admin/faculties/1", "replacementFacultyId", "2", 200, "Faculty deleted")
        .await;
    mock.mock_text(
        "DELETE",
        "/api/admin/faculties/1",
        400,
        "Faculty has assigned events. Provide replacementFacultyId.",
    )
    .await;
    let services = mock.services();
    let mut view = loaded_directory(&mock, &services).await;

    let outcome = view.delete(1, &FixedReplacement(Some(2))).await.expect("delete should succeed");
    assert_matches!(outcome, FacultyDeletion::Deleted { replacement: Some(2), .. });
    assert_eq!(mock.requests_to("/api/admin/faculties/1").await, 2);
}

#[tokio::test]
async fn test_failed_refetch_after_delete_drops_row_locally() {
    let mock = PortalMockServer::new().await;
    mock.mock_admin_session().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/faculties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(faculties_json(3, 0)))
        .up_to_n_times(1)
        .mount(&mock.server)
        .await;
    mock.mock_json("GET", "/api/admin/faculties", 503, json!({ "message": "Try again later" }))
        .await;
    mock.mock_text("DELETE", "/api/admin/faculties/2", 200, "Faculty deleted").await;
    let services = mock.services();

    let mut view = FacultyDirectoryView::open(&services);
    assert!(view.load().await.is_ready());

    let outcome = view.delete(2, &FixedReplacement(None)).await.expect("delete went through");
    assert_matches!(outcome, FacultyDeletion::Deleted { replacement: None, .. });

    let ids: Vec<i64> = view.state().data().map(|rows| rows.iter().map(|f| f.id).collect()).unwrap_or_default();
    assert_eq!(ids, vec![1, 3]);
    assert!(view.find(2).is_none());

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("faculty_deleted"), Some(&1));
    assert_eq!(stats.total_failure, 0);
}

#[tokio::test]
async fn test_declined_reassignment_cancels_delete() {
    let mock = PortalMockServer::new().await;
    mock.mock_rejection("DELETE", "/api/admin/faculties/1", "REASSIGNMENT_REQUIRED", "Reassign first")
        .await;
    let services = mock.services();
    let mut view = loaded_directory(&mock, &services).await;

    let outcome = view.delete(1, &FixedReplacement(None)).await.expect("cancel is not an error");
    assert_eq!(outcome, FacultyDeletion::Cancelled);
    assert_eq!(mock.requests_to("/api/admin/faculties/1").await, 1);
    assert_eq!(view.state().data().map(Vec::len), Some(3));
    assert_eq!(services.relay.get_stats().sent_by_template.get("reassignment_cancelled"), Some(&1));
}

#[tokio::test]
async fn test_replacement_must_be_another_approved_faculty() {
    let mock = PortalMockServer::new().await;
    mock.mock_rejection("DELETE", "/api/admin/faculties/2", "REASSIGNMENT_REQUIRED", "Reassign first")
        .await;
    let services = mock.services();
    let mut view = loaded_directory(&mock, &services).await;

    let result = view.delete(2, &FixedReplacement(Some(2))).await;
    assert_matches!(result, Err(PortalError::InvalidInput(_)));
    assert_eq!(mock.requests_to("/api/admin/faculties/2").await, 1);
    assert_eq!(services.relay.get_stats().sent_by_template.get("validation_failed"), Some(&1));
}

#[tokio::test]
async fn test_legacy_rejection_text_triggers_reassignment() {
    let mock = PortalMockServer::new().await;
    mock.mock_with_query("DELETE", "/api/admin/faculties/1", "replacementFacultyId", "2", 200, "Faculty deleted")
        .await;
    mock.mock_text(
        "DELETE",
        "/api/admin/faculties/1",
        400,
        "Faculty is still assigned to events. Please reassign them first.",
    )
    .await;

    let mut settings = mock.settings();
    settings.backend.legacy_rejection_phrases = vec!["still assigned".to_string()];
    let services = PortalServices::new(settings, mock.navigator.clone()).expect("settings should be valid");
    let mut view = loaded_directory(&mock, &services).await;

    let outcome = view.delete(1, &FixedReplacement(Some(2))).await.expect("delete should succeed");
    assert_matches!(outcome, FacultyDeletion::Deleted { replacement: Some(2), .. });
}

#[tokio::test]
async fn test_failed_registration_reverts_toggle() {
    let mock = PortalMockServer::new().await;
    mock.mock_student_session(3).await;
    mock.mock_json("GET", "/api/students/events", 200, events_json(3)).await;
    mock.mock_json("GET", "/api/students/registered-events", 200, json!([event_json(3, 1)]))
        .await;
    mock.mock_json("POST", "/api/students/register-event/2", 500, json!({ "message": "Registration closed" }))
        .await;
    mock.mock_rejection("POST", "/api/students/unregister-event/3", "NOT_REGISTERED", "Not registered")
        .await;
    let services = mock.services();

    let mut view = EventCatalogView::open(&services);
    view.load().await;

    assert_matches!(view.register(2).await, Err(PortalError::Http { status: 500, .. }));
    assert!(!view.is_registered(2));

    assert_matches!(
        view.unregister(3).await,
        Err(PortalError::Rejected { kind: RejectionKind::NotRegistered, .. })
    );
    assert!(view.is_registered(3));

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("request_failed"), Some(&2));
    // toggles never refetch the catalog
    assert_eq!(mock.requests_to("/api/students/events").await, 1);
}

#[tokio::test]
async fn test_registration_shows_before_backend_confirms() {
    let mock = PortalMockServer::new().await;
    mock.mock_student_session(3).await;
    mock.mock_json("GET", "/api/students/events", 200, events_json(2)).await;
    mock.mock_json("GET", "/api/students/registered-events", 200, json!([])).await;
    mock.mock_delayed_json(
        "POST",
        "/api/students/register-event/1",
        json!({ "message": "Registered successfully" }),
        Duration::from_millis(300),
    )
    .await;
    let services = mock.services();

    let mut view = EventCatalogView::open(&services);
    view.load().await;

    let pending = view.begin_registration(1, true).expect("catalog is loaded");
    let (result, shown_while_pending) = tokio::join!(view.submit_registration(&pending), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        view.is_registered(1)
    });
    assert!(shown_while_pending);
    assert_eq!(services.relay.get_stats().sent_by_template.get("event_registered"), None);

    view.finish_registration(pending, result).expect("registration should succeed");
    assert!(view.is_registered(1));
    assert_eq!(services.relay.get_stats().sent_by_template.get("event_registered"), Some(&1));
}

#[tokio::test]
async fn test_toggle_registers_then_unregisters() {
    let mock = PortalMockServer::new().await;
    mock.mock_student_session(3).await;
    mock.mock_json("GET", "/api/students/events", 200, events_json(2)).await;
    mock.mock_json("GET", "/api/students/registered-events", 200, json!([])).await;
    mock.mock_text("POST", "/api/students/register-event/1", 200, "Registered successfully").await;
    mock.mock_text("POST", "/api/students/unregister-event/1", 200, "Unregistered successfully").await;
    let services = mock.services();

    let mut view = EventCatalogView::open(&services);
    view.load().await;

    view.toggle(1).await.expect("register should succeed");
    assert!(view.is_registered(1));
    view.toggle(1).await.expect("unregister should succeed");
    assert!(!view.is_registered(1));

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("event_registered"), Some(&1));
    assert_eq!(stats.sent_by_template.get("event_unregistered"), Some(&1));
}

#[tokio::test]
async fn test_marking_attendance_updates_one_row() {
    let mock = PortalMockServer::new().await;
    mock.mock_faculty_session(7).await;
    mock.mock_json("GET", "/api/faculty/events", 200, json!([event_json(5, 7)])).await;
    mock.mock_json(
        "GET",
        "/api/faculty/events/5/students",
        200,
        json!([roster_row_json(11, None), roster_row_json(12, None), roster_row_json(13, Some(false))]),
    )
    .await;
    mock.mock_with_query("POST", "/api/faculty/events/5/attendance", "studentId", "12", 200, "Attendance marked")
        .await;
    let services = mock.services();

    let mut view = AssignedEventsView::open(&services);
    view.load().await;
    view.mark_attendance(5, 12, true).await.expect("marking should succeed");

    let roster: Vec<(i64, Attendance)> = view
        .roster(5)
        .expect("roster should be loaded")
        .iter()
        .map(|row| (row.student_id, row.attendance))
        .collect();
    assert_eq!(
        roster,
        vec![(11, Attendance::NotMarked), (12, Attendance::Present), (13, Attendance::Absent)]
    );
    assert_eq!(mock.requests_to("/api/faculty/events/5/students").await, 1);
    assert_eq!(services.relay.get_stats().sent_by_template.get("attendance_marked"), Some(&1));
}

#[tokio::test]
async fn test_attendance_for_unknown_student_is_rejected_locally() {
    let mock = PortalMockServer::new().await;
    mock.mock_faculty_session(7).await;
    mock.mock_json("GET", "/api/faculty/events", 200, json!([event_json(5, 7)])).await;
    mock.mock_json("GET", "/api/faculty/events/5/students", 200, json!([roster_row_json(11, None)]))
        .await;
    let services = mock.services();

    let mut view = AssignedEventsView::open(&services);
    view.load().await;

    assert_matches!(view.mark_attendance(5, 99, false).await, Err(PortalError::InvalidInput(_)));
    assert_eq!(mock.requests_to("/api/faculty/events/5/attendance").await, 0);
}

#[tokio::test]
async fn test_create_event_refetches_and_checks_owner() {
    let mock = PortalMockServer::new().await;
    mock.mock_admin_session().await;
    mock.mock_json("GET", "/api/admin/events", 200, events_json(2)).await;
    mock.mock_json("GET", "/api/admin/faculties", 200, faculties_json(1, 1)).await;
    mock.mock_text("POST", "/api/admin/create-event", 200, "Event created").await;
    let services = mock.services();

    let mut view = EventManagerView::open(&services);
    view.load().await;
    assert_eq!(view.state().data().map(|d| d.assignable_faculties().len()), Some(1));

    // faculty 2 is still pending approval
    assert_matches!(view.create(&event_request(Some(2))).await, Err(PortalError::InvalidInput(_)));
    assert_eq!(mock.requests_to("/api/admin/create-event").await, 0);

    view.create(&event_request(Some(1))).await.expect("create should succeed");
    assert_eq!(mock.requests_to("/api/admin/create-event").await, 1);
    assert_eq!(mock.requests_to("/api/admin/events").await, 2);

    let stats = services.relay.get_stats();
    assert_eq!(stats.sent_by_template.get("validation_failed"), Some(&1));
    assert_eq!(stats.sent_by_template.get("event_created"), Some(&1));
}

#[tokio::test]
async fn test_reject_requires_a_reason() {
    let mock = PortalMockServer::new().await;
    mock.mock_admin_session().await;
    mock.mock_json("GET", "/api/admin/unapproved-faculties", 200, faculties_json(0, 2)).await;
    mock.mock_with_query("PUT", "/api/admin/reject-faculty/1", "reason", "Incomplete documents", 200, "Rejected")
        .await;
    let services = mock.services();

    let mut view = UnapprovedFacultiesView::open(&services);
    view.load().await;

    assert_matches!(view.reject(1, "   ").await, Err(PortalError::InvalidInput(_)));
    assert_eq!(mock.requests_to("/api/admin/reject-faculty/1").await, 0);

    view.reject(1, "Incomplete documents").await.expect("reject should succeed");
    assert_eq!(mock.requests_to("/api/admin/unapproved-faculties").await, 2);
}

#[tokio::test]
async fn test_unauthorized_mutation_redirects_to_login() {
    let mock = PortalMockServer::new().await;
    mock.mock_admin_session().await;
    mock.mock_json("GET", "/api/admin/students", 200, students_with_events_json(2)).await;
    mock.mock_unauthorized("DELETE", "/api/admin/students/1").await;
    let services = mock.services();

    let mut view = StudentDirectoryView::open(&services);
    view.load().await;

    assert_matches!(view.delete(1).await, Err(PortalError::Unauthorized(_)));
    view.context().settle().await;

    assert_eq!(mock.redirects(), vec!["/admin/login".to_string()]);
    assert_eq!(view.state().data().map(Vec::len), Some(2));
    assert_eq!(view.context().role(), Role::Admin);
}
