//! JSON fixtures shaped like the portal backend's responses

use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use serde_json::{json, Value};
use campus_portal::models::EventRequest;

pub const DEPARTMENTS: [&str; 4] = ["CSE", "ECE", "MECH", "CIVIL"];

pub fn admin_json() -> Value {
    json!({ "id": 1, "username": "portal-admin", "email": "admin@campus.test" })
}

pub fn faculty_json(id: i64, approved: bool) -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    let phone: String = PhoneNumber().fake();
    json!({
        "id": id,
        "name": name,
        "email": email,
        "phone": phone,
        "department": DEPARTMENTS[id as usize % DEPARTMENTS.len()],
        "gender": "Female",
        "approved": approved,
        "assignedEventsCount": 0
    })
}

/// `approved` approved faculties followed by `pending` unapproved ones, ids from 1
pub fn faculties_json(approved: usize, pending: usize) -> Value {
    let rows: Vec<Value> = (0..approved + pending)
        .map(|i| faculty_json(i as i64 + 1, i < approved))
        .collect();
    Value::Array(rows)
}

pub fn student_json(id: i64) -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    json!({
        "id": id,
        "name": name,
        "email": email,
        "phone": "9876543210",
        "department": DEPARTMENTS[id as usize % DEPARTMENTS.len()],
        "gender": "Male"
    })
}

pub fn students_with_events_json(count: usize) -> Value {
    let rows: Vec<Value> = (1..=count as i64)
        .map(|id| {
            let mut student = student_json(id);
            student["registeredEvents"] = json!(["Hackathon"]);
            student
        })
        .collect();
    Value::Array(rows)
}

pub fn event_json(id: i64, faculty_id: i64) -> Value {
    let venue: String = CityName().fake();
    let description: String = Sentence(3..8).fake();
    json!({
        "id": id,
        "name": format!("Event {}", id),
        "description": description,
        "date": "2026-11-20",
        "venue": venue,
        "facultyId": faculty_id,
        "facultyName": "Dr. Rao"
    })
}

/// Events with ids 1..=count, all owned by faculty 1
pub fn events_json(count: usize) -> Value {
    let rows: Vec<Value> = (1..=count as i64).map(|id| event_json(id, 1)).collect();
    Value::Array(rows)
}

pub fn roster_row_json(student_id: i64, attendance: Option<bool>) -> Value {
    let name: String = Name().fake();
    json!({
        "studentId": student_id,
        "name": name,
        "email": format!("student{}@campus.test", student_id),
        "phone": "9000000000",
        "department": "CSE",
        "attendance": attendance
    })
}

pub fn event_request(faculty_id: Option<i64>) -> EventRequest {
    EventRequest {
        name: "Tech Talk".to_string(),
        description: "Talk on systems programming".to_string(),
        date: "2026-12-01".to_string(),
        venue: "Main Hall".to_string(),
        faculty_id,
    }
}
