//! Mock portal backend for testing
//!
//! Wraps a wiremock `MockServer` and builds `PortalServices` pointed at it,
//! with a recording navigator and a short redirect delay.

use std::sync::Arc;
use std::time::Duration;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};
use campus_portal::config::Settings;
use campus_portal::services::{PortalServices, RecordingNavigator};

/// Redirect delay used by every test service
pub const TEST_REDIRECT_DELAY_MS: u64 = 20;

pub struct PortalMockServer {
    pub server: MockServer,
    pub navigator: Arc<RecordingNavigator>,
}

impl PortalMockServer {
    pub async fn new() -> Self {
        super::init_test_logging();
        Self {
            server: MockServer::start().await,
            navigator: Arc::new(RecordingNavigator::new()),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Settings pointing at this server
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.backend.base_url = self.server.uri();
        settings.backend.timeout_seconds = 5;
        settings.backend.connect_timeout_seconds = 2;
        settings.session.redirect_delay_ms = TEST_REDIRECT_DELAY_MS;
        settings
    }

    pub fn services(&self) -> PortalServices {
        PortalServices::new(self.settings(), self.navigator.clone()).expect("test settings should be valid")
    }

    /// Routes the navigator was asked to open
    pub fn redirects(&self) -> Vec<String> {
        self.navigator.routes()
    }

    pub async fn mock_json(&self, http_method: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_text(&self, http_method: &str, route: &str, status: u16, body: &str) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Respond after `delay`, long enough for a view to close first
    pub async fn mock_delayed_json(&self, http_method: &str, route: &str, body: Value, delay: Duration) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Match only requests carrying `key=value`; mount before the catch-all for the same route
    pub async fn mock_with_query(
        &self,
        http_method: &str,
        route: &str,
        key: &str,
        value: &str,
        status: u16,
        body: &str,
    ) {
        Mock::given(method(http_method))
            .and(path(route))
            .and(query_param(key, value))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_unauthorized(&self, http_method: &str, route: &str) {
        self.mock_json(http_method, route, 401, json!({ "message": "Not logged in" }))
            .await;
    }

    /// 400 carrying a machine-readable rejection code
    pub async fn mock_rejection(&self, http_method: &str, route: &str, code: &str, message: &str) {
        self.mock_json(http_method, route, 400, json!({ "code": code, "message": message }))
            .await;
    }

    pub async fn mock_admin_session(&self) {
        self.mock_json("GET", "/api/admin/me", 200, super::admin_json()).await;
    }

    pub async fn mock_faculty_session(&self, faculty_id: i64) {
        self.mock_json("GET", "/api/faculty/me", 200, super::faculty_json(faculty_id, true))
            .await;
    }

    pub async fn mock_student_session(&self, student_id: i64) {
        self.mock_json("GET", "/api/students/profile", 200, super::student_json(student_id))
            .await;
    }

    /// Number of requests the server saw for `route`
    pub async fn requests_to(&self, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == route)
            .count()
    }
}
