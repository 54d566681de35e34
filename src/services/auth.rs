//! Authentication service implementation
//!
//! Login, logout and the account flows that run outside a signed-in view:
//! student signup, faculty self-registration, password setup and recovery,
//! and the public contact form.

use serde::Serialize;
use tracing::{debug, info, warn};
use crate::models::{
    Admin, ContactRequest, Faculty, FacultyRegistration, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest, Role, Student, StudentSignup,
};
use crate::services::client::ApiClient;
use crate::utils::errors::{PortalError, RejectionKind, Result};
use crate::utils::helpers::is_valid_email;

/// The signed-in actor, as reported by the role's identity endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
pub enum Identity {
    Admin(Admin),
    Faculty(Faculty),
    Student(Student),
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Admin(_) => Role::Admin,
            Identity::Faculty(_) => Role::Faculty,
            Identity::Student(_) => Role::Student,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Admin(admin) => &admin.username,
            Identity::Faculty(faculty) => &faculty.name,
            Identity::Student(student) => &student.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Admin(admin) => &admin.email,
            Identity::Faculty(faculty) => &faculty.email,
            Identity::Student(student) => &student.email,
        }
    }
}

/// Authentication service for the portal's account flows
#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and return the identity the new session belongs to
    ///
    /// A 401 from the login endpoint means bad credentials, not an expired
    /// session, so it is reported as a rejection.
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<Identity> {
        if !is_valid_email(email) {
            return Err(PortalError::InvalidInput(format!("Invalid email address: {}", email)));
        }
        if password.is_empty() {
            return Err(PortalError::InvalidInput("Password is required".to_string()));
        }

        debug!(role = %role, email = email, "Logging in");
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.client.post(&role.login_path(), &request).await {
            Ok(_) => {}
            Err(PortalError::Unauthorized(message)) => {
                warn!(role = %role, email = email, "Login rejected");
                return Err(PortalError::Rejected {
                    kind: RejectionKind::InvalidCredentials,
                    message,
                });
            }
            Err(e) => return Err(e),
        }

        let identity = self.whoami(role).await?;
        info!(role = %role, name = identity.display_name(), "Logged in");
        Ok(identity)
    }

    /// Identity of the current session for `role`
    pub async fn whoami(&self, role: Role) -> Result<Identity> {
        let path = role.identity_path();
        Ok(match role {
            Role::Admin => Identity::Admin(self.client.get(path).await?),
            Role::Faculty => Identity::Faculty(self.client.get(path).await?),
            Role::Student => Identity::Student(self.client.get(path).await?),
        })
    }

    pub async fn logout(&self, role: Role) -> Result<()> {
        self.client.post_query(&role.logout_path(), &[]).await?;
        info!(role = %role, "Logged out");
        Ok(())
    }

    pub async fn student_signup(&self, signup: &StudentSignup) -> Result<String> {
        signup.validate()?;
        let message = self.client.post("/api/students/signup", signup).await?;
        info!(email = %signup.email, "Student account created");
        Ok(message)
    }

    /// Submit a faculty registration; the account waits for admin approval
    pub async fn faculty_register(&self, registration: &FacultyRegistration) -> Result<String> {
        registration.validate()?;
        let message = self.client.post("/api/faculty/register", registration).await?;
        info!(email = %registration.email, "Faculty registration submitted");
        Ok(message)
    }

    /// Set the initial password of an approved faculty account
    pub async fn set_faculty_password(&self, email: &str, password: &str) -> Result<String> {
        if !is_valid_email(email) {
            return Err(PortalError::InvalidInput(format!("Invalid email address: {}", email)));
        }
        if password.len() < 6 {
            return Err(PortalError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let query = [("email", email.to_string()), ("password", password.to_string())];
        self.client.post_query("/api/faculty/set-password", &query).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        if !is_valid_email(email) {
            return Err(PortalError::InvalidInput(format!("Invalid email address: {}", email)));
        }
        let request = ForgotPasswordRequest { email: email.to_string() };
        self.client.post("/api/admin/forgot-password", &request).await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        if token.trim().is_empty() {
            return Err(PortalError::InvalidInput("Reset token is missing".to_string()));
        }
        if new_password.len() < 6 {
            return Err(PortalError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.client.post("/api/admin/reset-password", &request).await
    }

    pub async fn contact(&self, request: &ContactRequest) -> Result<String> {
        if request.message.trim().is_empty() {
            return Err(PortalError::InvalidInput("Message is required".to_string()));
        }
        if !is_valid_email(&request.email) {
            return Err(PortalError::InvalidInput(format!("Invalid email address: {}", request.email)));
        }
        self.client.post("/api/contact", request).await
    }
}
