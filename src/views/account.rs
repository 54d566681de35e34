//! Signed-out pages: login, signup, registration, password recovery, contact
//!
//! These pages have no session to guard, but their outcomes still go through
//! the view context so each submission raises exactly one notification.

use crate::models::{ContactRequest, FacultyRegistration, Role, StudentSignup};
use crate::services::{Identity, PortalServices};
use crate::state::context::{Notice, ViewContext};
use crate::utils::errors::Result;

#[derive(Debug)]
pub struct AccountView {
    services: PortalServices,
    ctx: ViewContext,
}

impl AccountView {
    /// Open the account pages of `role`; the role picks the login endpoint
    pub fn open(services: &PortalServices, role: Role) -> Self {
        Self {
            ctx: services.open_view("account", role),
            services: services.clone(),
        }
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn close(&self) {
        self.ctx.close();
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let result = self
            .ctx
            .run(self.services.auth.login(self.ctx.role(), email, password))
            .await;
        self.ctx
            .conclude(result, |identity| Notice::new("login_succeeded").with("name", identity.display_name()))
    }

    pub async fn signup(&self, signup: &StudentSignup) -> Result<String> {
        let result = self.ctx.run(self.services.auth.student_signup(signup)).await;
        self.ctx.conclude(result, |_| Notice::new("signup_succeeded"))
    }

    pub async fn register_faculty(&self, registration: &FacultyRegistration) -> Result<String> {
        let result = self.ctx.run(self.services.auth.faculty_register(registration)).await;
        self.ctx.conclude(result, |_| Notice::new("registration_submitted"))
    }

    /// First password of an approved faculty account
    pub async fn set_password(&self, email: &str, password: &str) -> Result<String> {
        let result = self
            .ctx
            .run(self.services.auth.set_faculty_password(email, password))
            .await;
        self.ctx.conclude(result, |_| Notice::new("password_set"))
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let result = self.ctx.run(self.services.auth.forgot_password(email)).await;
        self.ctx
            .conclude(result, |_| Notice::new("password_reset_requested").with("email", email))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        let result = self
            .ctx
            .run(self.services.auth.reset_password(token, new_password))
            .await;
        self.ctx.conclude(result, |_| Notice::new("password_reset"))
    }

    pub async fn contact(&self, request: &ContactRequest) -> Result<String> {
        let result = self.ctx.run(self.services.auth.contact(request)).await;
        self.ctx.conclude(result, |_| Notice::new("contact_sent"))
    }
}
