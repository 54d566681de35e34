//! Profile view shared by all three roles

use crate::models::{Admin, AdminUpdate, Faculty, FacultyUpdate, PasswordChange, Role, Student, StudentUpdate};
use crate::services::{Identity, PortalServices};
use crate::state::context::Notice;
use crate::state::view::ViewState;
use crate::utils::errors::{PortalError, Result};
use super::ViewCore;

#[derive(Debug)]
pub struct ProfileView {
    core: ViewCore<Identity>,
}

impl_view_deref!(ProfileView, Identity);

impl ProfileView {
    pub fn open(services: &PortalServices, role: Role) -> Self {
        Self { core: ViewCore::open(services, "profile", role) }
    }

    pub async fn load(&mut self) -> &ViewState<Identity> {
        let fetcher = &self.core.services.fetcher;
        let ctx = &self.core.ctx;
        let result = match ctx.role() {
            Role::Admin => fetcher.identity::<Admin>(ctx).await.map(Identity::Admin),
            Role::Faculty => fetcher.identity::<Faculty>(ctx).await.map(Identity::Faculty),
            Role::Student => fetcher.identity::<Student>(ctx).await.map(Identity::Student),
        };
        self.core.finish_load(result, |_| Notice::new("profile_loaded"))
    }

    fn expect_role(&self, role: Role) -> Result<()> {
        if self.core.ctx.role() == role {
            Ok(())
        } else {
            Err(PortalError::InvalidInput(format!(
                "This is a {} profile, not a {} profile",
                self.core.ctx.role(),
                role
            )))
        }
    }

    pub async fn update_admin(&mut self, update: &AdminUpdate) -> Result<()> {
        let result = match self.expect_role(Role::Admin) {
            Ok(()) => self
                .core
                .services
                .mutations
                .update_admin_profile(&self.core.ctx, update)
                .await
                .map(Identity::Admin),
            Err(e) => Err(e),
        };
        self.core.commit(result, |_| Notice::new("profile_updated"))
    }

    pub async fn update_faculty(&mut self, update: &FacultyUpdate) -> Result<()> {
        let result = match self.expect_role(Role::Faculty) {
            Ok(()) => self
                .core
                .services
                .mutations
                .update_faculty_profile(&self.core.ctx, update)
                .await
                .map(Identity::Faculty),
            Err(e) => Err(e),
        };
        self.core.commit(result, |_| Notice::new("profile_updated"))
    }

    pub async fn update_student(&mut self, update: &StudentUpdate) -> Result<()> {
        let result = match self.expect_role(Role::Student) {
            Ok(()) => self
                .core
                .services
                .mutations
                .update_student_profile(&self.core.ctx, update)
                .await
                .map(Identity::Student),
            Err(e) => Err(e),
        };
        self.core.commit(result, |_| Notice::new("profile_updated"))
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let change = PasswordChange {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let result = self.core.services.mutations.change_password(&self.core.ctx, change).await;
        self.core.ctx.conclude(result, |_| Notice::new("password_updated"))
    }

    /// End the session and close the view
    pub async fn logout(&self) -> Result<()> {
        let role = self.core.ctx.role();
        let result = self.core.ctx.run(self.core.services.auth.logout(role)).await;
        let result = self.core.ctx.conclude(result, |_| Notice::new("logged_out"));
        if result.is_ok() {
            self.core.close();
        }
        result
    }
}
