//! View models
//!
//! One headless view per portal page. Each follows the same cycle:
//! session check and load, render from [`ViewState`], mutate, reload.

/// Let a view expose its `ViewCore` accessors directly
macro_rules! impl_view_deref {
    ($view:ty, $data:ty) => {
        impl std::ops::Deref for $view {
            type Target = $crate::views::ViewCore<$data>;

            fn deref(&self) -> &Self::Target {
                &self.core
            }
        }
    };
}

pub mod account;
pub mod admin;
pub mod faculty;
pub mod profile;
pub mod student;

pub use account::AccountView;
pub use admin::{AdminDashboardView, EventManagement, EventManagerView, FacultyDirectoryView, StudentDirectoryView, UnapprovedFacultiesView};
pub use faculty::{AssignedEventsView, FacultyDashboardView};
pub use profile::ProfileView;
pub use student::{EventCatalogView, RegisteredEventsView, StudentDashboardView};

use crate::models::Role;
use crate::services::PortalServices;
use crate::state::context::{Notice, ViewContext};
use crate::state::view::ViewState;
use crate::utils::errors::Result;

/// Services, lifetime and state shared by every view
#[derive(Debug)]
pub struct ViewCore<T> {
    pub(crate) services: PortalServices,
    pub(crate) ctx: ViewContext,
    pub(crate) state: ViewState<T>,
}

impl<T> ViewCore<T> {
    pub(crate) fn open(services: &PortalServices, name: &str, role: Role) -> Self {
        Self {
            ctx: services.open_view(name, role),
            services: services.clone(),
            state: ViewState::Loading,
        }
    }

    /// Run a load behind the session check of the view's role
    pub(crate) async fn guarded<F>(&self, fetch: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        self.services.fetcher.guarded(&self.ctx, fetch).await
    }

    /// Conclude a load and fold it into the state
    pub(crate) fn finish_load<N>(&mut self, result: Result<T>, notice: N) -> &ViewState<T>
    where
        N: FnOnce(&T) -> Notice,
    {
        let result = self.ctx.conclude(result, notice);
        self.state.apply(result);
        &self.state
    }

    /// Conclude a mutation; the refreshed data replaces the state only on success
    pub(crate) fn commit<N>(&mut self, result: Result<T>, notice: N) -> Result<()>
    where
        N: FnOnce(&T) -> Notice,
    {
        let data = self.ctx.conclude(result, notice)?;
        self.state = ViewState::Ready(data);
        Ok(())
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    /// Tear the view down; pending work and redirects are abandoned
    pub fn close(&self) {
        self.ctx.close();
    }
}
