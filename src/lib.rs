//! Campus Portal client
//!
//! A typed async client for the campus event-management backend. Student,
//! faculty and admin pages are modelled as headless views that share one
//! session / data-sync flow: check the session, fetch, render, mutate, reload.

pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use config::Settings;
pub use models::Role;
pub use utils::errors::{PortalError, RejectionKind, Result};

// Re-export main components for easy access
pub use services::PortalServices;
pub use state::{ViewContext, ViewState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
