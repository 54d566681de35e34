//! View state machine
//!
//! `Loading → Ready | Error`, then back through `apply` on every reload.

use serde::Serialize;
use crate::utils::errors::{PortalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Fold a load result into the state
    ///
    /// A cancelled load changes nothing. A failed reload keeps data that is
    /// already on screen; only a view with nothing to show enters `Error`.
    pub fn apply(&mut self, result: Result<T>) {
        match result {
            Ok(data) => *self = ViewState::Ready(data),
            Err(PortalError::Cancelled) => {}
            Err(_) if self.is_ready() => {}
            Err(e) => *self = ViewState::Error(e.user_message()),
        }
    }
}
