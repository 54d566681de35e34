//! State management module
//!
//! Per-view lifetime and the Loading / Ready / Error state machine

pub mod context;
pub mod view;

pub use context::{Notice, ViewContext};
pub use view::ViewState;
