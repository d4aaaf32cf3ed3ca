//! Alarm settings: the shield-strategy list page.
//!
//! `api` talks to the alarm backend, `controller` owns the page state
//! (rows, pagination, filter text, per-row busy flags) and `render` turns
//! that state into column and row views.

pub mod api;
pub mod controller;
pub mod feedback;
pub mod models;
pub mod render;

pub use api::{ApiError, HttpShieldApi, ShieldApi};
pub use controller::{DeleteOutcome, ShieldListController, ToggleOutcome};
pub use feedback::{AutoConfirm, CollectingNotifier, Confirmation, LogNotifier, Notifier};
