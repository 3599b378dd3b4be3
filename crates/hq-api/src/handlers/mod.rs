//! API handlers, one module per route family.

pub mod announcements;
pub mod assigned_tasks;
pub mod auth;
pub mod cylinders;
pub mod files;
pub mod tasks;
pub mod tickets;
pub mod users;
pub mod zones;

use serde::Serialize;

/// Plain `{"message"}` response body
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// True when a required text field is present and non-empty after trimming
pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
