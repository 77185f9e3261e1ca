// Domain entities and the events they raise

use std::collections::HashMap;

use thiserror::Error;

pub mod events;
pub mod item;
pub mod user;

pub use events::DomainEvent;
pub use item::{Item, ItemFields, ItemInput};
pub use user::{NewUser, User};

/// Rejected input, with a message per offending field.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        Self {
            message: message.into(),
            field_errors,
        }
    }
}
