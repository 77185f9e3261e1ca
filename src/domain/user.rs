use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::events::DomainEvent;

/// Local profile of an identity-provider subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// The provider's `sub` claim.
    pub subject: String,
    pub email: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl User {
    /// Build a user record for a subject seen for the first time.
    pub fn register(new_user: NewUser) -> (User, Vec<DomainEvent>) {
        let now = Utc::now();
        let display_name = new_user
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| new_user.email.clone())
            .unwrap_or_else(|| new_user.subject.clone());

        let user = User {
            id: Uuid::new_v4(),
            subject: new_user.subject,
            email: new_user.email,
            display_name,
            created_at: now,
            updated_at: now,
        };

        let event = DomainEvent::UserRegistered {
            user_id: user.id,
            subject: user.subject.clone(),
            email: user.email.clone(),
            occurred_at: now,
        };

        (user, vec![event])
    }
}
