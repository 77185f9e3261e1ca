use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something that happened to an aggregate, recorded when the aggregate is
/// built or changed and persisted to the outbox with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered {
        user_id: Uuid,
        subject: String,
        email: Option<String>,
        occurred_at: DateTime<Utc>,
    },
    ItemCreated {
        item_id: Uuid,
        owner_id: Uuid,
        name: String,
        occurred_at: DateTime<Utc>,
    },
    ItemUpdated {
        item_id: Uuid,
        owner_id: Uuid,
        changed: Vec<String>,
        occurred_at: DateTime<Utc>,
    },
    ItemDeleted {
        item_id: Uuid,
        owner_id: Uuid,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::UserRegistered { .. } => "user_registered",
            DomainEvent::ItemCreated { .. } => "item_created",
            DomainEvent::ItemUpdated { .. } => "item_updated",
            DomainEvent::ItemDeleted { .. } => "item_deleted",
        }
    }

    /// Aggregate type and id the event belongs to.
    pub fn aggregate(&self) -> (&'static str, Uuid) {
        match self {
            DomainEvent::UserRegistered { user_id, .. } => ("user", *user_id),
            DomainEvent::ItemCreated { item_id, .. }
            | DomainEvent::ItemUpdated { item_id, .. }
            | DomainEvent::ItemDeleted { item_id, .. } => ("item", *item_id),
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::UserRegistered { occurred_at, .. }
            | DomainEvent::ItemCreated { occurred_at, .. }
            | DomainEvent::ItemUpdated { occurred_at, .. }
            | DomainEvent::ItemDeleted { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        let id = Uuid::new_v4();
        let event = DomainEvent::ItemDeleted {
            item_id: id,
            owner_id: id,
            occurred_at: Utc::now(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("item_deleted"));
        assert_eq!(value["type"], json!(event.event_type()));
        assert_eq!(event.aggregate(), ("item", id));
    }
}
