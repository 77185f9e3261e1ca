use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::events::DomainEvent;
use super::ValidationError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing an item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// An [`ItemInput`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub description: Option<String>,
}

impl ItemInput {
    pub fn validate(self) -> Result<ItemFields, ValidationError> {
        let mut field_errors = HashMap::new();

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            field_errors.insert("name".to_string(), "This field is required".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            field_errors.insert(
                "name".to_string(),
                format!("Must be at most {} characters", MAX_NAME_LEN),
            );
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > MAX_DESCRIPTION_LEN {
                field_errors.insert(
                    "description".to_string(),
                    format!("Must be at most {} characters", MAX_DESCRIPTION_LEN),
                );
            }
        }

        if !field_errors.is_empty() {
            return Err(ValidationError::new("Invalid item", field_errors));
        }

        Ok(ItemFields { name, description })
    }
}

impl Item {
    pub fn create(owner_id: Uuid, fields: ItemFields) -> (Item, Vec<DomainEvent>) {
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            owner_id,
            name: fields.name,
            description: fields.description,
            created_at: now,
            updated_at: now,
        };

        let event = DomainEvent::ItemCreated {
            item_id: item.id,
            owner_id,
            name: item.name.clone(),
            occurred_at: now,
        };

        (item, vec![event])
    }

    /// Replace the editable fields. Returns no events when nothing changed.
    pub fn apply(&mut self, fields: ItemFields) -> Vec<DomainEvent> {
        let mut changed = Vec::new();
        if self.name != fields.name {
            self.name = fields.name;
            changed.push("name".to_string());
        }
        if self.description != fields.description {
            self.description = fields.description;
            changed.push("description".to_string());
        }

        if changed.is_empty() {
            return vec![];
        }

        let now = Utc::now();
        self.updated_at = now;
        vec![DomainEvent::ItemUpdated {
            item_id: self.id,
            owner_id: self.owner_id,
            changed,
            occurred_at: now,
        }]
    }

    pub fn delete(&self) -> DomainEvent {
        DomainEvent::ItemDeleted {
            item_id: self.id,
            owner_id: self.owner_id,
            occurred_at: Utc::now(),
        }
    }
}
