use std::sync::Arc;

use uuid::Uuid;

use crate::database::{DatabaseError, EventDispatcher, ItemStore};
use crate::domain::{Item, ItemFields};
use crate::types::Page;

/// Owner-scoped item operations. Events raised by the domain are persisted by
/// the store and dispatched once the write has committed.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn list(&self, owner_id: Uuid, page: Page) -> Result<Vec<Item>, DatabaseError> {
        self.store.list_for_owner(owner_id, page).await
    }

    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Item, DatabaseError> {
        self.store
            .get_for_owner(owner_id, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("item {}", id)))
    }

    pub async fn create(&self, owner_id: Uuid, fields: ItemFields) -> Result<Item, DatabaseError> {
        let (item, events) = Item::create(owner_id, fields);
        self.store.insert(&item, &events).await?;
        self.dispatcher.dispatch(&events).await;

        tracing::debug!("Created item {} for owner {}", item.id, owner_id);
        Ok(item)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        fields: ItemFields,
    ) -> Result<Item, DatabaseError> {
        let mut item = self.get(owner_id, id).await?;
        let events = item.apply(fields);
        if events.is_empty() {
            return Ok(item);
        }

        self.store.update(&item, &events).await?;
        self.dispatcher.dispatch(&events).await;
        Ok(item)
    }

    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let item = self.get(owner_id, id).await?;
        let events = vec![item.delete()];

        self.store.delete(&item, &events).await?;
        self.dispatcher.dispatch(&events).await;
        Ok(())
    }
}
