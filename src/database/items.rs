use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::outbox;
use crate::domain::{DomainEvent, Item};
use crate::types::Page;

/// Persistence for items. Every write stores the given events in the outbox
/// atomically with the row change.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_for_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<Item>, DatabaseError>;

    async fn get_for_owner(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Item>, DatabaseError>;

    async fn insert(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError>;

    async fn update(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError>;

    async fn delete(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError>;
}

const ITEM_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";

pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn list_for_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<Item>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn get_for_owner(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Item>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM items WHERE id = $1 AND owner_id = $2",
            ITEM_COLUMNS
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn insert(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO items (id, owner_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        outbox::append(&mut tx, events).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = $1, description = $2, updated_at = $3
            WHERE id = $4 AND owner_id = $5
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.updated_at)
        .bind(item.id)
        .bind(item.owner_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("item {}", item.id)));
        }

        outbox::append(&mut tx, events).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, item: &Item, events: &[DomainEvent]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND owner_id = $2")
            .bind(item.id)
            .bind(item.owner_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("item {}", item.id)));
        }

        outbox::append(&mut tx, events).await?;
        tx.commit().await?;
        Ok(())
    }
}
