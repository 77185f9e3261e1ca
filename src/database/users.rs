use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::outbox;
use crate::domain::{DomainEvent, User};
use crate::types::Page;

/// Authoritative store of local user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn list(&self, page: Page) -> Result<Vec<User>, DatabaseError>;

    /// Persist a new user with its events. A second record for the same
    /// subject fails with [`DatabaseError::Duplicate`].
    async fn insert(&self, user: &User, events: &[DomainEvent]) -> Result<(), DatabaseError>;
}

const USER_COLUMNS: &str = "id, subject, email, display_name, created_at, updated_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE subject = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn insert(&self, user: &User, events: &[DomainEvent]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, subject, email, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.subject)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        outbox::append(&mut tx, events).await?;
        tx.commit().await?;

        tracing::debug!("Inserted user {} for subject {}", user.id, user.subject);
        Ok(())
    }
}
