use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use thiserror::Error;

use crate::db::PgPool;
use crate::models::{Order, OrderChanges};
use crate::schema::orders;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(String),
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the `orders` table. Rows are only created upstream.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Newest first by `created_at`.
    async fn list_recent(&self, limit: i64) -> StoreResult<Vec<Order>>;

    async fn find(&self, id: i64) -> StoreResult<Option<Order>>;

    /// Exact match on the stored status, newest first.
    async fn list_by_status(&self, status: &str) -> StoreResult<Vec<Order>>;

    /// Applies a partial update and returns the updated row, or `None` when the
    /// order does not exist.
    async fn update(&self, id: i64, changes: OrderChanges) -> StoreResult<Option<Order>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| StoreError::Pool(err.to_string()))?;
            f(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_recent(&self, limit: i64) -> StoreResult<Vec<Order>> {
        self.with_conn(move |conn| {
            Ok(orders::table
                .order(orders::created_at.desc())
                .limit(limit)
                .load::<Order>(conn)?)
        })
        .await
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Order>> {
        self.with_conn(move |conn| Ok(orders::table.find(id).first::<Order>(conn).optional()?))
            .await
    }

    async fn list_by_status(&self, status: &str) -> StoreResult<Vec<Order>> {
        let status = status.to_string();
        self.with_conn(move |conn| {
            Ok(orders::table
                .filter(orders::status.eq(status))
                .order(orders::created_at.desc())
                .load::<Order>(conn)?)
        })
        .await
    }

    async fn update(&self, id: i64, changes: OrderChanges) -> StoreResult<Option<Order>> {
        self.with_conn(move |conn| {
            if changes.is_empty() {
                return Ok(orders::table.find(id).first::<Order>(conn).optional()?);
            }
            Ok(diesel::update(orders::table.find(id))
                .set(&changes)
                .get_result::<Order>(conn)
                .optional()?)
        })
        .await
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(orders::table.find(id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }
}
