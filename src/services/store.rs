//! The seam between the payment flow and wherever dreams are kept.
//!
//! Every backend must refuse a second dream for the same checkout session at
//! insert time. The existence check in the payment flow only saves a write on
//! sequential redeliveries; concurrent deliveries rely on the insert itself.
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{
    self,
    models::dream::{Dream, DreamInsert},
};

/// The result of attempting to store a paid dream.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The dream was stored.
    Inserted(Dream),
    /// A dream already exists for this checkout session. Nothing was written.
    Duplicate,
}

#[async_trait]
pub trait DreamStore: Send + Sync {
    /// Find the dream paid for by a checkout session.
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Dream>, errors::StoreError>;

    /// Insert a paid dream stamped with `created_at`, unless one already exists
    /// for its checkout session.
    async fn insert_paid(
        &self,
        dream: DreamInsert,
        created_at: OffsetDateTime,
    ) -> Result<InsertOutcome, errors::StoreError>;

    /// The most recent paid dreams, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<Dream>, errors::StoreError>;
}

/// Dreams stored in Postgres, with uniqueness enforced by the
/// `dreams_stripe_session_id_key` constraint.
#[derive(Clone)]
pub struct PgDreamStore {
    db_conn: db::ConnectionPool,
}

impl PgDreamStore {
    pub const fn new(db_conn: db::ConnectionPool) -> Self {
        Self { db_conn }
    }
}

#[async_trait]
impl DreamStore for PgDreamStore {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Dream>, errors::StoreError> {
        Ok(Dream::select_by_session(session_id, &self.db_conn).await?)
    }

    async fn insert_paid(
        &self,
        dream: DreamInsert,
        created_at: OffsetDateTime,
    ) -> Result<InsertOutcome, errors::StoreError> {
        Ok(dream
            .store(created_at, &self.db_conn)
            .await?
            .map_or(InsertOutcome::Duplicate, InsertOutcome::Inserted))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Dream>, errors::StoreError> {
        Ok(Dream::select_recent(limit, &self.db_conn).await?)
    }
}

/// An in-process store holding the same uniqueness guarantee as the database.
#[derive(Default)]
pub struct MemoryDreamStore {
    rows: Mutex<Vec<Dream>>,
}

impl MemoryDreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every stored dream, in insertion order.
    pub async fn all(&self) -> Vec<Dream> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl DreamStore for MemoryDreamStore {
    async fn find_by_session(&self, session_id: &str) -> Result<Option<Dream>, errors::StoreError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|dream| dream.stripe_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn insert_paid(
        &self,
        dream: DreamInsert,
        created_at: OffsetDateTime,
    ) -> Result<InsertOutcome, errors::StoreError> {
        let mut rows = self.rows.lock().await;
        let exists = rows
            .iter()
            .any(|row| row.stripe_session_id.as_deref() == Some(dream.stripe_session_id.as_str()));
        if exists {
            return Ok(InsertOutcome::Duplicate);
        }
        let stored = dream.into_dream(Uuid::new_v4(), created_at);
        rows.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Dream>, errors::StoreError> {
        let mut paid: Vec<Dream> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|dream| dream.paid)
            .cloned()
            .collect();
        paid.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        paid.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(paid)
    }
}

pub mod errors {
    use crate::db::errors::DatabaseError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The backing store could not be reached or refused the operation.
        #[error("Dream store unavailable: {0}")]
        Unavailable(#[from] DatabaseError),
    }
}
