//! Models mapping to the dreams database table. Represents a paid dream
//! submission.
use serde::Serialize;
use sqlx::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{errors::DatabaseError, ConnectionPool};

/// Columns returned whenever a full `Dream` is read back.
const DREAM_COLUMNS: &str = "id, title, description, author, country, language, likes, views, \
     paid, stripe_session_id, created_at";

/// INSERT model for a paid `Dream`. Used ONLY by the payment confirmation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamInsert {
    /// The dream's title.
    pub title: String,
    /// The full text of the dream.
    pub description: String,
    /// Who wrote the dream.
    pub author: String,
    /// The author's country.
    pub country: String,
    /// The language the dream is written in, if given.
    pub language: Option<String>,
    /// The checkout session which paid for this dream.
    pub stripe_session_id: String,
}

/// A `Dream` which is stored in the database. Can only be constructed by
/// reading it from a store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Dream {
    /// The dream's ID primary key.
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author: String,
    pub country: String,
    pub language: Option<String>,
    /// Like counter, starts at zero.
    pub likes: i32,
    /// View counter, starts at zero.
    pub views: i32,
    /// Whether the dream was paid for.
    pub paid: bool,
    /// The checkout session which paid for this dream. Unique.
    #[serde(skip_serializing)]
    pub stripe_session_id: Option<String>,
    /// When the payment confirmation was stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl DreamInsert {
    /// Build the row this insert would produce, stamped with `created_at`.
    /// Counters start at zero and the dream is marked as paid.
    pub fn into_dream(self, id: Uuid, created_at: OffsetDateTime) -> Dream {
        Dream {
            id,
            title: self.title,
            description: self.description,
            author: self.author,
            country: self.country,
            language: self.language,
            likes: 0,
            views: 0,
            paid: true,
            stripe_session_id: Some(self.stripe_session_id),
            created_at,
        }
    }

    /// Store this INSERT model unless a dream for the same session already
    /// exists. Returns `None` if the session's uniqueness constraint was hit.
    pub async fn store(
        self,
        created_at: OffsetDateTime,
        db_client: &ConnectionPool,
    ) -> Result<Option<Dream>, DatabaseError> {
        let sql = format!(
            "INSERT INTO dreams \
             (title, description, author, country, language, likes, views, paid, stripe_session_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, 0, 0, TRUE, $6, $7) \
             ON CONFLICT (stripe_session_id) DO NOTHING \
             RETURNING {DREAM_COLUMNS}"
        );
        Ok(query_as::<_, Dream>(&sql)
            .bind(self.title)
            .bind(self.description)
            .bind(self.author)
            .bind(self.country)
            .bind(self.language)
            .bind(self.stripe_session_id)
            .bind(created_at)
            .fetch_optional(db_client)
            .await?)
    }
}

impl Dream {
    /// Select the `Dream` paid for by a given checkout session, if any.
    pub async fn select_by_session(
        stripe_session_id: &str,
        db_client: &ConnectionPool,
    ) -> Result<Option<Self>, DatabaseError> {
        let sql = format!("SELECT {DREAM_COLUMNS} FROM dreams WHERE stripe_session_id = $1");
        Ok(query_as::<_, Self>(&sql)
            .bind(stripe_session_id)
            .fetch_optional(db_client)
            .await?)
    }

    /// Select the most recently created paid dreams, newest first.
    pub async fn select_recent(
        limit: u32,
        db_client: &ConnectionPool,
    ) -> Result<Vec<Self>, DatabaseError> {
        let sql = format!(
            "SELECT {DREAM_COLUMNS} FROM dreams WHERE paid ORDER BY created_at DESC LIMIT $1"
        );
        Ok(query_as::<_, Self>(&sql)
            .bind(i64::from(limit))
            .fetch_all(db_client)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    fn insert(session_id: &str) -> DreamInsert {
        DreamInsert {
            title: "See the ocean".to_owned(),
            description: "...".to_owned(),
            author: "Ana".to_owned(),
            country: "Brazil".to_owned(),
            language: None,
            stripe_session_id: session_id.to_owned(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn conflicting_inserts_store_one_row(pool: ConnectionPool) {
        let now = OffsetDateTime::now_utc();
        let stored = join_all((0..8).map(|_| insert("sess_pg").store(now, &pool))).await;
        let inserted: Vec<Dream> = stored
            .into_iter()
            .filter_map(|result| result.expect("query succeeds"))
            .collect();
        assert_eq!(inserted.len(), 1);
        assert!(inserted[0].paid);
        assert_eq!((inserted[0].likes, inserted[0].views), (0, 0));

        assert!(insert("sess_pg").store(now, &pool).await.expect("query").is_none());
        let found = Dream::select_by_session("sess_pg", &pool)
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(found.id, inserted[0].id);
        assert_eq!(Dream::select_recent(10, &pool).await.expect("query").len(), 1);
    }
}
