//! The `changes` table as a ledger store.
//!
//! Merge-or-insert is a single `INSERT ... ON CONFLICT (identity) DO UPDATE`
//! statement. The unique index on `identity` makes it atomic: two racing
//! submissions of the same payload serialize on the index, and the loser's
//! reporters are unioned into the winner's row inside the database.
//!
//! Guarded retirement runs in a transaction that first takes a
//! transaction-scoped advisory lock, so every process committing against the
//! same database queues on one key until the check and delete are done.

use chrono::Utc;
use crowdmap_ledger::{
    AddOutcome, ChangeFilter, LedgerError, LedgerStore, LedgerSummary, Retirement, identity_key,
};
use crowdmap_types::{Change, ChangeId, ChangeKind, ReporterSet};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::DbError;

/// Advisory lock key shared by every committer (ASCII "crowdmap").
pub const COMMIT_LOCK_KEY: i64 = 0x6372_6f77_646d_6170;

/// Ledger store backed by the `changes` table.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a store over a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(
        &self,
        identity: &str,
        kind: &ChangeKind,
        reporters: &ReporterSet,
    ) -> Result<AddOutcome, DbError> {
        let payload = serde_json::to_value(kind)?;
        let now = Utc::now();

        let (change_id, reporter_count, inserted): (Uuid, i32, bool) = sqlx::query_as(
            r"INSERT INTO changes (change_id, identity, change_type, payload, reporters, reporter_count, first_seen_at, last_seen_at)
              VALUES ($1, $2, $3, $4, $5::TEXT[], cardinality($5::TEXT[]), $6, $6)
              ON CONFLICT (identity) DO UPDATE SET
                  reporters = ARRAY(
                      SELECT DISTINCT r FROM unnest(changes.reporters || EXCLUDED.reporters) AS r ORDER BY r
                  ),
                  reporter_count = (
                      SELECT count(DISTINCT r)::INTEGER FROM unnest(changes.reporters || EXCLUDED.reporters) AS r
                  ),
                  last_seen_at = EXCLUDED.last_seen_at
              RETURNING change_id, reporter_count, (xmax = 0) AS inserted",
        )
        .bind(ChangeId::new().into_inner())
        .bind(identity)
        .bind(kind.change_type().as_str())
        .bind(&payload)
        .bind(reporters.to_vec())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let change_id = ChangeId::from(change_id);
        if inserted {
            Ok(AddOutcome::Inserted { change_id })
        } else {
            Ok(AddOutcome::Merged {
                change_id,
                reporters: usize::try_from(reporter_count).unwrap_or(0),
            })
        }
    }

    async fn select(&self, min_reporters: usize, filter: &ChangeFilter) -> Result<Vec<Change>, DbError> {
        let (include, exclude): (Option<Vec<Uuid>>, Option<Vec<Uuid>>) = match filter {
            ChangeFilter::All => (None, None),
            ChangeFilter::Include(ids) => (Some(ids.iter().map(|id| id.into_inner()).collect()), None),
            ChangeFilter::Exclude(ids) => (None, Some(ids.iter().map(|id| id.into_inner()).collect())),
        };

        let rows = sqlx::query_as::<_, ChangeRow>(
            r"SELECT change_id, change_type, payload, reporters, first_seen_at, last_seen_at
              FROM changes
              WHERE reporter_count >= $1
                AND ($2::UUID[] IS NULL OR change_id = ANY($2))
                AND ($3::UUID[] IS NULL OR NOT (change_id = ANY($3)))
              ORDER BY change_id ASC",
        )
        .bind(threshold(min_reporters))
        .bind(include)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChangeRow::into_change).collect()
    }

    async fn guarded_remove<F>(&self, ids: &[ChangeId], check: F) -> Result<Retirement, DbError>
    where
        F: FnOnce(&LedgerSummary) -> bool + Send,
    {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(COMMIT_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let checked = aggregate(&mut *tx, 0).await?;
        if !check(&checked) {
            tx.rollback().await?;
            return Ok(Retirement::Stale { current: checked });
        }

        let removed = if ids.is_empty() {
            0
        } else {
            remove(&mut *tx, ids).await?
        };
        tx.commit().await?;

        tracing::debug!(removed, "Guarded retirement committed");
        Ok(Retirement::Retired { removed, checked })
    }
}

async fn aggregate<'e, E: PgExecutor<'e>>(
    executor: E,
    min_reporters: usize,
) -> Result<LedgerSummary, DbError> {
    let (count, last): (i64, Option<Uuid>) = sqlx::query_as(
        r"SELECT
              (SELECT count(*) FROM changes WHERE reporter_count >= $1),
              (SELECT change_id FROM changes WHERE reporter_count >= $1 ORDER BY change_id DESC LIMIT 1)",
    )
    .bind(threshold(min_reporters))
    .fetch_one(executor)
    .await?;

    Ok(LedgerSummary {
        last: last.map(ChangeId::from),
        count: usize::try_from(count).unwrap_or(usize::MAX),
    })
}

async fn remove<'e, E: PgExecutor<'e>>(executor: E, ids: &[ChangeId]) -> Result<u64, DbError> {
    let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    let result = sqlx::query("DELETE FROM changes WHERE change_id = ANY($1)")
        .bind(&ids)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Reporter-count thresholds are compared against an `INTEGER` column.
fn threshold(min_reporters: usize) -> i32 {
    i32::try_from(min_reporters).unwrap_or(i32::MAX)
}

impl LedgerStore for PgLedgerStore {
    async fn merge_or_insert(
        &self,
        kind: ChangeKind,
        reporters: ReporterSet,
    ) -> Result<AddOutcome, LedgerError> {
        let identity = identity_key(&kind)?;
        Ok(self.upsert(&identity, &kind, &reporters).await?)
    }

    async fn scan(
        &self,
        min_reporters: usize,
        filter: &ChangeFilter,
    ) -> Result<Vec<Change>, LedgerError> {
        Ok(self.select(min_reporters, filter).await?)
    }

    async fn summary(&self, min_reporters: usize) -> Result<LedgerSummary, LedgerError> {
        Ok(aggregate(&self.pool, min_reporters).await?)
    }

    async fn delete(&self, ids: &[ChangeId]) -> Result<u64, LedgerError> {
        if ids.is_empty() {
            return Ok(0);
        }
        Ok(remove(&self.pool, ids).await?)
    }

    async fn retire_if<F>(&self, ids: &[ChangeId], check: F) -> Result<Retirement, LedgerError>
    where
        F: FnOnce(&LedgerSummary) -> bool + Send,
    {
        Ok(self.guarded_remove(ids, check).await?)
    }
}

/// A row from the `changes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChangeRow {
    /// Change UUID.
    pub change_id: Uuid,
    /// Wire discriminator of the payload.
    pub change_type: String,
    /// The payload as stored.
    pub payload: serde_json::Value,
    /// Reporter tokens, sorted.
    pub reporters: Vec<String>,
    /// When the change was first submitted.
    pub first_seen_at: chrono::DateTime<chrono::Utc>,
    /// When the change was last submitted.
    pub last_seen_at: chrono::DateTime<chrono::Utc>,
}

impl ChangeRow {
    /// Rehydrate the ledger record.
    pub fn into_change(self) -> Result<Change, DbError> {
        Ok(Change {
            change_id: ChangeId::from(self.change_id),
            kind: serde_json::from_value(self.payload)?,
            reporters: self.reporters.into_iter().collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crowdmap_types::Direction;

    use super::*;

    #[test]
    fn row_rehydrates_payload_and_reporters() {
        let kind = ChangeKind::DeleteExit {
            room_number: 3,
            direction: Direction::Down,
        };
        let row = ChangeRow {
            change_id: Uuid::now_v7(),
            change_type: kind.change_type().as_str().to_owned(),
            payload: serde_json::to_value(&kind).unwrap(),
            reporters: vec!["b".to_owned(), "a".to_owned(), "a".to_owned()],
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        };
        let id = row.change_id;
        let change = row.into_change().unwrap();

        assert_eq!(change.change_id, ChangeId::from(id));
        assert_eq!(change.kind, kind);
        assert_eq!(change.times_seen(), 2);
    }

    #[test]
    fn corrupt_payload_is_serialization_error() {
        let row = ChangeRow {
            change_id: Uuid::now_v7(),
            change_type: "room-name".to_owned(),
            payload: serde_json::json!({ "type": "room-name" }),
            reporters: Vec::new(),
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        };
        assert!(matches!(row.into_change(), Err(DbError::Serialization(_))));
    }

    #[test]
    fn commit_lock_key_spells_the_service_name() {
        assert_eq!(&COMMIT_LOCK_KEY.to_be_bytes(), b"crowdmap");
    }

    #[test]
    fn threshold_saturates() {
        assert_eq!(threshold(2), 2);
        assert_eq!(threshold(usize::MAX), i32::MAX);
    }
}
