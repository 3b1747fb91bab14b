//! Postgres-backed record store.
//!
//! All registries share one table, partitioned by a `collection` column:
//!
//! ```sql
//! ledger_records(collection, record_key, index_key, seq, payload, created_at)
//! PRIMARY KEY (collection, record_key)
//! ```
//!
//! `insert_if_absent` relies on the primary key (`ON CONFLICT DO NOTHING`), so the
//! uniqueness check and the write are one statement and cannot interleave with a
//! concurrent insert from this or any other instance. The record's secondary key is
//! written by that same statement, so `keys_by_index` answers from the table and agrees
//! with `keys` across instances.

use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tokio::runtime::Handle;

use chainverify_core::{IndexedRecord, Insertion, RecordKey, RecordStore, StorageError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_records (
    collection  TEXT        NOT NULL,
    record_key  TEXT        NOT NULL,
    index_key   TEXT,
    seq         BIGSERIAL   NOT NULL,
    payload     JSONB       NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, record_key)
)
"#;

const SEQ_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ledger_records_collection_seq ON ledger_records (collection, seq)";

// Tables created before the secondary key existed.
const INDEX_KEY_COLUMN: &str = "ALTER TABLE ledger_records ADD COLUMN IF NOT EXISTS index_key TEXT";

const INDEX_KEY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS ledger_records_collection_index_key
    ON ledger_records (collection, index_key, seq)
    WHERE index_key IS NOT NULL
"#;

/// Open a connection pool against `url`.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(unavailable)
}

/// Create the `ledger_records` table and its indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    for statement in [SCHEMA, SEQ_INDEX, INDEX_KEY_COLUMN, INDEX_KEY_INDEX] {
        sqlx::query(statement).execute(pool).await.map_err(unavailable)?;
    }
    Ok(())
}

fn unavailable(err: sqlx::Error) -> StorageError {
    tracing::warn!(error = %err, "ledger record query failed");
    StorageError::unavailable(err.to_string())
}

fn corrupt(err: impl core::fmt::Display) -> StorageError {
    StorageError::corrupt(err.to_string())
}

/// One registry's view of the `ledger_records` table.
///
/// The trait is synchronous; queries are driven on the runtime behind `runtime`. Call it
/// from a plain thread or from `tokio::task::spawn_blocking`, never directly from async
/// code running on that runtime.
pub struct PostgresRecordStore<K, V> {
    pool: PgPool,
    runtime: Handle,
    collection: String,
    _records: PhantomData<fn() -> (K, V)>,
}

impl<K, V> PostgresRecordStore<K, V> {
    pub fn new(pool: PgPool, runtime: Handle, collection: impl Into<String>) -> Self {
        Self {
            pool,
            runtime,
            collection: collection.into(),
            _records: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl<K, V> PostgresRecordStore<K, V>
where
    V: DeserializeOwned,
{
    fn decode(payload: serde_json::Value) -> Result<V, StorageError> {
        serde_json::from_value(payload).map_err(corrupt)
    }
}

impl<K, V> RecordStore<K, V> for PostgresRecordStore<K, V>
where
    K: RecordKey,
    V: IndexedRecord + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn insert_if_absent(&self, key: K, value: V) -> Result<Insertion, StorageError> {
        let payload = serde_json::to_value(&value).map_err(corrupt)?;

        let inserted = self.runtime.block_on(async {
            sqlx::query(
                r#"
                INSERT INTO ledger_records (collection, record_key, index_key, payload)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (collection, record_key) DO NOTHING
                RETURNING seq
                "#,
            )
            .bind(&self.collection)
            .bind(key.as_record_key())
            .bind(value.index_key())
            .bind(&payload)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)
        })?;

        Ok(match inserted {
            Some(_) => Insertion::Inserted,
            None => Insertion::AlreadyPresent,
        })
    }

    fn get(&self, key: &K) -> Result<Option<V>, StorageError> {
        let row = self.runtime.block_on(async {
            sqlx::query(
                "SELECT payload FROM ledger_records WHERE collection = $1 AND record_key = $2",
            )
            .bind(&self.collection)
            .bind(key.as_record_key())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)
        })?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload").map_err(corrupt)?;
                Self::decode(payload).map(Some)
            }
            None => Ok(None),
        }
    }

    fn contains(&self, key: &K) -> Result<bool, StorageError> {
        let row = self.runtime.block_on(async {
            sqlx::query(
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM ledger_records WHERE collection = $1 AND record_key = $2
                ) AS present
                "#,
            )
            .bind(&self.collection)
            .bind(key.as_record_key())
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
        })?;

        row.try_get("present").map_err(corrupt)
    }

    fn keys(&self) -> Result<Vec<K>, StorageError> {
        let rows = self.runtime.block_on(async {
            sqlx::query("SELECT record_key FROM ledger_records WHERE collection = $1 ORDER BY seq")
                .bind(&self.collection)
                .fetch_all(&self.pool)
                .await
                .map_err(unavailable)
        })?;

        rows.into_iter()
            .map(|row| {
                let raw: String = row.try_get("record_key").map_err(corrupt)?;
                K::from_record_key(raw)
            })
            .collect()
    }

    fn entries(&self) -> Result<Vec<(K, V)>, StorageError> {
        let rows = self.runtime.block_on(async {
            sqlx::query(
                "SELECT record_key, payload FROM ledger_records WHERE collection = $1 ORDER BY seq",
            )
            .bind(&self.collection)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)
        })?;

        rows.into_iter()
            .map(|row| {
                let raw: String = row.try_get("record_key").map_err(corrupt)?;
                let payload: serde_json::Value = row.try_get("payload").map_err(corrupt)?;
                Ok((K::from_record_key(raw)?, Self::decode(payload)?))
            })
            .collect()
    }

    fn keys_by_index(&self, index_key: &str) -> Result<Vec<K>, StorageError> {
        let rows = self.runtime.block_on(async {
            sqlx::query(
                r#"
                SELECT record_key FROM ledger_records
                WHERE collection = $1 AND index_key = $2
                ORDER BY seq
                "#,
            )
            .bind(&self.collection)
            .bind(index_key)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)
        })?;

        rows.into_iter()
            .map(|row| {
                let raw: String = row.try_get("record_key").map_err(corrupt)?;
                K::from_record_key(raw)
            })
            .collect()
    }
}

/// Run against a live database:
///
/// ```text
/// DATABASE_URL=postgres://... cargo test -p chainverify-infra --features postgres -- --ignored
/// ```
///
/// Each test writes to its own collection and deletes it afterwards.
#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde::Deserialize;
    use tokio::runtime::Runtime;

    use chainverify_core::SerialNumber;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Listing {
        owner: Option<String>,
        price: u64,
    }

    impl IndexedRecord for Listing {
        fn index_key(&self) -> Option<&str> {
            self.owner.as_deref()
        }
    }

    fn listing(owner: &str, price: u64) -> Listing {
        Listing {
            owner: Some(owner.to_string()),
            price,
        }
    }

    fn sn(s: &str) -> SerialNumber {
        SerialNumber::parse(s).unwrap()
    }

    /// A fresh collection on the database named by `DATABASE_URL`.
    struct Fixture {
        runtime: Runtime,
        pool: PgPool,
        collection: String,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
            let runtime = Runtime::new().unwrap();
            let pool = runtime.block_on(connect(&url, 4)).unwrap();
            runtime.block_on(ensure_schema(&pool)).unwrap();

            let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
            let collection = format!("test-{name}-{}-{nanos}", std::process::id());

            Self {
                runtime,
                pool,
                collection,
            }
        }

        fn store(&self) -> PostgresRecordStore<SerialNumber, Listing> {
            PostgresRecordStore::new(self.pool.clone(), self.runtime.handle().clone(), &self.collection)
        }

        fn execute(&self, sql: &str, key: &str, payload: serde_json::Value) {
            self.runtime
                .block_on(
                    sqlx::query(sql)
                        .bind(&self.collection)
                        .bind(key)
                        .bind(payload)
                        .execute(&self.pool),
                )
                .unwrap();
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = self.runtime.block_on(
                sqlx::query("DELETE FROM ledger_records WHERE collection = $1")
                    .bind(&self.collection)
                    .execute(&self.pool),
            );
        }
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn conflicting_insert_reports_already_present_and_keeps_first_value() {
        let db = Fixture::new("conflict");
        let store = db.store();

        assert_eq!(store.insert_if_absent(sn("SN1"), listing("M1", 100)).unwrap(), Insertion::Inserted);
        assert_eq!(
            store.insert_if_absent(sn("SN1"), listing("M2", 999)).unwrap(),
            Insertion::AlreadyPresent
        );

        assert_eq!(store.get(&sn("SN1")).unwrap(), Some(listing("M1", 100)));
        assert!(store.contains(&sn("SN1")).unwrap());
        assert!(!store.contains(&sn("SN2")).unwrap());
        assert!(store.keys_by_index("M2").unwrap().is_empty());
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn listings_follow_insertion_order_across_store_instances() {
        let db = Fixture::new("order");
        let first = db.store();
        let second = db.store();

        first.insert_if_absent(sn("C"), listing("M1", 1)).unwrap();
        second.insert_if_absent(sn("A"), listing("M2", 2)).unwrap();
        first.insert_if_absent(sn("B"), listing("M1", 3)).unwrap();
        second
            .insert_if_absent(sn("D"), Listing { owner: None, price: 4 })
            .unwrap();

        assert_eq!(first.keys().unwrap(), vec![sn("C"), sn("A"), sn("B"), sn("D")]);
        assert_eq!(
            second.entries().unwrap().into_iter().map(|(_, v)| v.price).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(second.keys_by_index("M1").unwrap(), vec![sn("C"), sn("B")]);
        assert_eq!(first.keys_by_index("M2").unwrap(), vec![sn("A")]);
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn undecodable_payload_reads_as_corrupt() {
        let db = Fixture::new("corrupt");
        let store = db.store();
        db.execute(
            "INSERT INTO ledger_records (collection, record_key, payload) VALUES ($1, $2, $3)",
            "SN-BAD",
            serde_json::json!({ "unexpected": true }),
        );

        assert!(matches!(store.get(&sn("SN-BAD")), Err(StorageError::Corrupt(_))));
        assert!(matches!(store.entries(), Err(StorageError::Corrupt(_))));
        assert_eq!(store.keys().unwrap(), vec![sn("SN-BAD")]);
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn concurrent_inserts_on_one_key_have_a_single_winner() {
        let db = Fixture::new("race");
        let store = db.store();

        let outcomes: Vec<Insertion> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    s.spawn(move || store.insert_if_absent(sn("SN-RACE"), listing("M1", i)).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|o| **o == Insertion::Inserted).count(), 1);
        assert_eq!(store.keys_by_index("M1").unwrap().len(), 1);
    }
}
