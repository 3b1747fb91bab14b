//! Persistence port for ledger records.
//!
//! The registries (products, sellers, sales) are written against [`RecordStore`] and never
//! against a concrete backend. A backend has to offer two things beyond plain reads: an
//! atomic compare-and-insert per key, and a listing by secondary key that it maintains in
//! the same write. Records are never updated or removed, so the trait has no mutation or
//! delete operation.

use std::hash::Hash;
use std::sync::Arc;

use crate::error::StorageError;

/// Key that can be persisted as text by a backend.
pub trait RecordKey: Clone + Eq + Hash + Send + Sync + 'static {
    fn as_record_key(&self) -> &str;

    /// Rebuild a key read back from storage.
    fn from_record_key(raw: String) -> Result<Self, StorageError>;
}

/// Record that can be listed under a secondary key.
///
/// The backend stores the key next to the record when it is inserted, so every instance
/// sharing the backend sees the same listing.
pub trait IndexedRecord {
    /// `None` keeps the record out of every [`RecordStore::keys_by_index`] listing.
    fn index_key(&self) -> Option<&str> {
        None
    }
}

/// Outcome of [`RecordStore::insert_if_absent`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The key was free and the value is now stored.
    Inserted,
    /// The key was already taken; the stored value is unchanged.
    AlreadyPresent,
}

/// Append-only keyed record store.
///
/// ## Atomicity
///
/// `insert_if_absent` must be a single indivisible check-and-write: when several callers
/// race on the same key, exactly one observes [`Insertion::Inserted`].
///
/// ## Ordering
///
/// `keys`, `entries` and `keys_by_index` return records in insertion order. Every call
/// returns the full current enumeration (there is no cursor). A record is visible in
/// `keys_by_index` as soon as its insert has returned.
pub trait RecordStore<K, V>: Send + Sync {
    fn insert_if_absent(&self, key: K, value: V) -> Result<Insertion, StorageError>;

    fn get(&self, key: &K) -> Result<Option<V>, StorageError>;

    fn contains(&self, key: &K) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn keys(&self) -> Result<Vec<K>, StorageError>;

    fn entries(&self) -> Result<Vec<(K, V)>, StorageError>;

    /// Keys of the records whose [`IndexedRecord::index_key`] equals `index_key`.
    fn keys_by_index(&self, index_key: &str) -> Result<Vec<K>, StorageError>;
}

impl<K, V, S> RecordStore<K, V> for Arc<S>
where
    S: RecordStore<K, V> + ?Sized,
{
    fn insert_if_absent(&self, key: K, value: V) -> Result<Insertion, StorageError> {
        (**self).insert_if_absent(key, value)
    }

    fn get(&self, key: &K) -> Result<Option<V>, StorageError> {
        (**self).get(key)
    }

    fn contains(&self, key: &K) -> Result<bool, StorageError> {
        (**self).contains(key)
    }

    fn keys(&self) -> Result<Vec<K>, StorageError> {
        (**self).keys()
    }

    fn entries(&self) -> Result<Vec<(K, V)>, StorageError> {
        (**self).entries()
    }

    fn keys_by_index(&self, index_key: &str) -> Result<Vec<K>, StorageError> {
        (**self).keys_by_index(index_key)
    }
}
