use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use chainverify_core::{IndexedRecord, Insertion, RecordStore, StorageError};

#[derive(Debug)]
struct Records<K, V> {
    by_key: HashMap<K, V>,
    order: Vec<K>,
    by_index: HashMap<String, Vec<K>>,
}

/// In-memory append-only record store.
///
/// A single `RwLock` guards the map, the insertion-order list and the secondary index, so
/// readers never see a key in one without the others. Data is lost on restart.
#[derive(Debug)]
pub struct InMemoryRecordStore<K, V> {
    inner: RwLock<Records<K, V>>,
}

impl<K, V> InMemoryRecordStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                by_key: HashMap::new(),
                order: Vec::new(),
                by_index: HashMap::new(),
            }),
        }
    }
}

impl<K, V> Default for InMemoryRecordStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StorageError {
    StorageError::unavailable("in-memory store lock poisoned")
}

impl<K, V> RecordStore<K, V> for InMemoryRecordStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: IndexedRecord + Clone + Send + Sync + 'static,
{
    fn insert_if_absent(&self, key: K, value: V) -> Result<Insertion, StorageError> {
        let mut records = self.inner.write().map_err(|_| poisoned())?;

        if records.by_key.contains_key(&key) {
            return Ok(Insertion::AlreadyPresent);
        }

        if let Some(index_key) = value.index_key() {
            records
                .by_index
                .entry(index_key.to_string())
                .or_default()
                .push(key.clone());
        }
        records.order.push(key.clone());
        records.by_key.insert(key, value);
        Ok(Insertion::Inserted)
    }

    fn get(&self, key: &K) -> Result<Option<V>, StorageError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        Ok(records.by_key.get(key).cloned())
    }

    fn contains(&self, key: &K) -> Result<bool, StorageError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        Ok(records.by_key.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<K>, StorageError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        Ok(records.order.clone())
    }

    fn entries(&self) -> Result<Vec<(K, V)>, StorageError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        records
            .order
            .iter()
            .map(|k| {
                records
                    .by_key
                    .get(k)
                    .map(|v| (k.clone(), v.clone()))
                    .ok_or_else(|| StorageError::corrupt("insertion index out of sync"))
            })
            .collect()
    }

    fn keys_by_index(&self, index_key: &str) -> Result<Vec<K>, StorageError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        Ok(records.by_index.get(index_key).cloned().unwrap_or_default())
    }
}
