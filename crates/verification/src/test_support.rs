//! Shared fixtures for the read-side tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chainverify_core::{
    BuyerCode, Insertion, ManufacturerId, RecordStore, SellerCode, SerialNumber, StorageError,
};
use chainverify_infra::InMemoryRecordStore;
use chainverify_products::{ProductStore, RegisterProduct};
use chainverify_sales::{RecordSale, SaleLedger, SellerRef};
use chainverify_sellers::{RegisterSeller, SellerStore};

use crate::engine::VerificationEngine;

pub(crate) fn sn(s: &str) -> SerialNumber {
    SerialNumber::parse(s).unwrap()
}

/// In-memory backend that counts writes and can be switched to failing reads.
pub(crate) struct Instrumented<K, V> {
    inner: InMemoryRecordStore<K, V>,
    writes: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
}

impl<K, V> Instrumented<K, V> {
    fn new(writes: Arc<AtomicUsize>, fail_reads: Arc<AtomicBool>) -> Self {
        Self {
            inner: InMemoryRecordStore::new(),
            writes,
            fail_reads,
        }
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("backend offline"));
        }
        Ok(())
    }
}

impl<K, V> RecordStore<K, V> for Instrumented<K, V>
where
    InMemoryRecordStore<K, V>: RecordStore<K, V>,
    K: Send + Sync,
    V: Send + Sync,
{
    fn insert_if_absent(&self, key: K, value: V) -> Result<Insertion, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_if_absent(key, value)
    }

    fn get(&self, key: &K) -> Result<Option<V>, StorageError> {
        self.check_reads()?;
        self.inner.get(key)
    }

    fn contains(&self, key: &K) -> Result<bool, StorageError> {
        self.check_reads()?;
        self.inner.contains(key)
    }

    fn keys(&self) -> Result<Vec<K>, StorageError> {
        self.check_reads()?;
        self.inner.keys()
    }

    fn entries(&self) -> Result<Vec<(K, V)>, StorageError> {
        self.check_reads()?;
        self.inner.entries()
    }

    fn keys_by_index(&self, index_key: &str) -> Result<Vec<K>, StorageError> {
        self.check_reads()?;
        self.inner.keys_by_index(index_key)
    }
}

/// The three registries wired together, plus the engine over them.
pub(crate) struct Ledger {
    pub products: Arc<ProductStore>,
    pub sellers: Arc<SellerStore>,
    pub sales: Arc<SaleLedger>,
    pub engine: VerificationEngine,
    writes: Arc<AtomicUsize>,
    seller_reads_down: Arc<AtomicBool>,
}

impl Ledger {
    pub fn new() -> Self {
        let writes = Arc::new(AtomicUsize::new(0));
        let healthy = Arc::new(AtomicBool::new(false));
        let seller_reads_down = Arc::new(AtomicBool::new(false));

        let products = Arc::new(ProductStore::new(Arc::new(Instrumented::new(
            writes.clone(),
            healthy.clone(),
        ))));
        let sellers = Arc::new(SellerStore::new(Arc::new(Instrumented::new(
            writes.clone(),
            seller_reads_down.clone(),
        ))));
        let sales = Arc::new(SaleLedger::new(
            Arc::new(Instrumented::new(writes.clone(), healthy)),
            products.clone(),
            sellers.clone(),
        ));
        let engine = VerificationEngine::new(products.clone(), sellers.clone(), sales.clone());

        Self {
            products,
            sellers,
            sales,
            engine,
            writes,
            seller_reads_down,
        }
    }

    /// Make every later read of the sellers backend fail.
    pub fn break_seller_reads(&self) {
        self.seller_reads_down.store(true, Ordering::SeqCst);
    }

    /// Number of insert attempts across all three backends.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn register_product(&self, serial: &str, manufacturer: &str) {
        self.products
            .register(RegisterProduct {
                serial_number: sn(serial),
                manufacturer_id: ManufacturerId::parse(manufacturer).unwrap(),
                name: "Widget".to_string(),
                brand: "Acme".to_string(),
                price: 100,
            })
            .unwrap();
    }

    pub fn register_seller(&self, code: &str, manufacturer: &str) {
        self.sellers
            .register(RegisterSeller {
                seller_code: SellerCode::parse(code).unwrap(),
                name: format!("Shop {code}"),
                brand: "Acme".to_string(),
                phone: String::new(),
                manager: String::new(),
                address: String::new(),
                manufacturer_id: ManufacturerId::parse(manufacturer).unwrap(),
            })
            .unwrap();
    }

    pub fn sell(&self, serial: &str, seller: &str, buyer: &str) {
        self.sales
            .record_sale(RecordSale {
                serial_number: sn(serial),
                seller_ref: SellerRef::parse(seller).unwrap(),
                buyer_code: BuyerCode::parse(buyer).unwrap(),
            })
            .unwrap();
    }
}
