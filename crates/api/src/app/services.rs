use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use chainverify_core::{LedgerError, LedgerResult};
use chainverify_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};
use chainverify_infra::InMemoryRecordStore;
use chainverify_products::{Product, ProductBackend, ProductRegistered, ProductStore, RegisterProduct};
use chainverify_sales::{RecordSale, Sale, SaleBackend, SaleLedger, SaleRecorded};
use chainverify_sellers::{RegisterSeller, Seller, SellerBackend, SellerRegistered, SellerStore};
use chainverify_verification::VerificationEngine;

use crate::config::BackendConfig;

pub type LedgerEnvelope = EventEnvelope<serde_json::Value>;
pub type LedgerBus = InMemoryEventBus<LedgerEnvelope>;

/// Registries, verification engine and event bus shared by every handler.
///
/// All methods are synchronous and may block on the backend; handlers reach them through
/// [`blocking`].
pub struct AppServices {
    products: Arc<ProductStore>,
    sellers: Arc<SellerStore>,
    sales: Arc<SaleLedger>,
    engine: VerificationEngine,
    bus: Arc<LedgerBus>,
    sequence: AtomicU64,
}

impl AppServices {
    /// Wire the registries on top of the given backends. Nothing is read yet.
    pub fn from_backends(products: ProductBackend, sellers: SellerBackend, sales: SaleBackend) -> Self {
        let products = Arc::new(ProductStore::new(products));
        let sellers = Arc::new(SellerStore::new(sellers));
        let sales = Arc::new(SaleLedger::new(sales, products.clone(), sellers.clone()));
        let engine = VerificationEngine::new(products.clone(), sellers.clone(), sales.clone());

        Self {
            products,
            sellers,
            sales,
            engine,
            bus: Arc::new(InMemoryEventBus::new()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backends(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryRecordStore::new()),
        )
    }

    pub fn products(&self) -> &ProductStore {
        &self.products
    }

    pub fn sellers(&self) -> &SellerStore {
        &self.sellers
    }

    pub fn sales(&self) -> &SaleLedger {
        &self.sales
    }

    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    pub fn bus(&self) -> &Arc<LedgerBus> {
        &self.bus
    }

    pub fn register_product(&self, cmd: RegisterProduct) -> LedgerResult<Product> {
        let product = self.products.register(cmd)?;
        self.publish(
            "products.product",
            product.serial_number().as_str(),
            &ProductRegistered::from(&product),
        );
        Ok(product)
    }

    pub fn register_seller(&self, cmd: RegisterSeller) -> LedgerResult<Seller> {
        let seller = self.sellers.register(cmd)?;
        self.publish(
            "sellers.seller",
            seller.seller_code().as_str(),
            &SellerRegistered::from(&seller),
        );
        Ok(seller)
    }

    pub fn record_sale(&self, cmd: RecordSale) -> LedgerResult<Sale> {
        let sale = self.sales.record_sale(cmd)?;
        self.publish(
            "sales.sale",
            sale.serial_number().as_str(),
            &SaleRecorded::from(&sale),
        );
        Ok(sale)
    }

    /// Publish a committed write. Best-effort: the write already happened, so failures
    /// are only logged.
    fn publish<E>(&self, stream: &str, record_key: &str, event: &E)
    where
        E: Event + Serialize,
    {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let envelope = match EventEnvelope::from_typed(stream, record_key, sequence, event) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(event_type = event.event_type(), error = %e, "event serialization failed");
                return;
            }
        };

        if let Err(e) = self.bus.publish(envelope) {
            tracing::warn!(event_type = event.event_type(), error = ?e, "event publish failed");
        }
    }
}

/// Build services for the configured backend.
pub async fn build_services(backend: &BackendConfig) -> anyhow::Result<AppServices> {
    match backend {
        BackendConfig::Memory => Ok(AppServices::in_memory()),
        BackendConfig::Postgres {
            database_url,
            max_connections,
        } => postgres_services(database_url, *max_connections).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_services(database_url: &str, max_connections: u32) -> anyhow::Result<AppServices> {
    use chainverify_infra::PostgresRecordStore;
    use chainverify_infra::record_store::postgres;

    let pool = postgres::connect(database_url, max_connections).await?;
    postgres::ensure_schema(&pool).await?;
    let runtime = tokio::runtime::Handle::current();

    let products: ProductBackend = Arc::new(PostgresRecordStore::new(pool.clone(), runtime.clone(), "products"));
    let sellers: SellerBackend = Arc::new(PostgresRecordStore::new(pool.clone(), runtime.clone(), "sellers"));
    let sales: SaleBackend = Arc::new(PostgresRecordStore::new(pool, runtime, "sales"));

    Ok(AppServices::from_backends(products, sellers, sales))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_services(_database_url: &str, _max_connections: u32) -> anyhow::Result<AppServices> {
    anyhow::bail!("postgres backend requested but chainverify-api was built without the `postgres` feature")
}

/// Run a registry call on the blocking pool.
///
/// Backends may block (the postgres store drives its queries on the runtime), so
/// handlers never call [`AppServices`] directly from async code.
pub async fn blocking<T, F>(services: &Arc<AppServices>, f: F) -> LedgerResult<T>
where
    F: FnOnce(&AppServices) -> LedgerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let services = Arc::clone(services);
    match tokio::task::spawn_blocking(move || f(&services)).await {
        Ok(result) => result,
        Err(e) => Err(LedgerError::StorageUnavailable(format!("ledger task failed: {e}"))),
    }
}

/// Log every ledger event on a dedicated thread.
///
/// The subscription is taken before returning, so nothing published afterwards is missed.
pub fn spawn_event_logger(services: &AppServices) -> std::io::Result<()> {
    let subscription = services.bus().subscribe();
    std::thread::Builder::new()
        .name("ledger-events".to_string())
        .spawn(move || {
            while let Ok(envelope) = subscription.recv() {
                tracing::debug!(
                    event_id = %envelope.event_id(),
                    event_type = envelope.event_type(),
                    sequence = envelope.sequence_number(),
                    record_key = envelope.record_key(),
                    "ledger event"
                );
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainverify_core::{BuyerCode, ManufacturerId, SellerCode, SerialNumber};
    use chainverify_sales::SellerRef;

    fn product_cmd(serial: &str) -> RegisterProduct {
        RegisterProduct {
            serial_number: SerialNumber::parse(serial).unwrap(),
            manufacturer_id: ManufacturerId::parse("M1").unwrap(),
            name: "Widget".to_string(),
            brand: "Acme".to_string(),
            price: 100,
        }
    }

    fn seller_cmd(code: &str) -> RegisterSeller {
        RegisterSeller {
            seller_code: SellerCode::parse(code).unwrap(),
            name: "Corner Shop".to_string(),
            brand: "Acme".to_string(),
            phone: String::new(),
            manager: String::new(),
            address: String::new(),
            manufacturer_id: ManufacturerId::parse("M1").unwrap(),
        }
    }

    fn sale_cmd(serial: &str, seller: &str, buyer: &str) -> RecordSale {
        RecordSale {
            serial_number: SerialNumber::parse(serial).unwrap(),
            seller_ref: SellerRef::parse(seller).unwrap(),
            buyer_code: BuyerCode::parse(buyer).unwrap(),
        }
    }

    #[test]
    fn committed_writes_are_published_in_sequence() {
        let services = AppServices::in_memory();
        let sub = services.bus().subscribe();

        services.register_product(product_cmd("SN1")).unwrap();
        services.register_seller(seller_cmd("SELLER1")).unwrap();
        services.record_sale(sale_cmd("SN1", "SELLER1", "VALID123")).unwrap();

        let envelopes: Vec<LedgerEnvelope> = (0..3).map(|_| sub.try_recv().unwrap()).collect();
        let kinds: Vec<(&str, u64)> = envelopes
            .iter()
            .map(|e| (e.event_type(), e.sequence_number()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("products.product.registered", 1),
                ("sellers.seller.registered", 2),
                ("sales.sale.recorded", 3),
            ]
        );
        assert_eq!(envelopes[2].record_key(), "SN1");
        assert!(!envelopes[2].payload().to_string().contains("VALID123"));
    }

    #[test]
    fn rejected_writes_publish_nothing() {
        let services = AppServices::in_memory();
        services.register_product(product_cmd("SN1")).unwrap();
        let sub = services.bus().subscribe();

        assert!(services.register_product(product_cmd("SN1")).is_err());
        assert!(services.record_sale(sale_cmd("SN1", "GHOST", "X")).is_err());
        assert!(services.record_sale(sale_cmd("SN2", "SELLER1", "X")).is_err());

        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_does_not_affect_writes() {
        let services = AppServices::in_memory();
        {
            let _dropped = services.bus().subscribe();
        }

        services.register_product(product_cmd("SN1")).unwrap();
        assert!(services.products().exists(&SerialNumber::parse("SN1").unwrap()).unwrap());
    }

    #[tokio::test]
    async fn blocking_runs_calls_off_the_async_runtime() {
        let services = Arc::new(AppServices::in_memory());

        let product = blocking(&services, |s| s.register_product(product_cmd("SN1"))).await.unwrap();
        assert_eq!(product.name(), "Widget");

        let err = blocking(&services, |s| s.register_product(product_cmd("SN1"))).await.unwrap_err();
        assert_eq!(err, LedgerError::AlreadyExists("SN1".to_string()));
    }

    #[tokio::test]
    async fn memory_backend_builds() {
        let services = build_services(&BackendConfig::Memory).await.unwrap();
        assert!(services.products().list_all().unwrap().is_empty());
    }
}
