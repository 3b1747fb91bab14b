use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use chainverify_core::{Insertion, LedgerError, LedgerResult, RecordStore, SerialNumber};
use chainverify_products::ProductStore;
use chainverify_sellers::SellerStore;

use crate::sale::{RecordSale, Sale, SellerRef};

/// Backend holding sale records.
pub type SaleBackend = Arc<dyn RecordStore<SerialNumber, Sale>>;

/// Sales ledger.
///
/// Consults the products registry (and the sellers registry for seller-code sales)
/// before committing a sale.
pub struct SaleLedger {
    records: SaleBackend,
    products: Arc<ProductStore>,
    sellers: Arc<SellerStore>,
}

impl SaleLedger {
    pub fn new(records: SaleBackend, products: Arc<ProductStore>, sellers: Arc<SellerStore>) -> Self {
        Self {
            records,
            products,
            sellers,
        }
    }

    /// Record the sale of a registered product.
    ///
    /// Checks, in order: the product exists (`ProductNotFound`), it has not been sold
    /// (`AlreadySold`), and a seller-code reference names a registered seller
    /// (`SellerNotFound`). Account references are recorded without lookup.
    ///
    /// Products and sellers are never removed, so a passed existence check stays valid
    /// until the insert. The insert is the only step that has to be atomic: of several
    /// racing sales for one serial exactly one commits, the rest get `AlreadySold`.
    pub fn record_sale(&self, cmd: RecordSale) -> LedgerResult<Sale> {
        let serial = cmd.serial_number.clone();

        if !self.products.exists(&serial)? {
            debug!(serial_number = %serial, "sale rejected: unknown product");
            return Err(LedgerError::product_not_found(serial.into_inner()));
        }

        if self.records.contains(&serial)? {
            debug!(serial_number = %serial, "sale rejected: already sold");
            return Err(LedgerError::already_sold(serial.into_inner()));
        }

        if let SellerRef::Code(code) = &cmd.seller_ref {
            if !self.sellers.exists(code)? {
                debug!(serial_number = %serial, seller_code = %code, "sale rejected: unknown seller");
                return Err(LedgerError::seller_not_found(code.as_str()));
            }
        }

        let sale = Sale::record(cmd, Utc::now());

        match self.records.insert_if_absent(serial.clone(), sale.clone())? {
            Insertion::Inserted => {
                info!(
                    serial_number = %serial,
                    seller = %sale.seller_ref(),
                    "sale recorded"
                );
                Ok(sale)
            }
            Insertion::AlreadyPresent => {
                debug!(serial_number = %serial, "sale rejected: lost race to concurrent sale");
                Err(LedgerError::already_sold(serial.into_inner()))
            }
        }
    }

    pub fn get_sale(&self, serial: &SerialNumber) -> LedgerResult<Option<Sale>> {
        Ok(self.records.get(serial)?)
    }

    pub fn sale_exists(&self, serial: &SerialNumber) -> LedgerResult<bool> {
        Ok(self.records.contains(serial)?)
    }
}
