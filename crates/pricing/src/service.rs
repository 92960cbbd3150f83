//! Pricing stage: price ingress and fan-out.
//!
//! No computation happens here. Each record upserts the keyed cache and is
//! fanned out as an add event to the algo-streaming and GUI listeners.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fi_core::products::ProductService;
use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{fractional, Price};

/// Caches the latest price per product and fans out to listeners.
pub struct PricingService {
    store: ServiceStore<Price>,
}

impl PricingService {
    /// Create an empty pricing service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
        }
    }

    /// Register a listener for price events.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<Price>>) {
        self.store.add_listener(listener);
    }
}

impl Service<Price> for PricingService {
    fn get_data(&self, key: &str) -> Option<Price> {
        self.store.get(key)
    }

    fn on_message(&self, event: Price) {
        self.store
            .upsert(event.product.product_id.clone(), event.clone());
        self.store.notify_add(&event);
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads price records from a file and feeds them to the pricing service.
///
/// Record grammar (header row discarded): `BondIDType,BondID,Price,Spread`,
/// with price and spread in fractional notation.
pub struct PricingFileConnector {
    path: PathBuf,
    service: Rc<PricingService>,
    products: Rc<ProductService>,
}

impl PricingFileConnector {
    /// Create a connector for the given input file.
    pub fn new(
        path: impl Into<PathBuf>,
        service: Rc<PricingService>,
        products: Rc<ProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            service,
            products,
        }
    }

    /// Read every record and deliver it via `on_message`. Returns the number
    /// of prices delivered.
    pub fn run(&self) -> Result<u64> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open price input {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let mut delivered = 0u64;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.context("failed to read price line")?;
            if line_num == 0 || line.trim().is_empty() {
                continue; // header
            }
            match self.parse_row(&line) {
                Some(price) => {
                    self.service.on_message(price);
                    delivered += 1;
                }
                None => warn!(line_num = line_num + 1, "skipping bad price row"),
            }
        }

        info!(path = %self.path.display(), prices = delivered, "price ingest complete");
        Ok(delivered)
    }

    fn parse_row(&self, line: &str) -> Option<Price> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return None;
        }

        let product_id = fields[1];
        let bond = match self.products.bond(product_id) {
            Some(bond) => bond,
            None => {
                warn!(product_id, "unknown bond in price input");
                return None;
            }
        };
        let mid = fractional::decode(fields[2]).ok()?;
        let spread = fractional::decode(fields[3]).ok()?;

        Some(Price::new(bond, mid, spread))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::{Bond, BondIdType};
    use std::cell::RefCell;
    use std::io::Write;

    fn products() -> Rc<ProductService> {
        let products = ProductService::new();
        products.add(Bond::new(
            "9128283G3",
            BondIdType::Cusip,
            "T",
            0.0175,
            NaiveDate::from_ymd_opt(2020, 11, 15).unwrap(),
        ));
        Rc::new(products)
    }

    struct CountingListener {
        adds: Rc<RefCell<u32>>,
    }

    impl ServiceListener<Price> for CountingListener {
        fn process_add(&self, _event: &Price) {
            *self.adds.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_on_message_upserts_and_notifies() {
        let service = PricingService::new();
        let adds = Rc::new(RefCell::new(0));
        service.add_listener(Rc::new(CountingListener { adds: adds.clone() }));

        let bond = products().bond("9128283G3").unwrap();
        service.on_message(Price::new(bond, 99.5, 1.0 / 128.0));

        assert_eq!(*adds.borrow(), 1);
        let cached = service.get_data("9128283G3").unwrap();
        assert_eq!(cached.mid, 99.5);
    }

    #[test]
    fn test_connector_parses_fractional_prices() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "BondIDType,BondID,Price,Spread\n\
             CUSIP,9128283G3,99-293,0-002\n\
             CUSIP,9128283G3,100-00+,0-00+\n"
        )
        .unwrap();

        let service = Rc::new(PricingService::new());
        let connector = PricingFileConnector::new(f.path(), service.clone(), products());
        assert_eq!(connector.run().unwrap(), 2);

        let cached = service.get_data("9128283G3").unwrap();
        assert_eq!(cached.mid, 100.015625);
        assert_eq!(cached.spread, 1.0 / 64.0);
    }

    #[test]
    fn test_connector_skips_unknown_bond() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "BondIDType,BondID,Price,Spread\n\
             CUSIP,NOTABOND,99-293,0-002\n"
        )
        .unwrap();

        let service = Rc::new(PricingService::new());
        let connector = PricingFileConnector::new(f.path(), service.clone(), products());
        assert_eq!(connector.run().unwrap(), 0);
    }
}
