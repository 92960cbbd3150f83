//! Product reference-data service.
//!
//! Owns the static bond universe consulted by the ingress connectors to
//! resolve a product identifier into a full [`Bond`] record. A lookup miss
//! is an input error: connectors warn and drop the record rather than
//! fabricating a default bond.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::service::Service;
use crate::types::Bond;

/// Keyed cache of bond reference data.
pub struct ProductService {
    bonds: RefCell<HashMap<String, Bond>>,
}

impl ProductService {
    /// Create an empty reference-data service.
    pub fn new() -> Self {
        Self {
            bonds: RefCell::new(HashMap::new()),
        }
    }

    /// Add a bond to the universe, replacing any previous record with the
    /// same product id.
    pub fn add(&self, bond: Bond) {
        self.bonds
            .borrow_mut()
            .insert(bond.product_id.clone(), bond);
    }

    /// Bond record for a product id.
    pub fn bond(&self, product_id: &str) -> Option<Bond> {
        self.bonds.borrow().get(product_id).cloned()
    }

    /// All bonds with the given ticker, sorted by maturity.
    pub fn bonds_for_ticker(&self, ticker: &str) -> Vec<Bond> {
        let mut bonds: Vec<Bond> = self
            .bonds
            .borrow()
            .values()
            .filter(|b| b.ticker == ticker)
            .cloned()
            .collect();
        bonds.sort_by_key(|b| b.maturity);
        bonds
    }

    /// Number of bonds in the universe.
    pub fn len(&self) -> usize {
        self.bonds.borrow().len()
    }

    /// Whether the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.bonds.borrow().is_empty()
    }
}

impl Service<Bond> for ProductService {
    fn get_data(&self, key: &str) -> Option<Bond> {
        self.bond(key)
    }

    fn on_message(&self, event: Bond) {
        self.add(event);
    }
}

impl Default for ProductService {
    fn default() -> Self {
        Self::new()
    }
}
