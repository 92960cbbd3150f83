//! Position stage: per-book net positions driven by booked trades.

use std::rc::Rc;

use tracing::warn;

use fi_core::products::ProductService;
use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{Position, Trade};

/// Maintains one [`Position`] per bond of the managed ticker.
///
/// Constructed flat: every bond starts at zero in every book. A trade on a
/// bond outside the managed universe is an input error and is dropped.
pub struct PositionService {
    store: ServiceStore<Position>,
}

impl PositionService {
    /// Create a service with a zero position per bond of `ticker`.
    pub fn new(products: &ProductService, ticker: &str) -> Self {
        let store = ServiceStore::new();
        for bond in products.bonds_for_ticker(ticker) {
            store.upsert(bond.product_id.clone(), Position::new(bond));
        }
        Self { store }
    }

    /// Register a listener for position updates.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<Position>>) {
        self.store.add_listener(listener);
    }

    /// Apply a booked trade: add its signed quantity into the trade's book
    /// and fan out the updated position.
    pub fn add_trade(&self, trade: &Trade) {
        let product_id = &trade.product.product_id;
        let Some(mut position) = self.store.get(product_id) else {
            warn!(product_id = %product_id, "trade on unmanaged bond dropped");
            return;
        };

        position.add(trade.book_id.clone(), trade.signed_quantity());
        self.store.upsert(product_id.clone(), position.clone());

        self.store.notify_update(&position);
    }
}

impl Service<Position> for PositionService {
    fn get_data(&self, key: &str) -> Option<Position> {
        self.store.get(key)
    }
}

/// Feeds booked trades into the position service.
pub struct PositionListener {
    service: Rc<PositionService>,
}

impl PositionListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<PositionService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Trade> for PositionListener {
    fn process_update(&self, event: &Trade) {
        self.service.add_trade(event);
    }
}
