//! Market data service: keyed order-book cache with depth aggregation.

use std::rc::Rc;

use fi_core::service::{Service, ServiceListener, ServiceStore};

use crate::orderbook::{BidOffer, OrderBook};

/// Caches the latest depth snapshot per product and fans out to listeners.
pub struct MarketDataService {
    store: ServiceStore<OrderBook>,
}

impl MarketDataService {
    /// Create an empty market data service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
        }
    }

    /// Register a listener for order-book events.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<OrderBook>>) {
        self.store.add_listener(listener);
    }

    /// Top of book for a product, if a snapshot with both sides is cached.
    pub fn best_bid_offer(&self, product_id: &str) -> Option<BidOffer> {
        self.store.get(product_id)?.best_bid_offer()
    }

    /// Collapse the cached book's sides by price, replace the cached book
    /// with the aggregated one, and return it.
    pub fn aggregate_depth(&self, product_id: &str) -> Option<OrderBook> {
        let aggregated = self.store.get(product_id)?.aggregated();
        self.store.upsert(product_id, aggregated.clone());
        Some(aggregated)
    }
}

impl Service<OrderBook> for MarketDataService {
    fn get_data(&self, key: &str) -> Option<OrderBook> {
        self.store.get(key)
    }

    /// Upsert the snapshot and fan out as an add event.
    fn on_message(&self, event: OrderBook) {
        self.store
            .upsert(event.product.product_id.clone(), event.clone());
        self.store.notify_add(&event);
    }
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self::new()
    }
}
