//! Algo-execution stage: fire an order when the spread is tight.
//!
//! An execution order is emitted iff `best_offer - best_bid <= 1/128`,
//! the tightest spreads the depth feed produces. A crossed book (negative
//! spread) satisfies the trigger too. A stage-local counter, incremented
//! once per emission, alternates the side (even emissions lift the offer)
//! and numbers the order ids.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{ExecutionOrder, OrderType, PricingSide};
use fi_market_data::orderbook::OrderBook;

/// Spread at or below which an execution order is generated.
const SPREAD_TRIGGER: f64 = 1.0 / 128.0;

/// Of the total quantity, one fifth is shown; the rest is hidden.
const VISIBLE_DIVISOR: i64 = 5;

/// An execution order generated by the algo, ready for routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoExecution {
    /// The generated order.
    pub order: ExecutionOrder,
}

impl AlgoExecution {
    /// Wrap an execution order.
    pub fn new(order: ExecutionOrder) -> Self {
        Self { order }
    }
}

/// Generates execution orders from depth snapshots.
pub struct AlgoExecutionService {
    store: ServiceStore<AlgoExecution>,
    counter: Cell<u64>,
}

impl AlgoExecutionService {
    /// Create an empty algo-execution service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
            counter: Cell::new(0),
        }
    }

    /// Register a listener for generated orders.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<AlgoExecution>>) {
        self.store.add_listener(listener);
    }

    /// Number of orders generated so far.
    pub fn emitted(&self) -> u64 {
        self.counter.get()
    }

    /// Inspect the book and emit an execution order if the spread trigger
    /// is satisfied; otherwise do nothing for this tick.
    pub fn add_order(&self, book: &OrderBook) {
        let Some(best) = book.best_bid_offer() else {
            debug!(
                product_id = %book.product.product_id,
                "book has an empty side, no execution"
            );
            return;
        };
        if best.spread() > SPREAD_TRIGGER {
            return;
        }

        let counter = self.counter.get();
        let side = if counter % 2 == 0 {
            PricingSide::Offer
        } else {
            PricingSide::Bid
        };
        let top = match side {
            PricingSide::Offer => best.offer,
            PricingSide::Bid => best.bid,
        };

        let all_quantity = top.quantity;
        let visible_quantity = all_quantity / VISIBLE_DIVISOR;
        let hidden_quantity = all_quantity - visible_quantity;

        let order = ExecutionOrder {
            product: book.product.clone(),
            side,
            order_id: format!(
                "ORD{}{}{:07}",
                book.product.maturity_year(),
                book.product.ticker,
                counter
            ),
            order_type: OrderType::Ioc,
            price: top.price,
            visible_quantity,
            hidden_quantity,
            parent_order_id: "N/A".to_string(),
            is_child_order: false,
        };

        let algo_execution = AlgoExecution::new(order);
        self.store
            .upsert(book.product.product_id.clone(), algo_execution.clone());
        self.counter.set(counter + 1);

        self.store.notify_update(&algo_execution);
    }
}

impl Service<AlgoExecution> for AlgoExecutionService {
    fn get_data(&self, key: &str) -> Option<AlgoExecution> {
        self.store.get(key)
    }
}

impl Default for AlgoExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds market-data output into the algo-execution service.
pub struct AlgoExecutionListener {
    service: Rc<AlgoExecutionService>,
}

impl AlgoExecutionListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<AlgoExecutionService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<OrderBook> for AlgoExecutionListener {
    fn process_add(&self, event: &OrderBook) {
        self.service.add_order(event);
    }
}
