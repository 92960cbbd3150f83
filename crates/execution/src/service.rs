//! Execution stage: route generated orders to a venue.
//!
//! The venue is an identity tag, not a connection; it is chosen uniformly
//! at random per order and recorded in the log. Routed orders fan out to
//! the execution history persister and the trade-booking loop-back.

use std::rc::Rc;

use tracing::debug;

use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{ExecutionOrder, Venue};

use crate::algo_exec::AlgoExecution;

/// Caches routed execution orders keyed by product identifier.
pub struct ExecutionService {
    store: ServiceStore<ExecutionOrder>,
}

impl ExecutionService {
    /// Create an empty execution service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
        }
    }

    /// Register a listener for routed orders.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<ExecutionOrder>>) {
        self.store.add_listener(listener);
    }

    /// Route an order to a venue: cache it and fan out as an add event.
    pub fn execute_order(&self, order: ExecutionOrder, venue: Venue) {
        debug!(
            order_id = %order.order_id,
            product_id = %order.product.product_id,
            %venue,
            "routing execution order"
        );
        self.store
            .upsert(order.product.product_id.clone(), order.clone());
        self.store.notify_add(&order);
    }
}

impl Service<ExecutionOrder> for ExecutionService {
    fn get_data(&self, key: &str) -> Option<ExecutionOrder> {
        self.store.get(key)
    }
}

impl Default for ExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds algo-execution output into the execution service, choosing the
/// venue uniformly at random.
pub struct ExecutionListener {
    service: Rc<ExecutionService>,
}

impl ExecutionListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<ExecutionService>) -> Self {
        Self { service }
    }

    fn pick_venue() -> Venue {
        match rand::random::<u8>() % 3 {
            0 => Venue::BrokerTec,
            1 => Venue::Espeed,
            _ => Venue::Cme,
        }
    }
}

impl ServiceListener<AlgoExecution> for ExecutionListener {
    fn process_update(&self, event: &AlgoExecution) {
        self.service
            .execute_order(event.order.clone(), Self::pick_venue());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::{Bond, BondIdType, OrderType, PricingSide};
    use std::cell::RefCell;

    fn order(order_id: &str) -> ExecutionOrder {
        let bond = Bond::new(
            "912810RZ3",
            BondIdType::Cusip,
            "T",
            0.0275,
            NaiveDate::from_ymd_opt(2047, 11, 15).unwrap(),
        );
        ExecutionOrder {
            product: bond,
            side: PricingSide::Offer,
            order_id: order_id.to_string(),
            order_type: OrderType::Ioc,
            price: 100.0,
            visible_quantity: 400_000,
            hidden_quantity: 1_600_000,
            parent_order_id: "N/A".to_string(),
            is_child_order: false,
        }
    }

    struct Capture {
        adds: Rc<RefCell<Vec<ExecutionOrder>>>,
    }

    impl ServiceListener<ExecutionOrder> for Capture {
        fn process_add(&self, event: &ExecutionOrder) {
            self.adds.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_execute_order_caches_and_fans_out() {
        let service = Rc::new(ExecutionService::new());
        let adds = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture { adds: adds.clone() }));

        service.execute_order(order("ORD2047T0000000"), Venue::Cme);

        assert_eq!(adds.borrow().len(), 1);
        let cached = service.get_data("912810RZ3").unwrap();
        assert_eq!(cached.order_id, "ORD2047T0000000");

        // Re-routing the same product replaces the cached order.
        service.execute_order(order("ORD2047T0000001"), Venue::Espeed);
        assert_eq!(service.get_data("912810RZ3").unwrap().order_id, "ORD2047T0000001");
        assert_eq!(adds.borrow().len(), 2);
    }

    #[test]
    fn test_listener_routes_updates() {
        let service = Rc::new(ExecutionService::new());
        let adds = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture { adds: adds.clone() }));

        let listener = ExecutionListener::new(service.clone());
        listener.process_update(&AlgoExecution::new(order("ORD2047T0000000")));
        assert_eq!(adds.borrow().len(), 1);
    }

    #[test]
    fn test_venue_pick_is_always_valid() {
        // Exercise the modulo mapping enough times to hit every branch.
        for _ in 0..100 {
            let venue = ExecutionListener::pick_venue();
            assert!(matches!(venue, Venue::BrokerTec | Venue::Espeed | Venue::Cme));
        }
    }
}
