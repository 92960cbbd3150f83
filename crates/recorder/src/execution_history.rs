//! Execution history persister. Keyed by bond.

use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::{fractional, ExecutionOrder};

/// Caches the latest persisted order per bond and forwards each update to
/// the output connector.
pub struct ExecutionHistoryService {
    store: ServiceStore<ExecutionOrder>,
    connector: Rc<ExecutionHistoryConnector>,
}

impl ExecutionHistoryService {
    /// Create a service writing through `connector`.
    pub fn new(connector: Rc<ExecutionHistoryConnector>) -> Self {
        Self {
            store: ServiceStore::new(),
            connector,
        }
    }

    /// Cache the order under `key` and append it to the output file.
    pub fn persist(&self, key: impl Into<String>, order: &ExecutionOrder) {
        self.store.upsert(key, order.clone());
        if let Err(e) = self.connector.publish(order) {
            warn!(error = %e, "execution history write failed");
        }
    }
}

impl Service<ExecutionOrder> for ExecutionHistoryService {
    fn get_data(&self, key: &str) -> Option<ExecutionOrder> {
        self.store.get(key)
    }
}

/// Appends execution rows to the execution output file.
///
/// Row schema: `Time,OrderType,OrderID,BondIDType,BondID,Side,
/// VisibleQuantity,HiddenQuantity,Price,IsChildOrder,ParentOrderId`, with
/// the price in fractional notation.
pub struct ExecutionHistoryConnector {
    sink: RowFileSink,
}

impl ExecutionHistoryConnector {
    /// Create (or truncate) the execution output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(
                path,
                "OrderType,OrderID,BondIDType,BondID,Side,VisibleQuantity,HiddenQuantity,\
                 Price,IsChildOrder,ParentOrderId",
            )?,
        })
    }
}

impl Connector<ExecutionOrder> for ExecutionHistoryConnector {
    fn publish(&self, event: &ExecutionOrder) -> Result<()> {
        self.sink.write_row(&format!(
            "{},{},{},{},{},{},{},{},{},{}",
            event.order_type,
            event.order_id,
            event.product.id_type,
            event.product.product_id,
            event.side,
            event.visible_quantity,
            event.hidden_quantity,
            fractional::encode(event.price),
            event.is_child_order,
            event.parent_order_id
        ))
    }
}

/// Feeds execution-stage output into the persister.
pub struct ExecutionHistoryListener {
    service: Rc<ExecutionHistoryService>,
}

impl ExecutionHistoryListener {
    /// Create a listener targeting the given persister.
    pub fn new(service: Rc<ExecutionHistoryService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<ExecutionOrder> for ExecutionHistoryListener {
    fn process_add(&self, event: &ExecutionOrder) {
        self.service.persist(event.product.product_id.clone(), event);
    }
}
