//! Position history persister.
//!
//! Each position update writes one row per treasury book plus an
//! `AGGREGATED` row. Keyed by bond.

use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::Position;

/// Books expanded into rows on every update.
const BOOKS: [&str; 3] = ["TRSY1", "TRSY2", "TRSY3"];

/// Caches the latest persisted position per bond and forwards each update
/// to the output connector.
pub struct PositionHistoryService {
    store: ServiceStore<Position>,
    connector: Rc<PositionHistoryConnector>,
}

impl PositionHistoryService {
    /// Create a service writing through `connector`.
    pub fn new(connector: Rc<PositionHistoryConnector>) -> Self {
        Self {
            store: ServiceStore::new(),
            connector,
        }
    }

    /// Cache the position under `key` and append it to the output file.
    pub fn persist(&self, key: impl Into<String>, position: &Position) {
        self.store.upsert(key, position.clone());
        if let Err(e) = self.connector.publish(position) {
            warn!(error = %e, "position history write failed");
        }
    }
}

impl Service<Position> for PositionHistoryService {
    fn get_data(&self, key: &str) -> Option<Position> {
        self.store.get(key)
    }
}

/// Appends position rows to the position output file.
///
/// Row schema: `Time,BondIDType,BondID,BookId,Position`.
pub struct PositionHistoryConnector {
    sink: RowFileSink,
}

impl PositionHistoryConnector {
    /// Create (or truncate) the position output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(path, "BondIDType,BondID,BookId,Position")?,
        })
    }
}

impl Connector<Position> for PositionHistoryConnector {
    fn publish(&self, event: &Position) -> Result<()> {
        let bond = &event.product;
        for book in BOOKS {
            self.sink.write_row(&format!(
                "{},{},{},{}",
                bond.id_type,
                bond.product_id,
                book,
                event.position(book)
            ))?;
        }
        self.sink.write_row(&format!(
            "{},{},AGGREGATED,{}",
            bond.id_type,
            bond.product_id,
            event.aggregate_position()
        ))?;
        Ok(())
    }
}

/// Feeds position-stage updates into the persister.
pub struct PositionHistoryListener {
    service: Rc<PositionHistoryService>,
}

impl PositionHistoryListener {
    /// Create a listener targeting the given persister.
    pub fn new(service: Rc<PositionHistoryService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Position> for PositionHistoryListener {
    fn process_update(&self, event: &Position) {
        self.service.persist(event.product.product_id.clone(), event);
    }
}
