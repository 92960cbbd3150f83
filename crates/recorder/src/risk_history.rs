//! Risk history persister.
//!
//! One service carries both keyings: per-bond PV01 rows keyed by product
//! id, and per-sector rows keyed by sector name with the literal id type
//! `Bucketed Sector`. On every per-bond risk update the listener also
//! locates the bond's sector through a preconstructed bond -> sector index,
//! has the risk service refresh that sector, and persists the sector row.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use fi_booking::risk::RiskService;
use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::{Bond, BucketedSector, Pv01};

/// Caches persisted per-bond and per-sector risk and forwards each update
/// to the output connector.
pub struct RiskHistoryService {
    store: ServiceStore<Pv01<Bond>>,
    sector_store: RefCell<HashMap<String, Pv01<BucketedSector>>>,
    connector: Rc<RiskHistoryConnector>,
}

impl RiskHistoryService {
    /// Create a service writing through `connector`.
    pub fn new(connector: Rc<RiskHistoryConnector>) -> Self {
        Self {
            store: ServiceStore::new(),
            sector_store: RefCell::new(HashMap::new()),
            connector,
        }
    }

    /// Cache a per-bond risk value and append it to the output file.
    pub fn persist_bond(&self, key: impl Into<String>, risk: &Pv01<Bond>) {
        self.store.upsert(key, risk.clone());
        if let Err(e) = self.connector.publish(risk) {
            warn!(error = %e, "risk history write failed");
        }
    }

    /// Cache a sector risk value and append it to the output file.
    pub fn persist_sector(&self, key: impl Into<String>, risk: &Pv01<BucketedSector>) {
        self.sector_store.borrow_mut().insert(key.into(), risk.clone());
        if let Err(e) = self.connector.publish(risk) {
            warn!(error = %e, "sector risk history write failed");
        }
    }

    /// The latest persisted sector risk, by sector name.
    pub fn sector_data(&self, name: &str) -> Option<Pv01<BucketedSector>> {
        self.sector_store.borrow().get(name).cloned()
    }
}

impl Service<Pv01<Bond>> for RiskHistoryService {
    fn get_data(&self, key: &str) -> Option<Pv01<Bond>> {
        self.store.get(key)
    }
}

/// Appends risk rows to the risk output file.
///
/// Row schema: `Time,ProductIDType,ProductID,PV01,Quantity`, with sector
/// rows carrying the literal id type `Bucketed Sector`.
pub struct RiskHistoryConnector {
    sink: RowFileSink,
}

impl RiskHistoryConnector {
    /// Create (or truncate) the risk output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(path, "ProductIDType,ProductID,PV01,Quantity")?,
        })
    }
}

impl Connector<Pv01<Bond>> for RiskHistoryConnector {
    fn publish(&self, event: &Pv01<Bond>) -> Result<()> {
        self.sink.write_row(&format!(
            "{},{},{:.6},{}",
            event.product.id_type, event.product.product_id, event.pv01, event.quantity
        ))
    }
}

impl Connector<Pv01<BucketedSector>> for RiskHistoryConnector {
    fn publish(&self, event: &Pv01<BucketedSector>) -> Result<()> {
        self.sink.write_row(&format!(
            "Bucketed Sector,{},{:.6},{}",
            event.product.name, event.pv01, event.quantity
        ))
    }
}

/// Feeds risk-stage updates into the persister, expanding each per-bond
/// update with its containing sector's refreshed risk.
pub struct RiskHistoryListener {
    service: Rc<RiskHistoryService>,
    risk_service: Rc<RiskService>,
    buckets: Vec<BucketedSector>,
    /// product id -> index into `buckets`.
    sector_index: HashMap<String, usize>,
}

impl RiskHistoryListener {
    /// Create a listener over the given sector partition.
    pub fn new(
        service: Rc<RiskHistoryService>,
        risk_service: Rc<RiskService>,
        buckets: Vec<BucketedSector>,
    ) -> Self {
        let mut sector_index = HashMap::new();
        for (index, sector) in buckets.iter().enumerate() {
            for bond in &sector.products {
                sector_index.insert(bond.product_id.clone(), index);
            }
        }
        Self {
            service,
            risk_service,
            buckets,
            sector_index,
        }
    }
}

impl ServiceListener<Pv01<Bond>> for RiskHistoryListener {
    fn process_update(&self, event: &Pv01<Bond>) {
        let product_id = &event.product.product_id;
        self.service.persist_bond(product_id.clone(), event);

        let Some(&index) = self.sector_index.get(product_id) else {
            warn!(product_id = %product_id, "risk update for bond outside every sector");
            return;
        };
        let sector = &self.buckets[index];

        self.risk_service.update_bucketed_risk(sector);
        match self.risk_service.bucketed_risk(sector) {
            Some(sector_risk) => self.service.persist_sector(sector.name.clone(), &sector_risk),
            None => warn!(sector = %sector.name, "sector risk missing after refresh"),
        }
    }
}
