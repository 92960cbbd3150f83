//! Inquiry history persister.
//!
//! Keyed by bond id: a later inquiry on the same bond replaces the cached
//! entry, but every lifecycle update is still appended to the output file.

use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::{fractional, Inquiry};

/// Caches the latest persisted inquiry per bond and forwards each update
/// to the output connector.
pub struct InquiryHistoryService {
    store: ServiceStore<Inquiry>,
    connector: Rc<InquiryHistoryConnector>,
}

impl InquiryHistoryService {
    /// Create a service writing through `connector`.
    pub fn new(connector: Rc<InquiryHistoryConnector>) -> Self {
        Self {
            store: ServiceStore::new(),
            connector,
        }
    }

    /// Cache the inquiry under `key` and append it to the output file.
    pub fn persist(&self, key: impl Into<String>, inquiry: &Inquiry) {
        self.store.upsert(key, inquiry.clone());
        if let Err(e) = self.connector.publish(inquiry) {
            warn!(error = %e, "inquiry history write failed");
        }
    }
}

impl Service<Inquiry> for InquiryHistoryService {
    fn get_data(&self, key: &str) -> Option<Inquiry> {
        self.store.get(key)
    }
}

/// Appends inquiry rows to the inquiry output file.
///
/// Row schema: `Time,InquiryID,BondIDType,BondID,Side,Quantity,Price,State`
/// with the price in fractional notation.
pub struct InquiryHistoryConnector {
    sink: RowFileSink,
}

impl InquiryHistoryConnector {
    /// Create (or truncate) the inquiry output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(path, "InquiryID,BondIDType,BondID,Side,Quantity,Price,State")?,
        })
    }
}

impl Connector<Inquiry> for InquiryHistoryConnector {
    fn publish(&self, event: &Inquiry) -> Result<()> {
        self.sink.write_row(&format!(
            "{},{},{},{},{},{},{}",
            event.inquiry_id,
            event.product.id_type,
            event.product.product_id,
            event.side,
            event.quantity,
            fractional::encode(event.price),
            event.state
        ))
    }
}

/// Feeds inquiry-stage updates into the persister.
pub struct InquiryHistoryListener {
    service: Rc<InquiryHistoryService>,
}

impl InquiryHistoryListener {
    /// Create a listener targeting the given persister.
    pub fn new(service: Rc<InquiryHistoryService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Inquiry> for InquiryHistoryListener {
    fn process_update(&self, event: &Inquiry) {
        self.service.persist(event.product.product_id.clone(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::{Bond, BondIdType, InquiryState, Side};

    fn inquiry(id: &str, state: InquiryState) -> Inquiry {
        let bond = Bond::new(
            "912810RZ3",
            BondIdType::Cusip,
            "T",
            0.0275,
            NaiveDate::from_ymd_opt(2047, 11, 15).unwrap(),
        );
        Inquiry {
            inquiry_id: id.to_string(),
            product: bond,
            side: Side::Buy,
            quantity: 2_000_000,
            price: 100.0,
            state,
        }
    }

    #[test]
    fn test_row_schema_includes_side_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allinquiry.out");
        let connector = Rc::new(InquiryHistoryConnector::create(&path).unwrap());
        let service = Rc::new(InquiryHistoryService::new(connector));
        let listener = InquiryHistoryListener::new(service.clone());

        listener.process_update(&inquiry("INQ001", InquiryState::Received));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Time,InquiryID,BondIDType,BondID,Side,Quantity,Price,State");
        assert!(lines[1].ends_with(",INQ001,CUSIP,912810RZ3,BUY,2000000,100-000,RECEIVED"));
    }

    /// Two inquiries on one bond overwrite each other in the cache, but
    /// both still reach the file.
    #[test]
    fn test_keyed_by_bond_but_every_update_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allinquiry.out");
        let connector = Rc::new(InquiryHistoryConnector::create(&path).unwrap());
        let service = Rc::new(InquiryHistoryService::new(connector));
        let listener = InquiryHistoryListener::new(service.clone());

        listener.process_update(&inquiry("INQ001", InquiryState::Done));
        listener.process_update(&inquiry("INQ002", InquiryState::Received));

        let cached = service.get_data("912810RZ3").unwrap();
        assert_eq!(cached.inquiry_id, "INQ002");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
