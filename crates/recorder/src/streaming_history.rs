//! Streaming history persister. Keyed by bond.

use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::PriceStream;

/// Caches the latest persisted stream per bond and forwards each update to
/// the output connector.
pub struct StreamingHistoryService {
    store: ServiceStore<PriceStream>,
    connector: Rc<StreamingHistoryConnector>,
}

impl StreamingHistoryService {
    /// Create a service writing through `connector`.
    pub fn new(connector: Rc<StreamingHistoryConnector>) -> Self {
        Self {
            store: ServiceStore::new(),
            connector,
        }
    }

    /// Cache the stream under `key` and append it to the output file.
    pub fn persist(&self, key: impl Into<String>, stream: &PriceStream) {
        self.store.upsert(key, stream.clone());
        if let Err(e) = self.connector.publish(stream) {
            warn!(error = %e, "streaming history write failed");
        }
    }
}

impl Service<PriceStream> for StreamingHistoryService {
    fn get_data(&self, key: &str) -> Option<PriceStream> {
        self.store.get(key)
    }
}

/// Appends stream rows to the streaming output file.
///
/// Row schema: `Time,BondIDType,BondID,BidPrice,BidVisibleQuantity,
/// BidHiddenQuantity,OfferPrice,OfferVisibleQuantity,OfferHiddenQuantity`.
pub struct StreamingHistoryConnector {
    sink: RowFileSink,
}

impl StreamingHistoryConnector {
    /// Create (or truncate) the streaming output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(
                path,
                "BondIDType,BondID,BidPrice,BidVisibleQuantity,BidHiddenQuantity,\
                 OfferPrice,OfferVisibleQuantity,OfferHiddenQuantity",
            )?,
        })
    }
}

impl Connector<PriceStream> for StreamingHistoryConnector {
    fn publish(&self, event: &PriceStream) -> Result<()> {
        let bid = &event.bid_order;
        let offer = &event.offer_order;
        self.sink.write_row(&format!(
            "{},{},{:.6},{},{},{:.6},{},{}",
            event.product.id_type,
            event.product.product_id,
            bid.price,
            bid.visible_quantity,
            bid.hidden_quantity,
            offer.price,
            offer.visible_quantity,
            offer.hidden_quantity
        ))
    }
}

/// Feeds streaming-stage output into the persister.
pub struct StreamingHistoryListener {
    service: Rc<StreamingHistoryService>,
}

impl StreamingHistoryListener {
    /// Create a listener targeting the given persister.
    pub fn new(service: Rc<StreamingHistoryService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<PriceStream> for StreamingHistoryListener {
    fn process_add(&self, event: &PriceStream) {
        self.service.persist(event.product.product_id.clone(), event);
    }
}
