//! Throttled GUI price publisher.
//!
//! Prices stream far faster than a screen needs them. The GUI listener
//! forwards a price only when the throttle interval has elapsed since the
//! last publication and the lifetime publication cap has not been reached;
//! everything else is dropped, never queued. Gating uses monotonic time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::sink::RowFileSink;
use fi_core::types::{fractional, Price};

/// Caches throttled GUI prices and publishes them through a connector.
pub struct GuiService {
    store: ServiceStore<Price>,
    connector: Rc<dyn Connector<Price>>,
    throttle_interval: Duration,
    max_publications: u32,
}

impl GuiService {
    /// Create a GUI service publishing through `connector`.
    pub fn new(
        throttle_interval: Duration,
        max_publications: u32,
        connector: Rc<dyn Connector<Price>>,
    ) -> Self {
        Self {
            store: ServiceStore::new(),
            connector,
            throttle_interval,
            max_publications,
        }
    }

    /// The minimum interval between publications.
    pub fn throttle_interval(&self) -> Duration {
        self.throttle_interval
    }

    /// The lifetime publication cap.
    pub fn max_publications(&self) -> u32 {
        self.max_publications
    }

    /// Cache the price and publish it through the connector.
    pub fn add_price(&self, price: &Price) {
        self.store
            .upsert(price.product.product_id.clone(), price.clone());
        if let Err(e) = self.connector.publish(price) {
            warn!(error = %e, "GUI publish failed");
        }
    }
}

impl Service<Price> for GuiService {
    fn get_data(&self, key: &str) -> Option<Price> {
        self.store.get(key)
    }
}

/// Throttles pricing-stage output into the GUI service.
pub struct GuiListener {
    service: Rc<GuiService>,
    last_publish: Cell<Instant>,
    published: Cell<u32>,
}

impl GuiListener {
    /// Create a listener. The throttle clock starts now, so the first
    /// publication happens once a full interval has elapsed.
    pub fn new(service: Rc<GuiService>) -> Self {
        Self {
            service,
            last_publish: Cell::new(Instant::now()),
            published: Cell::new(0),
        }
    }

    /// Number of prices published so far.
    pub fn published(&self) -> u32 {
        self.published.get()
    }
}

impl ServiceListener<Price> for GuiListener {
    fn process_add(&self, event: &Price) {
        let now = Instant::now();
        if now.duration_since(self.last_publish.get()) >= self.service.throttle_interval()
            && self.published.get() < self.service.max_publications()
        {
            self.service.add_price(event);
            self.last_publish.set(now);
            self.published.set(self.published.get() + 1);
        }
    }
}

/// Publish connector writing throttled prices to the GUI output file.
///
/// Row schema: `Time,BondIDType,BondID,Price` with the mid in fractional
/// notation.
pub struct GuiFileConnector {
    sink: RowFileSink,
}

impl GuiFileConnector {
    /// Create (or truncate) the GUI output file.
    pub fn create(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        Ok(Self {
            sink: RowFileSink::create(path, "BondIDType,BondID,Price")?,
        })
    }
}

impl Connector<Price> for GuiFileConnector {
    fn publish(&self, event: &Price) -> anyhow::Result<()> {
        self.sink.write_row(&format!(
            "{},{},{}",
            event.product.id_type,
            event.product.product_id,
            fractional::encode(event.mid)
        ))
    }
}
