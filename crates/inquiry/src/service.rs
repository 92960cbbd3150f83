//! Inquiry service and its internal quoting listener.
//!
//! The lifecycle is a loop between the service and its connector:
//!
//! ```text
//! RECEIVED --send_quote--> connector --> QUOTED --> DONE
//!     |
//!     +--reject_inquiry--> connector --> REJECTED
//! ```
//!
//! `send_quote` publishes the inquiry with the *stored* state (normally
//! RECEIVED); the QUOTED and DONE transitions happen inside the connector's
//! publish, which re-emits each transition through `on_message`. Listeners
//! observing the re-emissions see non-RECEIVED states and do not quote
//! again, so the machine terminates.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;

use fi_core::service::{Connector, Service, ServiceListener, ServiceStore};
use fi_core::types::{Inquiry, InquiryState};

/// Price quoted back on every received inquiry.
pub const QUOTE_PRICE: f64 = 100.0;

/// Caches inquiries by inquiry id and drives their lifecycle through the
/// stage connector.
pub struct InquiryService {
    store: ServiceStore<Inquiry>,
    // Weak: the connector owns the service, not the other way around.
    connector: RefCell<Option<Weak<dyn Connector<Inquiry>>>>,
}

impl InquiryService {
    /// Create a service with no connector attached.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
            connector: RefCell::new(None),
        }
    }

    /// Attach the stage connector quotes are published through.
    pub fn set_connector(&self, connector: &Rc<dyn Connector<Inquiry>>) {
        *self.connector.borrow_mut() = Some(Rc::downgrade(connector));
    }

    /// Register a listener for inquiry updates.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<Inquiry>>) {
        self.store.add_listener(listener);
    }

    /// Publish a quote for a stored inquiry at the given price. The
    /// outbound inquiry carries the stored state; the connector performs
    /// the QUOTED/DONE transitions.
    pub fn send_quote(&self, inquiry_id: &str, price: f64) {
        let Some(inquiry) = self.store.get(inquiry_id) else {
            warn!(inquiry_id, "quote requested for unknown inquiry");
            return;
        };
        self.publish(&inquiry.with_price(price));
    }

    /// Reject a stored inquiry.
    pub fn reject_inquiry(&self, inquiry_id: &str) {
        let Some(inquiry) = self.store.get(inquiry_id) else {
            warn!(inquiry_id, "rejection requested for unknown inquiry");
            return;
        };
        self.publish(&inquiry.with_state(InquiryState::Rejected));
    }

    fn publish(&self, inquiry: &Inquiry) {
        let connector = self.connector.borrow().as_ref().and_then(Weak::upgrade);
        match connector {
            Some(connector) => {
                if let Err(e) = connector.publish(inquiry) {
                    warn!(inquiry_id = %inquiry.inquiry_id, error = %e, "inquiry publish failed");
                }
            }
            None => warn!(
                inquiry_id = %inquiry.inquiry_id,
                "no connector attached, inquiry not published"
            ),
        }
    }
}

impl Service<Inquiry> for InquiryService {
    fn get_data(&self, key: &str) -> Option<Inquiry> {
        self.store.get(key)
    }

    /// Upsert the inquiry and fan out as an update event. Both fresh
    /// client inquiries and connector re-emissions arrive here.
    fn on_message(&self, event: Inquiry) {
        self.store.upsert(event.inquiry_id.clone(), event.clone());
        self.store.notify_update(&event);
    }
}

impl Default for InquiryService {
    fn default() -> Self {
        Self::new()
    }
}

/// The service-internal listener that quotes every received inquiry.
pub struct InquiryListener {
    service: Rc<InquiryService>,
}

impl InquiryListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<InquiryService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Inquiry> for InquiryListener {
    fn process_update(&self, event: &Inquiry) {
        if event.state == InquiryState::Received {
            self.service.send_quote(&event.inquiry_id, QUOTE_PRICE);
        }
    }
}
