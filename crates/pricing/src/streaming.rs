//! Streaming stage: republish algo streams as plain price streams.
//!
//! A pure pass-through. Its existence lets the streaming history persister
//! attach without coupling to the algo stage.

use std::rc::Rc;

use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::PriceStream;

use crate::algo_stream::AlgoStream;

/// Caches published price streams keyed by product identifier.
pub struct StreamingService {
    store: ServiceStore<PriceStream>,
}

impl StreamingService {
    /// Create an empty streaming service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
        }
    }

    /// Register a listener for published streams.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<PriceStream>>) {
        self.store.add_listener(listener);
    }

    /// Cache the stream and fan out as an add event.
    pub fn publish_price(&self, stream: PriceStream) {
        self.store
            .upsert(stream.product.product_id.clone(), stream.clone());
        self.store.notify_add(&stream);
    }
}

impl Service<PriceStream> for StreamingService {
    fn get_data(&self, key: &str) -> Option<PriceStream> {
        self.store.get(key)
    }
}

impl Default for StreamingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds algo-streaming output into the streaming service.
pub struct StreamingListener {
    service: Rc<StreamingService>,
}

impl StreamingListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<StreamingService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<AlgoStream> for StreamingListener {
    fn process_update(&self, event: &AlgoStream) {
        self.service.publish_price(event.stream.clone());
    }
}
