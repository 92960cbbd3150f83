//! Algo-streaming stage: turn prices into two-way streams.
//!
//! For each incoming price the stage quotes bid `mid - spread/2` and offer
//! `mid + spread/2`. Visible quantity alternates between 1M and 2M on a
//! stage-local counter (even inputs quote 1M), hidden quantity is twice the
//! visible.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{Price, PriceStream, PriceStreamOrder, PricingSide};

/// Visible quantity quoted on even inputs.
const EVEN_VISIBLE_QUANTITY: i64 = 1_000_000;
/// Visible quantity quoted on odd inputs.
const ODD_VISIBLE_QUANTITY: i64 = 2_000_000;

/// A price stream produced by the algo, ready for republication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoStream {
    /// The generated two-way stream.
    pub stream: PriceStream,
}

impl AlgoStream {
    /// Wrap a price stream.
    pub fn new(stream: PriceStream) -> Self {
        Self { stream }
    }
}

/// Builds and caches algo streams keyed by product identifier.
pub struct AlgoStreamingService {
    store: ServiceStore<AlgoStream>,
    counter: Cell<u64>,
}

impl AlgoStreamingService {
    /// Create an empty algo-streaming service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
            counter: Cell::new(0),
        }
    }

    /// Register a listener for algo-stream events.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<AlgoStream>>) {
        self.store.add_listener(listener);
    }

    /// Build the two-way stream for a price, cache it, and fan out as an
    /// update event.
    pub fn add_stream(&self, price: &Price) {
        let visible = if self.counter.get() % 2 == 0 {
            EVEN_VISIBLE_QUANTITY
        } else {
            ODD_VISIBLE_QUANTITY
        };
        let hidden = 2 * visible;

        let bid_order = PriceStreamOrder::new(price.bid(), visible, hidden, PricingSide::Bid);
        let offer_order = PriceStreamOrder::new(price.offer(), visible, hidden, PricingSide::Offer);
        let algo_stream = AlgoStream::new(PriceStream::new(
            price.product.clone(),
            bid_order,
            offer_order,
        ));

        self.store
            .upsert(price.product.product_id.clone(), algo_stream.clone());
        self.counter.set(self.counter.get() + 1);

        self.store.notify_update(&algo_stream);
    }
}

impl Service<AlgoStream> for AlgoStreamingService {
    fn get_data(&self, key: &str) -> Option<AlgoStream> {
        self.store.get(key)
    }
}

impl Default for AlgoStreamingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds pricing-stage output into the algo-streaming service.
pub struct AlgoStreamingListener {
    service: Rc<AlgoStreamingService>,
}

impl AlgoStreamingListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<AlgoStreamingService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Price> for AlgoStreamingListener {
    fn process_add(&self, event: &Price) {
        self.service.add_stream(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::{Bond, BondIdType};
    use std::cell::RefCell;

    fn bond() -> Bond {
        Bond::new(
            "9128283F5",
            BondIdType::Cusip,
            "T",
            0.0225,
            NaiveDate::from_ymd_opt(2027, 11, 15).unwrap(),
        )
    }

    fn price(mid: f64, spread: f64) -> Price {
        Price::new(bond(), mid, spread)
    }

    struct Capture {
        streams: Rc<RefCell<Vec<AlgoStream>>>,
    }

    impl ServiceListener<AlgoStream> for Capture {
        fn process_update(&self, event: &AlgoStream) {
            self.streams.borrow_mut().push(event.clone());
        }
    }

    fn service_with_capture() -> (Rc<AlgoStreamingService>, Rc<RefCell<Vec<AlgoStream>>>) {
        let service = Rc::new(AlgoStreamingService::new());
        let streams = Rc::new(RefCell::new(Vec::new()));
        service.add_listener(Rc::new(Capture {
            streams: streams.clone(),
        }));
        (service, streams)
    }

    #[test]
    fn test_two_way_prices_from_mid_and_spread() {
        let (service, streams) = service_with_capture();
        service.add_stream(&price(100.0, 1.0 / 64.0));

        let stream = &streams.borrow()[0].stream;
        assert_eq!(stream.bid_order.price, 100.0 - 1.0 / 128.0);
        assert_eq!(stream.offer_order.price, 100.0 + 1.0 / 128.0);
        assert_eq!(stream.bid_order.side, PricingSide::Bid);
        assert_eq!(stream.offer_order.side, PricingSide::Offer);
    }

    #[test]
    fn test_quantity_alternates_one_two_million() {
        let (service, streams) = service_with_capture();
        for _ in 0..4 {
            service.add_stream(&price(100.0, 0.0));
        }

        let streams = streams.borrow();
        let visibles: Vec<i64> = streams
            .iter()
            .map(|s| s.stream.bid_order.visible_quantity)
            .collect();
        assert_eq!(visibles, vec![1_000_000, 2_000_000, 1_000_000, 2_000_000]);

        // Hidden is always twice the visible, on both sides.
        for s in streams.iter() {
            assert_eq!(
                s.stream.bid_order.hidden_quantity,
                2 * s.stream.bid_order.visible_quantity
            );
            assert_eq!(
                s.stream.offer_order.visible_quantity,
                s.stream.bid_order.visible_quantity
            );
            assert_eq!(
                s.stream.offer_order.hidden_quantity,
                s.stream.bid_order.hidden_quantity
            );
        }
    }

    #[test]
    fn test_counter_is_per_input_not_per_product() {
        let (service, streams) = service_with_capture();
        let other = Bond::new(
            "912810RZ3",
            BondIdType::Cusip,
            "T",
            0.0275,
            NaiveDate::from_ymd_opt(2047, 11, 15).unwrap(),
        );

        service.add_stream(&price(100.0, 0.0));
        service.add_stream(&Price::new(other, 99.0, 0.0));

        let streams = streams.borrow();
        assert_eq!(streams[0].stream.bid_order.visible_quantity, 1_000_000);
        assert_eq!(streams[1].stream.bid_order.visible_quantity, 2_000_000);
    }

    #[test]
    fn test_caches_latest_stream_per_product() {
        let (service, _streams) = service_with_capture();
        service.add_stream(&price(100.0, 0.0));
        service.add_stream(&price(101.0, 0.0));

        let cached = service.get_data("9128283F5").unwrap();
        assert_eq!(cached.stream.bid_order.price, 101.0);
    }
}
