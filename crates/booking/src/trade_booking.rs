//! Trade booking stage.
//!
//! Trades arrive from two places: the trade ingress file, and executions
//! looped back through [`TradeBookingListener`]. Both paths go through
//! [`TradeBookingService::book_trade`], which keys the cache by trade id,
//! bumps the booked-trade counter, and fans the trade out to the position
//! stage. The counter also numbers synthesised trades and rotates them
//! across the three treasury books.

use std::cell::Cell;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fi_core::products::ProductService;
use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{fractional, ExecutionOrder, PricingSide, Side, Trade};

/// Books synthesised trades rotate through, by booked-trade count.
const BOOKS: [&str; 3] = ["TRSY1", "TRSY2", "TRSY3"];

/// Books trades and fans them out to the position stage.
pub struct TradeBookingService {
    store: ServiceStore<Trade>,
    counter: Cell<u64>,
}

impl TradeBookingService {
    /// Create an empty trade-booking service.
    pub fn new() -> Self {
        Self {
            store: ServiceStore::new(),
            counter: Cell::new(0),
        }
    }

    /// Register a listener for booked trades.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<Trade>>) {
        self.store.add_listener(listener);
    }

    /// Number of trades booked so far.
    pub fn counter(&self) -> u64 {
        self.counter.get()
    }

    /// Book a trade: cache it by trade id, bump the counter, fan out as an
    /// update event.
    pub fn book_trade(&self, trade: Trade) {
        self.store.upsert(trade.trade_id.clone(), trade.clone());
        self.counter.set(self.counter.get() + 1);
        self.store.notify_update(&trade);
    }
}

impl Service<Trade> for TradeBookingService {
    fn get_data(&self, key: &str) -> Option<Trade> {
        self.store.get(key)
    }

    fn on_message(&self, event: Trade) {
        self.book_trade(event);
    }
}

impl Default for TradeBookingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads trade records from a file and feeds them to the booking service.
///
/// Record grammar (header row discarded):
/// `TradeID,BondIDType,BondID,Side,Quantity,Price,BookId`, with the price
/// in fractional notation.
pub struct TradeBookingFileConnector {
    path: PathBuf,
    service: Rc<TradeBookingService>,
    products: Rc<ProductService>,
}

impl TradeBookingFileConnector {
    /// Create a connector for the given input file.
    pub fn new(
        path: impl Into<PathBuf>,
        service: Rc<TradeBookingService>,
        products: Rc<ProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            service,
            products,
        }
    }

    /// Read every record and deliver it via `on_message`. Returns the number
    /// of trades delivered.
    pub fn run(&self) -> Result<u64> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open trade input {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let mut delivered = 0u64;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.context("failed to read trade line")?;
            if line_num == 0 || line.trim().is_empty() {
                continue; // header
            }
            match self.parse_row(&line) {
                Some(trade) => {
                    self.service.on_message(trade);
                    delivered += 1;
                }
                None => warn!(line_num = line_num + 1, "skipping bad trade row"),
            }
        }

        info!(path = %self.path.display(), trades = delivered, "trade ingest complete");
        Ok(delivered)
    }

    fn parse_row(&self, line: &str) -> Option<Trade> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 7 {
            return None;
        }

        let product_id = fields[2];
        let bond = match self.products.bond(product_id) {
            Some(bond) => bond,
            None => {
                warn!(product_id, "unknown bond in trade input");
                return None;
            }
        };

        Some(Trade {
            product: bond,
            trade_id: fields[0].to_string(),
            side: Side::parse(fields[3]),
            quantity: fields[4].parse().ok()?,
            price: fractional::decode(fields[5]).ok()?,
            book_id: fields[6].to_string(),
        })
    }
}

/// Loops routed executions back into trade booking as synthesised trades.
pub struct TradeBookingListener {
    service: Rc<TradeBookingService>,
}

impl TradeBookingListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<TradeBookingService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<ExecutionOrder> for TradeBookingListener {
    fn process_add(&self, event: &ExecutionOrder) {
        let counter = self.service.counter();
        let bond = &event.product;

        // A lifted bid books as a sell, a hit offer as a buy.
        let side = match event.side {
            PricingSide::Bid => Side::Sell,
            PricingSide::Offer => Side::Buy,
        };

        let trade = Trade {
            product: bond.clone(),
            trade_id: format!(
                "TRS{}{}{:07}",
                bond.maturity_year(),
                bond.ticker,
                counter
            ),
            price: event.price,
            book_id: BOOKS[(counter % 3) as usize].to_string(),
            quantity: event.total_quantity(),
            side,
        };

        self.service.book_trade(trade);
    }
}
