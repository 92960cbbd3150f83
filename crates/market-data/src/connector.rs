//! Subscribe connector for market-depth snapshot files.
//!
//! Record grammar (comma-separated, header row discarded):
//!
//! ```text
//! BondIDType,BondID,Price,Spread1,Spread2,Spread3,Spread4,Spread5,Size1,Size2,Size3,Size4,Size5
//! ```
//!
//! Depth level *i* contributes a bid at `mid - spread_i` and an offer at
//! `mid + spread_i`, both with quantity `size_i`. Prices and spreads use
//! fractional notation. Malformed rows and rows naming an unknown bond are
//! reported and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fi_core::products::ProductService;
use fi_core::service::Service;
use fi_core::types::{fractional, PricingSide};

use crate::orderbook::{Order, OrderBook};
use crate::service::MarketDataService;

/// Number of depth levels per record.
const DEPTH_LEVELS: usize = 5;

/// Reads depth snapshots from a file and feeds them to the market data
/// service.
pub struct MarketDataFileConnector {
    path: PathBuf,
    service: Rc<MarketDataService>,
    products: Rc<ProductService>,
}

impl MarketDataFileConnector {
    /// Create a connector for the given input file.
    pub fn new(
        path: impl Into<PathBuf>,
        service: Rc<MarketDataService>,
        products: Rc<ProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            service,
            products,
        }
    }

    /// Read every record and deliver it via `on_message`. Returns the number
    /// of snapshots delivered.
    pub fn run(&self) -> Result<u64> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open market data input {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let mut delivered = 0u64;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.context("failed to read market data line")?;
            if line_num == 0 || line.trim().is_empty() {
                continue; // header
            }
            match self.parse_row(&line) {
                Some(book) => {
                    self.service.on_message(book);
                    delivered += 1;
                }
                None => {
                    warn!(line_num = line_num + 1, "skipping bad market data row");
                }
            }
        }

        info!(
            path = %self.path.display(),
            snapshots = delivered,
            "market data ingest complete"
        );
        Ok(delivered)
    }

    fn parse_row(&self, line: &str) -> Option<OrderBook> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 + 2 * DEPTH_LEVELS {
            return None;
        }

        // fields[0] is the id type; the reference record is authoritative.
        let product_id = fields[1];
        let bond = match self.products.bond(product_id) {
            Some(bond) => bond,
            None => {
                warn!(product_id, "unknown bond in market data input");
                return None;
            }
        };
        let mid = fractional::decode(fields[2]).ok()?;

        let mut bid_stack = Vec::with_capacity(DEPTH_LEVELS);
        let mut offer_stack = Vec::with_capacity(DEPTH_LEVELS);
        for level in 0..DEPTH_LEVELS {
            let spread = fractional::decode(fields[3 + level]).ok()?;
            let size: i64 = fields[3 + DEPTH_LEVELS + level].parse().ok()?;
            bid_stack.push(Order::new(mid - spread, size, PricingSide::Bid));
            offer_stack.push(Order::new(mid + spread, size, PricingSide::Offer));
        }

        Some(OrderBook::new(bond, bid_stack, offer_stack))
    }
}
