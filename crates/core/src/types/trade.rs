//! Trade events and the trade side discriminator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bond::Bond;

/// Side of a trade or inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl Side {
    /// Parse a side string. Anything other than `BUY` (case-insensitive) is
    /// treated as SELL.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("BUY") {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// +1 for a buy, -1 for a sell.
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A booked (or bookable) trade in a single book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// The traded bond.
    pub product: Bond,
    /// Trade identifier, unique per booking.
    pub trade_id: String,
    /// Trade price in decimal dollars.
    pub price: f64,
    /// Book the trade belongs to (e.g., `TRSY1`).
    pub book_id: String,
    /// Traded quantity.
    pub quantity: i64,
    /// Trade side.
    pub side: Side,
}

impl Trade {
    /// Quantity signed by side: positive for buys, negative for sells.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * self.quantity
    }
}
