//! Two-way price streams and the quoting side discriminator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bond::Bond;

/// Side of a quoted or resting order: bid or offer.
///
/// Distinct from [`crate::types::Side`], which discriminates trades
/// (buy/sell); the two meet only in the execution loop-back, where a lifted
/// bid books as a sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingSide {
    /// Bid (buy interest).
    Bid,
    /// Offer (sell interest).
    Offer,
}

impl fmt::Display for PricingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingSide::Bid => write!(f, "BID"),
            PricingSide::Offer => write!(f, "OFFER"),
        }
    }
}

/// One side of a streamed two-way price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStreamOrder {
    /// Quoted price.
    pub price: f64,
    /// Quantity shown to the market.
    pub visible_quantity: i64,
    /// Quantity held back.
    pub hidden_quantity: i64,
    /// Which side of the market this order quotes.
    pub side: PricingSide,
}

impl PriceStreamOrder {
    /// Create a new stream order.
    pub fn new(price: f64, visible_quantity: i64, hidden_quantity: i64, side: PricingSide) -> Self {
        Self {
            price,
            visible_quantity,
            hidden_quantity,
            side,
        }
    }
}

/// A two-way price stream for a bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStream {
    /// The streamed bond.
    pub product: Bond,
    /// Bid side of the stream.
    pub bid_order: PriceStreamOrder,
    /// Offer side of the stream.
    pub offer_order: PriceStreamOrder,
}

impl PriceStream {
    /// Create a new price stream.
    pub fn new(product: Bond, bid_order: PriceStreamOrder, offer_order: PriceStreamOrder) -> Self {
        Self {
            product,
            bid_order,
            offer_order,
        }
    }
}
