//! Execution orders and venue tags.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bond::Bond;
use super::stream::PricingSide;

/// Order type of an execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Fill-or-kill.
    Fok,
    /// Immediate-or-cancel.
    Ioc,
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Stop order.
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Fok => write!(f, "FOK"),
            OrderType::Ioc => write!(f, "IOC"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

/// Execution venue. An identity tag only, with no connectivity behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// BrokerTec.
    BrokerTec,
    /// eSpeed.
    Espeed,
    /// CME.
    Cme,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::BrokerTec => write!(f, "BROKERTEC"),
            Venue::Espeed => write!(f, "ESPEED"),
            Venue::Cme => write!(f, "CME"),
        }
    }
}

/// An order to be executed on a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    /// The traded bond.
    pub product: Bond,
    /// Side of the order.
    pub side: PricingSide,
    /// Order identifier.
    pub order_id: String,
    /// Order type.
    pub order_type: OrderType,
    /// Order price in decimal dollars.
    pub price: f64,
    /// Quantity shown to the market.
    pub visible_quantity: i64,
    /// Quantity held back.
    pub hidden_quantity: i64,
    /// Parent order identifier, `"N/A"` if none.
    pub parent_order_id: String,
    /// Whether this order is a child of another order.
    pub is_child_order: bool,
}

impl ExecutionOrder {
    /// Total quantity across visible and hidden.
    pub fn total_quantity(&self) -> i64 {
        self.visible_quantity + self.hidden_quantity
    }
}
