//! Two-way bond price.

use serde::{Deserialize, Serialize};

use super::bond::Bond;

/// A mid price with a bid-offer spread for a single bond.
///
/// Bid and offer are derived, never stored: `bid = mid - spread / 2`,
/// `offer = mid + spread / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// The priced bond.
    pub product: Bond,
    /// Mid price in decimal dollars.
    pub mid: f64,
    /// Bid-offer spread, non-negative.
    pub spread: f64,
}

impl Price {
    /// Create a new price.
    pub fn new(product: Bond, mid: f64, spread: f64) -> Self {
        Self {
            product,
            mid,
            spread,
        }
    }

    /// Derived bid price.
    pub fn bid(&self) -> f64 {
        self.mid - self.spread / 2.0
    }

    /// Derived offer price.
    pub fn offer(&self) -> f64 {
        self.mid + self.spread / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bond::BondIdType;
    use chrono::NaiveDate;

    fn bond() -> Bond {
        Bond::new(
            "9128283H1",
            BondIdType::Cusip,
            "T",
            0.0175,
            NaiveDate::from_ymd_opt(2019, 11, 30).unwrap(),
        )
    }

    #[test]
    fn test_derived_bid_offer() {
        let price = Price::new(bond(), 100.0, 1.0 / 64.0);
        assert_eq!(price.bid(), 100.0 - 1.0 / 128.0);
        assert_eq!(price.offer(), 100.0 + 1.0 / 128.0);
    }

    #[test]
    fn test_zero_spread() {
        let price = Price::new(bond(), 99.5, 0.0);
        assert_eq!(price.bid(), 99.5);
        assert_eq!(price.offer(), 99.5);
    }
}
