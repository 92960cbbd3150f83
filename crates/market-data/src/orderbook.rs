//! Order book entity for depth snapshots.
//!
//! A book is the bond plus two ordered stacks of resting orders. Stacks may
//! carry several orders at the same price until [`OrderBook::aggregated`]
//! collapses them; after aggregation each side holds at most one order per
//! distinct price. Aggregation preserves first-seen price order within a
//! side; no price sorting is promised.

use serde::{Deserialize, Serialize};

use fi_core::types::{Bond, PricingSide};

/// A resting order at one price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order price in decimal dollars.
    pub price: f64,
    /// Resting quantity.
    pub quantity: i64,
    /// Which side of the book the order rests on.
    pub side: PricingSide,
}

impl Order {
    /// Create a new order.
    pub fn new(price: f64, quantity: i64, side: PricingSide) -> Self {
        Self {
            price,
            quantity,
            side,
        }
    }
}

/// Top of book: the highest-priced bid and the lowest-priced offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidOffer {
    /// Best (highest) bid.
    pub bid: Order,
    /// Best (lowest) offer.
    pub offer: Order,
}

impl BidOffer {
    /// Offer price minus bid price. Negative for a crossed book.
    pub fn spread(&self) -> f64 {
        self.offer.price - self.bid.price
    }
}

/// A depth snapshot for one bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// The quoted bond.
    pub product: Bond,
    /// Bid stack.
    pub bid_stack: Vec<Order>,
    /// Offer stack.
    pub offer_stack: Vec<Order>,
}

impl OrderBook {
    /// Create a new order book.
    pub fn new(product: Bond, bid_stack: Vec<Order>, offer_stack: Vec<Order>) -> Self {
        Self {
            product,
            bid_stack,
            offer_stack,
        }
    }

    /// The highest-priced bid and lowest-priced offer, or `None` if either
    /// side is empty.
    pub fn best_bid_offer(&self) -> Option<BidOffer> {
        let bid = self
            .bid_stack
            .iter()
            .copied()
            .max_by(|a, b| a.price.total_cmp(&b.price))?;
        let offer = self
            .offer_stack
            .iter()
            .copied()
            .min_by(|a, b| a.price.total_cmp(&b.price))?;
        Some(BidOffer { bid, offer })
    }

    /// Copy of this book with each side collapsed by price: orders at the
    /// same price merge into one with their quantities summed. Within a
    /// side, prices keep their first-seen order.
    pub fn aggregated(&self) -> OrderBook {
        OrderBook {
            product: self.product.clone(),
            bid_stack: collapse(&self.bid_stack, PricingSide::Bid),
            offer_stack: collapse(&self.offer_stack, PricingSide::Offer),
        }
    }
}

/// Sum quantities of equal-priced orders, one output order per price.
///
/// Stacks are a handful of levels, so a linear scan beats hashing here and
/// sidesteps float keys entirely.
fn collapse(stack: &[Order], side: PricingSide) -> Vec<Order> {
    let mut out: Vec<Order> = Vec::with_capacity(stack.len());
    for order in stack {
        match out.iter_mut().find(|o| o.price == order.price) {
            Some(existing) => existing.quantity += order.quantity,
            None => out.push(Order::new(order.price, order.quantity, side)),
        }
    }
    out
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::BondIdType;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn bond() -> Bond {
        Bond::new(
            "9128283F5",
            BondIdType::Cusip,
            "T",
            0.0225,
            NaiveDate::from_ymd_opt(2027, 11, 15).unwrap(),
        )
    }

    /// Prices drawn from a 1/256 grid so equal prices actually collide.
    fn arb_stack(side: PricingSide) -> impl Strategy<Value = Vec<Order>> {
        proptest::collection::vec(
            ((99 * 256i64..101 * 256i64), 0i64..10_000_000i64)
                .prop_map(move |(ticks, qty)| Order::new(ticks as f64 / 256.0, qty, side)),
            0..12,
        )
    }

    proptest! {
        // After aggregation no two orders on a side share a price, and
        // per-price quantity totals are preserved.
        #[test]
        fn aggregation_invariant(
            bids in arb_stack(PricingSide::Bid),
            offers in arb_stack(PricingSide::Offer),
        ) {
            let book = OrderBook::new(bond(), bids.clone(), offers.clone());
            let aggregated = book.aggregated();

            for (stack, original) in [
                (&aggregated.bid_stack, &bids),
                (&aggregated.offer_stack, &offers),
            ] {
                let prices: BTreeSet<i64> =
                    stack.iter().map(|o| (o.price * 256.0) as i64).collect();
                prop_assert_eq!(prices.len(), stack.len());

                for order in stack.iter() {
                    let expected: i64 = original
                        .iter()
                        .filter(|o| o.price == order.price)
                        .map(|o| o.quantity)
                        .sum();
                    prop_assert_eq!(order.quantity, expected);
                }
            }
        }
    }
}
