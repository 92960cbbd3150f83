//! Per-book position bookkeeping for a single bond.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::bond::Bond;

/// Net position per book for one bond.
///
/// Mutations are additive only; books appear the first time they trade.
/// The aggregate is always the sum over every book ever seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// The positioned bond.
    pub product: Bond,
    /// Net signed quantity per book id.
    positions: HashMap<String, i64>,
}

impl Position {
    /// A flat position with no books.
    pub fn new(product: Bond) -> Self {
        Self {
            product,
            positions: HashMap::new(),
        }
    }

    /// Net position for one book. Books never traded are flat.
    pub fn position(&self, book: &str) -> i64 {
        self.positions.get(book).copied().unwrap_or(0)
    }

    /// Sum of the net positions over all books.
    pub fn aggregate_position(&self) -> i64 {
        self.positions.values().sum()
    }

    /// Add a signed quantity into a book.
    pub fn add(&mut self, book: impl Into<String>, signed_quantity: i64) {
        *self.positions.entry(book.into()).or_insert(0) += signed_quantity;
    }

    /// Whether the book has ever traded on this position.
    pub fn has_book(&self, book: &str) -> bool {
        self.positions.contains_key(book)
    }
}
