//! PV01 risk values and bucketed sectors.

use serde::{Deserialize, Serialize};

use super::bond::Bond;

/// PV01 risk associated with a product and a signed quantity.
///
/// Generic over the product so the same value carries single-bond risk
/// (`Pv01<Bond>`) and aggregated sector risk (`Pv01<BucketedSector>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pv01<T> {
    /// The product this risk is measured on.
    pub product: T,
    /// Per-unit PV01: price change for a one basis point yield move.
    pub pv01: f64,
    /// Signed quantity the risk applies to.
    pub quantity: i64,
}

impl<T> Pv01<T> {
    /// Create a new PV01 value.
    pub fn new(product: T, pv01: f64, quantity: i64) -> Self {
        Self {
            product,
            pv01,
            quantity,
        }
    }

    /// Total risk contribution: per-unit PV01 times quantity.
    pub fn contribution(&self) -> f64 {
        self.pv01 * self.quantity as f64
    }
}

/// A named group of bonds over which PV01 is aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedSector {
    /// Bonds in the sector.
    pub products: Vec<Bond>,
    /// Sector name (e.g., `FrontEnd`, `Belly`, `LongEnd`).
    pub name: String,
}

impl BucketedSector {
    /// Create a new sector.
    pub fn new(products: Vec<Bond>, name: impl Into<String>) -> Self {
        Self {
            products,
            name: name.into(),
        }
    }

    /// Whether the sector contains the given product id.
    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|b| b.product_id == product_id)
    }
}
