//! Treasury reference data: the managed bond universe, per-unit PV01
//! seeds, and the sector partition.

use std::collections::HashMap;

use chrono::NaiveDate;

use fi_core::products::ProductService;
use fi_core::types::{Bond, BondIdType, BucketedSector};

/// The six on-the-run treasuries under management.
pub fn treasury_universe() -> Vec<Bond> {
    let bond = |id: &str, coupon: f64, y: i32, m: u32, d: u32| {
        Bond::new(
            id,
            BondIdType::Cusip,
            "T",
            coupon,
            NaiveDate::from_ymd_opt(y, m, d).expect("valid maturity date"),
        )
    };
    vec![
        bond("9128283H1", 1.750, 2019, 11, 30), // 2Y
        bond("9128283G3", 1.750, 2020, 11, 15), // 3Y
        bond("912828M80", 2.000, 2022, 11, 30), // 5Y
        bond("9128283J7", 2.125, 2024, 11, 30), // 7Y
        bond("9128283F5", 2.250, 2027, 11, 15), // 10Y
        bond("912810RZ3", 2.750, 2047, 11, 15), // 30Y
    ]
}

/// A product service seeded with the treasury universe.
pub fn bootstrap_products() -> ProductService {
    let products = ProductService::new();
    for bond in treasury_universe() {
        products.add(bond);
    }
    products
}

/// Per-unit PV01 per bond.
pub fn pv01_by_bond() -> HashMap<String, f64> {
    [
        ("9128283H1", 0.0185),
        ("9128283G3", 0.01034),
        ("912828M80", 0.0176),
        ("9128283J7", 0.02215),
        ("9128283F5", 0.0202),
        ("912810RZ3", 0.0275),
    ]
    .into_iter()
    .map(|(id, pv01)| (id.to_string(), pv01))
    .collect()
}

/// The sector partition: FrontEnd {2Y, 3Y}, Belly {5Y, 7Y, 10Y},
/// LongEnd {30Y}.
pub fn sector_partition(products: &ProductService) -> Vec<BucketedSector> {
    let sector = |name: &str, ids: &[&str]| {
        BucketedSector::new(
            ids.iter()
                .filter_map(|id| products.bond(id))
                .collect(),
            name,
        )
    };
    vec![
        sector("FrontEnd", &["9128283H1", "9128283G3"]),
        sector("Belly", &["912828M80", "9128283J7", "9128283F5"]),
        sector("LongEnd", &["912810RZ3"]),
    ]
}
