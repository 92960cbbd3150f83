//! Risk stage: PV01 per bond and per bucketed sector.
//!
//! Seeded at construction with a static per-unit PV01 per bond, quantity
//! zero. A position update sets the bond's risk quantity to the position's
//! aggregate. Sector risk is recomputed on demand from the per-bond map:
//! the sector quantity is the sum, the per-unit PV01 the quantity-weighted
//! mean (zero when the sector nets flat).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use fi_core::products::ProductService;
use fi_core::service::{Service, ServiceListener, ServiceStore};
use fi_core::types::{Bond, BucketedSector, Position, Pv01};

/// Maintains per-bond and per-sector PV01 risk.
pub struct RiskService {
    store: ServiceStore<Pv01<Bond>>,
    sector_risk: RefCell<HashMap<String, Pv01<BucketedSector>>>,
}

impl RiskService {
    /// Create a service seeded with `pv01_by_bond` per-unit values, all at
    /// quantity zero. Bonds missing from the reference data are skipped.
    pub fn new(products: &ProductService, pv01_by_bond: &HashMap<String, f64>) -> Self {
        let store = ServiceStore::new();
        for (product_id, pv01) in pv01_by_bond {
            match products.bond(product_id) {
                Some(bond) => store.upsert(product_id.clone(), Pv01::new(bond, *pv01, 0)),
                None => warn!(product_id = %product_id, "PV01 seed for unknown bond skipped"),
            }
        }
        Self {
            store,
            sector_risk: RefCell::new(HashMap::new()),
        }
    }

    /// Register a listener for per-bond risk updates.
    pub fn add_listener(&self, listener: Rc<dyn ServiceListener<Pv01<Bond>>>) {
        self.store.add_listener(listener);
    }

    /// Apply a position update: the bond's risk quantity becomes the
    /// position's aggregate. Fans out the updated per-bond risk.
    pub fn add_position(&self, position: &Position) {
        let product_id = &position.product.product_id;
        let Some(mut risk) = self.store.get(product_id) else {
            warn!(product_id = %product_id, "position update for bond without PV01 dropped");
            return;
        };

        risk.quantity = position.aggregate_position();
        self.store.upsert(product_id.clone(), risk.clone());

        self.store.notify_update(&risk);
    }

    /// Recompute and cache the sector's aggregated risk from the current
    /// per-bond map.
    pub fn update_bucketed_risk(&self, sector: &BucketedSector) {
        let mut sum_quantity: i64 = 0;
        let mut sum_pv01 = 0.0;
        for bond in &sector.products {
            if let Some(risk) = self.store.get(&bond.product_id) {
                sum_quantity += risk.quantity;
                sum_pv01 += risk.contribution();
            }
        }

        let unit_pv01 = if sum_quantity == 0 {
            0.0
        } else {
            sum_pv01 / sum_quantity as f64
        };

        self.sector_risk.borrow_mut().insert(
            sector.name.clone(),
            Pv01::new(sector.clone(), unit_pv01, sum_quantity),
        );
    }

    /// The cached aggregated risk for a sector, if it has been computed.
    pub fn bucketed_risk(&self, sector: &BucketedSector) -> Option<Pv01<BucketedSector>> {
        self.sector_risk.borrow().get(&sector.name).cloned()
    }
}

impl Service<Pv01<Bond>> for RiskService {
    fn get_data(&self, key: &str) -> Option<Pv01<Bond>> {
        self.store.get(key)
    }
}

/// Feeds position updates into the risk service.
pub struct RiskListener {
    service: Rc<RiskService>,
}

impl RiskListener {
    /// Create a listener targeting the given service.
    pub fn new(service: Rc<RiskService>) -> Self {
        Self { service }
    }
}

impl ServiceListener<Position> for RiskListener {
    fn process_update(&self, event: &Position) {
        self.service.add_position(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fi_core::types::BondIdType;

    fn bond(id: &str, year: i32) -> Bond {
        Bond::new(
            id,
            BondIdType::Cusip,
            "T",
            0.02,
            NaiveDate::from_ymd_opt(year, 11, 15).unwrap(),
        )
    }

    fn setup() -> (ProductService, HashMap<String, f64>) {
        let products = ProductService::new();
        products.add(bond("912828M80", 2022));
        products.add(bond("9128283J7", 2024));
        let mut pv01 = HashMap::new();
        pv01.insert("912828M80".to_string(), 0.0176);
        pv01.insert("9128283J7".to_string(), 0.02215);
        (products, pv01)
    }

    fn position(products: &ProductService, id: &str, book: &str, quantity: i64) -> Position {
        let mut position = Position::new(products.bond(id).unwrap());
        position.add(book, quantity);
        position
    }

    #[test]
    fn test_seeded_at_zero_quantity() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);

        let risk = service.get_data("912828M80").unwrap();
        assert_eq!(risk.pv01, 0.0176);
        assert_eq!(risk.quantity, 0);
    }

    #[test]
    fn test_risk_quantity_tracks_aggregate() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);

        let mut pos = position(&products, "912828M80", "TRSY1", 1_000_000);
        service.add_position(&pos);
        assert_eq!(service.get_data("912828M80").unwrap().quantity, 1_000_000);

        // A second update assigns the new aggregate; it does not accumulate
        // the old risk quantity on top.
        pos.add("TRSY2", -400_000);
        service.add_position(&pos);
        assert_eq!(service.get_data("912828M80").unwrap().quantity, 600_000);
    }

    #[test]
    fn test_sector_risk_is_quantity_weighted_mean() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);

        service.add_position(&position(&products, "912828M80", "TRSY1", 1_000_000));
        service.add_position(&position(&products, "9128283J7", "TRSY1", 3_000_000));

        let sector = BucketedSector::new(
            vec![
                products.bond("912828M80").unwrap(),
                products.bond("9128283J7").unwrap(),
            ],
            "Belly",
        );
        service.update_bucketed_risk(&sector);

        let sector_risk = service.bucketed_risk(&sector).unwrap();
        assert_eq!(sector_risk.quantity, 4_000_000);
        let expected = (0.0176 * 1_000_000.0 + 0.02215 * 3_000_000.0) / 4_000_000.0;
        assert!((sector_risk.pv01 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_sector_risk_zero_when_flat() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);

        // Long one bond, short the other for a net-flat sector.
        service.add_position(&position(&products, "912828M80", "TRSY1", 1_000_000));
        service.add_position(&position(&products, "9128283J7", "TRSY1", -1_000_000));

        let sector = BucketedSector::new(
            vec![
                products.bond("912828M80").unwrap(),
                products.bond("9128283J7").unwrap(),
            ],
            "Belly",
        );
        service.update_bucketed_risk(&sector);

        let sector_risk = service.bucketed_risk(&sector).unwrap();
        assert_eq!(sector_risk.quantity, 0);
        assert_eq!(sector_risk.pv01, 0.0);
    }

    #[test]
    fn test_position_without_pv01_dropped() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);

        products.add(bond("9128283F5", 2027));
        service.add_position(&position(&products, "9128283F5", "TRSY1", 1_000_000));
        assert!(service.get_data("9128283F5").is_none());
    }

    #[test]
    fn test_uncomputed_sector_is_none() {
        let (products, pv01) = setup();
        let service = RiskService::new(&products, &pv01);
        let sector = BucketedSector::new(vec![products.bond("912828M80").unwrap()], "Belly");
        assert!(service.bucketed_risk(&sector).is_none());
    }
}
