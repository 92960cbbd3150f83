//! Bond reference data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier scheme for a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondIdType {
    /// CUSIP (US domestic).
    Cusip,
    /// ISIN (international).
    Isin,
}

impl BondIdType {
    /// Parse an id-type string. Anything other than `CUSIP` (case-insensitive)
    /// is treated as ISIN.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("CUSIP") {
            BondIdType::Cusip
        } else {
            BondIdType::Isin
        }
    }
}

impl fmt::Display for BondIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondIdType::Cusip => write!(f, "CUSIP"),
            BondIdType::Isin => write!(f, "ISIN"),
        }
    }
}

/// Immutable bond reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Product identifier (CUSIP or ISIN string).
    pub product_id: String,
    /// Identifier scheme of `product_id`.
    pub id_type: BondIdType,
    /// Issuer ticker (e.g., "T" for US Treasury).
    pub ticker: String,
    /// Annual coupon rate in percent, e.g. 2.25.
    pub coupon: f64,
    /// Maturity date.
    pub maturity: NaiveDate,
}

impl Bond {
    /// Create a new bond record.
    pub fn new(
        product_id: impl Into<String>,
        id_type: BondIdType,
        ticker: impl Into<String>,
        coupon: f64,
        maturity: NaiveDate,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            id_type,
            ticker: ticker.into(),
            coupon,
            maturity,
        }
    }

    /// Maturity year, used in generated order and trade identifiers.
    pub fn maturity_year(&self) -> i32 {
        self.maturity.year()
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id_type, self.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_parse() {
        assert_eq!(BondIdType::parse("CUSIP"), BondIdType::Cusip);
        assert_eq!(BondIdType::parse("cusip"), BondIdType::Cusip);
        assert_eq!(BondIdType::parse("ISIN"), BondIdType::Isin);
        // Unknown strings default to ISIN.
        assert_eq!(BondIdType::parse("SEDOL"), BondIdType::Isin);
    }

    #[test]
    fn test_id_type_display() {
        assert_eq!(format!("{}", BondIdType::Cusip), "CUSIP");
        assert_eq!(format!("{}", BondIdType::Isin), "ISIN");
    }

    #[test]
    fn test_maturity_year() {
        let bond = Bond::new(
            "9128283F5",
            BondIdType::Cusip,
            "T",
            0.0225,
            NaiveDate::from_ymd_opt(2027, 11, 15).unwrap(),
        );
        assert_eq!(bond.maturity_year(), 2027);
    }

    #[test]
    fn test_display() {
        let bond = Bond::new(
            "912810RZ3",
            BondIdType::Cusip,
            "T",
            0.0275,
            NaiveDate::from_ymd_opt(2047, 11, 15).unwrap(),
        );
        assert_eq!(format!("{}", bond), "CUSIP 912810RZ3");
    }
}
