//! Input-file generators for self-test runs.
//!
//! Each generator writes one ingress file in the grammar its connector
//! parses. Prices oscillate between 99 and 101 in 1/256 steps; depth rows
//! carry five levels with the top spread cycling between 1/128 and 3/128;
//! trades rotate side, size, and book deterministically; inquiries draw
//! side, size, and price at random.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::info;

use fi_core::types::{fractional, Bond};

/// Depth sizes per level, level 1 first.
const DEPTH_SIZES: [i64; 5] = [10_000_000, 20_000_000, 30_000_000, 40_000_000, 50_000_000];

fn create(path: &Path, header: &str) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("cannot create input file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", header)?;
    Ok(writer)
}

/// Mid price for generated row `round`: oscillates 99 -> 101 -> 99 in
/// 1/256 increments.
fn oscillating_price(round: u64) -> f64 {
    let step = round % 1024;
    if step < 512 {
        99.0 + step as f64 / 256.0
    } else {
        99.0 + (1024 - step) as f64 / 256.0
    }
}

/// Generate the price ingress file: `rows_per_bond` rows per bond,
/// round-robin across bonds, spread alternating between 1/64 and 1/128.
pub fn generate_prices(path: &Path, bonds: &[Bond], rows_per_bond: u64) -> Result<()> {
    let mut writer = create(path, "BondIDType,BondID,Price,Spread")?;

    let n = bonds.len() as u64;
    for i in 0..n * rows_per_bond {
        let bond = &bonds[(i % n) as usize];
        let round = i / n;
        let price = oscillating_price(round);
        let spread = if round % 2 == 0 { 1.0 / 64.0 } else { 1.0 / 128.0 };
        writeln!(
            writer,
            "{},{},{},{}",
            bond.id_type,
            bond.product_id,
            fractional::encode(price),
            fractional::encode(spread)
        )?;
    }

    writer.flush()?;
    info!(path = %path.display(), "price input generated");
    Ok(())
}

/// Generate the depth ingress file: five levels per row, deeper levels
/// widening by 1/128 each. The top half-spread cycles from 1/256 up to
/// 1/256 + 3/128 and back, so every sixth snapshot per bond quotes a full
/// spread of 1/128 and satisfies the algo-execution trigger.
pub fn generate_market_data(path: &Path, bonds: &[Bond], rows_per_bond: u64) -> Result<()> {
    let mut writer = create(
        path,
        "BondIDType,BondID,Price,Spread1,Spread2,Spread3,Spread4,Spread5,\
         Size1,Size2,Size3,Size4,Size5",
    )?;

    let n = bonds.len() as u64;
    for i in 0..n * rows_per_bond {
        let bond = &bonds[(i % n) as usize];
        let round = i / n;
        let price = oscillating_price(round);
        let cycle = round % 6;
        let top_spread =
            1.0 / 256.0 + if cycle < 3 { cycle } else { 6 - cycle } as f64 / 128.0;

        write!(
            writer,
            "{},{},{}",
            bond.id_type,
            bond.product_id,
            fractional::encode(price)
        )?;
        for level in 0..5 {
            write!(
                writer,
                ",{}",
                fractional::encode(top_spread + level as f64 / 128.0)
            )?;
        }
        for size in DEPTH_SIZES {
            write!(writer, ",{}", size)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    info!(path = %path.display(), "market data input generated");
    Ok(())
}

/// Generate the trade ingress file: `trades_per_bond` trades per bond,
/// alternating BUY/SELL, sizes 1M through 5M, books TRSY1 through TRSY3,
/// bought at 99 and sold at 100.
pub fn generate_trades(path: &Path, bonds: &[Bond], trades_per_bond: u64) -> Result<()> {
    let mut writer = create(path, "TradeID,BondIDType,BondID,Side,Quantity,Price,BookId")?;

    let n = bonds.len() as u64;
    for i in 0..n * trades_per_bond {
        let bond = &bonds[(i % n) as usize];
        let round = i / n;
        let side = if round % 2 == 0 { "BUY" } else { "SELL" };
        let quantity = 1_000_000 * (round % 5 + 1);
        let price = if side == "BUY" { 99.0 } else { 100.0 };
        let book = format!("TRSY{}", round % 3 + 1);
        writeln!(
            writer,
            "TRS{}{}{:03},{},{},{},{},{},{}",
            bond.maturity_year(),
            bond.ticker,
            i + 1,
            bond.id_type,
            bond.product_id,
            side,
            quantity,
            fractional::encode(price),
            book
        )?;
    }

    writer.flush()?;
    info!(path = %path.display(), "trade input generated");
    Ok(())
}

/// Generate the inquiry ingress file: `inquiries_per_bond` RECEIVED
/// inquiries per bond with random side, size (1M..6M), and price
/// (99..101 on the 1/256 grid).
pub fn generate_inquiries(path: &Path, bonds: &[Bond], inquiries_per_bond: u64) -> Result<()> {
    let mut writer = create(path, "InquiryID,BondIDType,BondID,Side,Quantity,Price,State")?;
    let mut rng = rand::rng();

    let n = bonds.len() as u64;
    for i in 0..n * inquiries_per_bond {
        let bond = &bonds[(i % n) as usize];
        let side = if rng.random_bool(0.5) { "BUY" } else { "SELL" };
        let quantity = 1_000_000 * rng.random_range(1..=6);
        let price = 99.0 + rng.random_range(1..=512) as f64 / 256.0;
        writeln!(
            writer,
            "INQ{}{}{:03},{},{},{},{},{},RECEIVED",
            bond.maturity_year(),
            bond.ticker,
            i + 1,
            bond.id_type,
            bond.product_id,
            side,
            quantity,
            fractional::encode(price)
        )?;
    }

    writer.flush()?;
    info!(path = %path.display(), "inquiry input generated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_data::treasury_universe;

    #[test]
    fn test_price_oscillation_stays_in_band() {
        for round in 0..3000 {
            let price = oscillating_price(round);
            assert!((99.0..=101.0).contains(&price), "round {round}: {price}");
        }
        // Turning points.
        assert_eq!(oscillating_price(0), 99.0);
        assert_eq!(oscillating_price(512), 101.0);
        assert_eq!(oscillating_price(1024), 99.0);
    }

    #[test]
    fn test_generated_files_have_expected_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = treasury_universe();

        let prices = dir.path().join("prices.txt");
        let depth = dir.path().join("marketdata.txt");
        let trades = dir.path().join("trades.txt");
        let inquiries = dir.path().join("inquiries.txt");

        generate_prices(&prices, &bonds, 4).unwrap();
        generate_market_data(&depth, &bonds, 4).unwrap();
        generate_trades(&trades, &bonds, 2).unwrap();
        generate_inquiries(&inquiries, &bonds, 2).unwrap();

        let count = |p: &Path| std::fs::read_to_string(p).unwrap().lines().count();
        assert_eq!(count(&prices), 1 + 6 * 4);
        assert_eq!(count(&depth), 1 + 6 * 4);
        assert_eq!(count(&trades), 1 + 6 * 2);
        assert_eq!(count(&inquiries), 1 + 6 * 2);
    }

    #[test]
    fn test_generated_rows_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = treasury_universe();
        let path = dir.path().join("prices.txt");
        generate_prices(&path, &bonds, 2).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        for line in content.lines().skip(1) {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 4);
            assert!(fractional::decode(fields[2]).is_ok());
            assert!(fractional::decode(fields[3]).is_ok());
        }
    }

    #[test]
    fn test_depth_rows_have_thirteen_fields() {
        let dir = tempfile::tempdir().unwrap();
        let bonds = treasury_universe();
        let path = dir.path().join("marketdata.txt");
        generate_market_data(&path, &bonds, 2).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        for line in content.lines().skip(1) {
            assert_eq!(line.split(',').count(), 13);
        }
    }
}
