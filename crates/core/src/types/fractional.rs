//! US Treasury fractional price notation.
//!
//! Treasuries quote in 32nds and 256ths: `III-FFS` where `III` is the whole
//! dollar price, `FF` is the number of 32nds (00–31, always two digits), and
//! `S` is the number of 256ths within that 32nd (0–7, with `+` standing for
//! 4). `99-293` decodes to `99 + 29/32 + 3/256 = 99.918359375`.
//!
//! Every representable value is a dyadic rational, so `f64` round-trips the
//! whole domain exactly.

use thiserror::Error;

/// Errors from parsing a fractional price string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FractionalPriceError {
    /// No `-` between the dollar part and the fraction part.
    #[error("missing '-' separator in price {0:?}")]
    MissingSeparator(String),
    /// The dollar part is not a non-negative integer.
    #[error("invalid dollar part in price {0:?}")]
    InvalidDollars(String),
    /// The fraction part is not exactly two digits plus one tick character.
    #[error("invalid fraction part in price {0:?}")]
    InvalidFraction(String),
    /// The 32nds component is outside 00–31.
    #[error("32nds out of range in price {0:?}")]
    ThirtySecondsOutOfRange(String),
    /// The 256ths character is not `0`–`7` or `+`.
    #[error("invalid 256ths digit in price {0:?}")]
    InvalidTicks(String),
}

/// Decode a fractional price string into its numeric value.
pub fn decode(s: &str) -> Result<f64, FractionalPriceError> {
    let (dollars_str, frac_str) = s
        .split_once('-')
        .ok_or_else(|| FractionalPriceError::MissingSeparator(s.to_string()))?;

    let dollars: u32 = dollars_str
        .parse()
        .map_err(|_| FractionalPriceError::InvalidDollars(s.to_string()))?;

    if frac_str.len() != 3 || !frac_str.is_char_boundary(2) {
        return Err(FractionalPriceError::InvalidFraction(s.to_string()));
    }
    let thirty_seconds: u32 = frac_str[..2]
        .parse()
        .map_err(|_| FractionalPriceError::InvalidFraction(s.to_string()))?;
    if thirty_seconds > 31 {
        return Err(FractionalPriceError::ThirtySecondsOutOfRange(s.to_string()));
    }

    let ticks = match &frac_str[2..] {
        "+" => 4,
        d => d
            .parse::<u32>()
            .ok()
            .filter(|t| *t <= 7)
            .ok_or_else(|| FractionalPriceError::InvalidTicks(s.to_string()))?,
    };

    Ok(f64::from(dollars) + f64::from(thirty_seconds) / 32.0 + f64::from(ticks) / 256.0)
}

/// Encode a non-negative price into fractional notation.
///
/// The 32nds field is always two digits; a 256ths component of 4 is written
/// as `+`. The value is truncated to the nearest representable 1/256.
pub fn encode(price: f64) -> String {
    debug_assert!(price >= 0.0, "fractional notation has no sign");
    let dollars = price.floor();
    let thirty_seconds = ((price - dollars) * 32.0).floor() as u32;
    let ticks = ((price - dollars) * 256.0) as u32 - thirty_seconds * 8;

    let mut out = format!("{}-{:02}", dollars as i64, thirty_seconds);
    if ticks == 4 {
        out.push('+');
    } else {
        out.push_str(&ticks.to_string());
    }
    out
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // encode ∘ decode is the identity on the representable set.
        #[test]
        fn encode_decode_round_trip(
            dollars in 0u32..200u32,
            thirty_seconds in 0u32..32u32,
            ticks in 0u32..8u32,
        ) {
            let tick_str = if ticks == 4 {
                "+".to_string()
            } else {
                ticks.to_string()
            };
            let s = format!("{}-{:02}{}", dollars, thirty_seconds, tick_str);
            let value = decode(&s).unwrap();
            prop_assert_eq!(encode(value), s);
        }

        // decode ∘ encode is the identity on values of the form n + a/32 + b/256.
        #[test]
        fn decode_encode_round_trip(
            dollars in 0u32..200u32,
            thirty_seconds in 0u32..32u32,
            ticks in 0u32..8u32,
        ) {
            let value = f64::from(dollars)
                + f64::from(thirty_seconds) / 32.0
                + f64::from(ticks) / 256.0;
            prop_assert_eq!(decode(&encode(value)).unwrap(), value);
        }
    }
}
