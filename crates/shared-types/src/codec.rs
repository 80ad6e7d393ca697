//! # Numeric/Temporal Codec
//!
//! Converts ledger-native representations to host values:
//!
//! - fixed-point minor units (`U256`) <-> decimal strings, with no binary
//!   floating-point type anywhere on the path;
//! - integer second timestamps <-> calendar instants (seconds are scaled to
//!   milliseconds before becoming a host time value).

use crate::ids::U256;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Decimals of the ledger's native currency unit.
pub const NATIVE_DECIMALS: u32 = 18;

/// Codec failures. Collapsed into `SyncError::DecodeFailure` at subsystem
/// boundaries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The decimal string is not a valid unsigned amount.
    #[error("invalid decimal amount: {0}")]
    InvalidAmount(String),

    /// More fractional digits than the unit supports.
    #[error("amount has more than {max} fractional digits")]
    TooManyFractionalDigits {
        /// Supported fractional digits.
        max: u32,
    },

    /// The value does not fit in 256 bits.
    #[error("amount overflows 256 bits")]
    Overflow,

    /// The on-ledger timestamp is outside the representable calendar range.
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(u64),
}

fn pow10(exp: u32) -> Result<U256, CodecError> {
    U256::from(10u8)
        .checked_pow(U256::from(exp))
        .ok_or(CodecError::Overflow)
}

/// Parse a decimal string (e.g. `"2.5"`) into minor units at the given
/// scale. Digits only; no sign, no exponent, at most one decimal point.
pub fn parse_units(s: &str, decimals: u32) -> Result<U256, CodecError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CodecError::InvalidAmount(s.to_string()));
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    // "1." and ".5" are accepted ("" counts as zero), "." alone is not.
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(CodecError::InvalidAmount(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(CodecError::InvalidAmount(s.to_string()));
    }
    if frac_part.len() as u32 > decimals {
        return Err(CodecError::TooManyFractionalDigits { max: decimals });
    }

    let scale = pow10(decimals)?;
    let int_units = U256::from_dec_str(if int_part.is_empty() { "0" } else { int_part })
        .map_err(|_| CodecError::InvalidAmount(s.to_string()))?
        .checked_mul(scale)
        .ok_or(CodecError::Overflow)?;

    let frac_units = if frac_part.is_empty() {
        U256::zero()
    } else {
        // Right-pad the fraction to the full scale: "5" at 18 decimals
        // means 5 * 10^17.
        let padding = pow10(decimals - frac_part.len() as u32)?;
        U256::from_dec_str(frac_part)
            .map_err(|_| CodecError::InvalidAmount(s.to_string()))?
            .checked_mul(padding)
            .ok_or(CodecError::Overflow)?
    };

    int_units.checked_add(frac_units).ok_or(CodecError::Overflow)
}

/// Render minor units as a decimal string at the given scale.
///
/// Trailing fractional zeros are trimmed; a whole amount renders with no
/// decimal point. `parse_units(&format_units(x, d), d) == x` for every
/// representable value.
pub fn format_units(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    // 10^77 < 2^256 < 10^78, so any valid scale fits.
    let scale = match pow10(decimals) {
        Ok(s) => s,
        Err(_) => return value.to_string(),
    };
    let int_part = value / scale;
    let frac_part = value % scale;

    if frac_part.is_zero() {
        return int_part.to_string();
    }

    let frac_str = format!("{:0>width$}", frac_part.to_string(), width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{int_part}.{trimmed}")
}

/// Convert an on-ledger integer timestamp (seconds since epoch) into a host
/// instant. Seconds are scaled to milliseconds; `None` when the value is
/// outside chrono's representable range.
pub fn from_timestamp_secs(secs: u64) -> Option<DateTime<Utc>> {
    let millis = i64::try_from(secs).ok()?.checked_mul(1000)?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Convert a host instant back to on-ledger seconds. Instants before the
/// epoch clamp to zero.
pub fn to_timestamp_secs(instant: DateTime<Utc>) -> u64 {
    u64::try_from(instant.timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_whole_amount() {
        assert_eq!(
            parse_units("2", 18).unwrap(),
            U256::from(2u8) * U256::exp10(18)
        );
    }

    #[test]
    fn test_parse_fractional_amount() {
        // "2.5" at 18 decimals = 25 * 10^17
        assert_eq!(
            parse_units("2.5", 18).unwrap(),
            U256::from(25u8) * U256::exp10(17)
        );
    }

    #[test]
    fn test_parse_max_precision_fraction() {
        let one_wei = parse_units("0.000000000000000001", 18).unwrap();
        assert_eq!(one_wei, U256::one());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", ".", "1.2.3", "1e5", "-1", "abc", "1,5"] {
            assert!(parse_units(bad, 18).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        let nineteen_digits = "0.0000000000000000001";
        assert_eq!(
            parse_units(nineteen_digits, 18),
            Err(CodecError::TooManyFractionalDigits { max: 18 })
        );
    }

    #[test]
    fn test_format_trims_trailing_zeros() {
        let v = parse_units("2.500", 18).unwrap();
        assert_eq!(format_units(v, 18), "2.5");
    }

    #[test]
    fn test_format_whole_amount_has_no_point() {
        let v = parse_units("7", 18).unwrap();
        assert_eq!(format_units(v, 18), "7");
        assert_eq!(format_units(U256::zero(), 18), "0");
    }

    #[test]
    fn test_format_sub_unit_amount() {
        assert_eq!(format_units(U256::one(), 18), "0.000000000000000001");
    }

    #[test]
    fn test_timestamp_seconds_scale_to_millis() {
        let t = from_timestamp_secs(1_700_000_000).unwrap();
        assert_eq!(t.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(to_timestamp_secs(t), 1_700_000_000);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(from_timestamp_secs(u64::MAX).is_none());
    }

    proptest! {
        // encode(decode(x)) == x for all representable fixed-point values.
        #[test]
        fn prop_units_round_trip(raw in any::<u128>(), decimals in 0u32..=18) {
            let value = U256::from(raw);
            let rendered = format_units(value, decimals);
            let back = parse_units(&rendered, decimals).unwrap();
            prop_assert_eq!(back, value);
        }

        #[test]
        fn prop_timestamp_round_trip(secs in 0u64..=4_102_444_800) {
            let instant = from_timestamp_secs(secs).unwrap();
            prop_assert_eq!(to_timestamp_secs(instant), secs);
        }
    }
}
