//! Fixed-point math utilities for deterministic simulation.
//!
//! All economy, travel and combat math uses fixed-point arithmetic so that
//! the same colony snapshot advanced by the same gap produces bit-identical
//! results on every platform. Floating-point never enters the simulation.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 3_600_000;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a fixed-point ratio `numerator / denominator` from integers.
///
/// Returns zero when the denominator is zero.
///
/// # Example
///
/// ```
/// use colony_core::math::{ratio, Fixed};
///
/// assert_eq!(ratio(3, 2), Fixed::from_num(1.5));
/// assert_eq!(ratio(5, 0), Fixed::ZERO);
/// ```
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    if denominator == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Fractional percentage as a multiplier offset (`5` becomes `0.05`).
#[must_use]
pub fn percent(value: i32) -> Fixed {
    ratio(value, 100)
}

/// Raise `base` to a non-negative integer power by repeated multiplication.
///
/// Saturates instead of overflowing, so absurd levels clamp to the
/// fixed-point maximum rather than panicking.
#[must_use]
pub fn pow(base: Fixed, exponent: u32) -> Fixed {
    let mut result = Fixed::ONE;
    for _ in 0..exponent {
        result = result.saturating_mul(base);
    }
    result
}

/// Convert an elapsed millisecond span into fractional hours.
///
/// Whole hours and the remainder are converted separately so multi-week
/// offline gaps do not overflow the 32-bit integer part.
#[must_use]
pub fn hours_from_ms(elapsed_ms: u64) -> Fixed {
    let whole = elapsed_ms / MS_PER_HOUR;
    let remainder = elapsed_ms % MS_PER_HOUR;
    let whole = Fixed::saturating_from_num(whole);
    // remainder < 3.6e6 always fits
    let fraction = Fixed::from_num(remainder) / Fixed::from_num(MS_PER_HOUR);
    whole.saturating_add(fraction)
}

/// Floor a non-negative fixed-point value to an integer count.
///
/// Negative inputs floor to zero.
#[must_use]
pub fn floor_u64(value: Fixed) -> u64 {
    if value <= Fixed::ZERO {
        0
    } else {
        value.floor().to_num::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_growth() {
        assert_eq!(pow(Fixed::from_num(2), 0), Fixed::ONE);
        assert_eq!(pow(Fixed::from_num(2), 10), Fixed::from_num(1024));
        let grown = pow(ratio(3, 2), 2);
        assert_eq!(grown, Fixed::from_num(2.25));
    }

    #[test]
    fn test_pow_saturates() {
        let huge = pow(Fixed::from_num(10), 40);
        assert_eq!(huge, Fixed::MAX);
    }

    #[test]
    fn test_hours_from_ms() {
        assert_eq!(hours_from_ms(MS_PER_HOUR), Fixed::ONE);
        assert_eq!(hours_from_ms(MS_PER_HOUR / 2), Fixed::from_num(0.5));
        // four weeks offline
        assert_eq!(hours_from_ms(MS_PER_HOUR * 24 * 28), Fixed::from_num(672));
    }

    #[test]
    fn test_floor_u64() {
        assert_eq!(floor_u64(Fixed::from_num(2.99)), 2);
        assert_eq!(floor_u64(Fixed::from_num(-3)), 0);
    }
}
